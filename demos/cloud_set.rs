//! Generates a cloud noise set, watching one field's progress along the way, and prints a summary of each channel.
//! Run with `RUST_LOG=debug` to see every field start and finish.

use std::{thread, time::Duration};

use bevy_math::Vec4;
use cloudnoiz::prelude::*;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), NoiseError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // A single field in the background.
    let record = NoiseTextureRecord::shape_perlin(64).with_seed(7);
    let task = record.request()?.spawn();
    let field = loop {
        if let Some(result) = task.try_take() {
            break result?;
        }
        println!("perlin: {:>5.1}%", task.progress() * 100.0);
        thread::sleep(Duration::from_millis(5));
    };
    let (min, max) = field
        .as_slice()
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    println!("perlin: {} samples in [{min:.3}, {max:.3}]", field.len());

    // The full set, composited.
    let set = CloudNoisePipeline::new(64).with_seed(7).run()?;
    let texels = set.composite.as_slice();
    let mean = texels.iter().fold(Vec4::ZERO, |acc, &t| acc + t) / texels.len() as f32;
    println!(
        "composite means: shape {:.3}, detail {:.3} / {:.3} / {:.3}",
        mean.x, mean.y, mean.z, mean.w
    );

    #[cfg(feature = "serialize")]
    println!(
        "stored as: {}",
        serde_json::to_string_pretty(&record).unwrap_or_default()
    );

    Ok(())
}
