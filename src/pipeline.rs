//! Produces a complete cloud noise set: eight source fields, generated concurrently, then composited.
//!
//! The fields are generated as nested rayon work, so a run never parks a pool thread waiting on other jobs.
//! It is safe to run from inside a pool, including a single-threaded one.

use std::time::Instant;

use bevy_math::Vec4;
use rayon::prelude::*;
use tracing::info;

use crate::{
    composite::{CompositionInputs, composite},
    config::NoiseTextureRecord,
    error::NoiseError,
    field::{CancelFlag, Field, FieldRequest, FieldShape, GenerationProgress},
};

/// The settings for every source field of a cloud noise set.
///
/// ```no_run
/// # use cloudnoiz::pipeline::CloudNoisePipeline;
/// let set = CloudNoisePipeline::new(64).with_seed(7).run().unwrap();
/// assert_eq!(set.composite.len(), 64 * 64 * 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CloudNoisePipeline {
    /// The smooth value noise.
    pub perlin: NoiseTextureRecord,
    /// The cellular layers that erode the value noise, lowest frequency first.
    pub shape_worley: [NoiseTextureRecord; 3],
    /// The detail cellular layers, lowest frequency first.
    pub detail_worley: [NoiseTextureRecord; 4],
}

impl CloudNoisePipeline {
    /// The standard set, see [`NoiseTextureRecord::cloud_shape_set`].
    pub fn new(resolution: u32) -> Self {
        let [perlin, w0, w1, w2, d0, d1, d2, d3] = NoiseTextureRecord::cloud_shape_set(resolution);
        Self {
            perlin,
            shape_worley: [w0, w1, w2],
            detail_worley: [d0, d1, d2, d3],
        }
    }

    /// Sets the seed of every field.
    pub fn with_seed(mut self, seed: i32) -> Self {
        self.perlin.seed = seed;
        for record in self.shape_worley.iter_mut().chain(&mut self.detail_worley) {
            record.seed = seed;
        }
        self
    }

    /// The shape of the composite, taken from the value noise record.
    pub fn output_shape(&self) -> FieldShape {
        FieldShape::new(self.perlin.resolution, self.perlin.dimensions)
    }

    /// Generates every field and the composite.
    pub fn run(&self) -> Result<CloudNoiseSet, NoiseError> {
        self.run_with(&CancelFlag::default())
    }

    /// Generates every field and the composite, stopping early if `cancel` is set.
    ///
    /// All eight fields are validated before any work starts.
    pub fn run_with(&self, cancel: &CancelFlag) -> Result<CloudNoiseSet, NoiseError> {
        let start = Instant::now();
        let perlin = self.perlin.request()?;
        let worley = self
            .shape_worley
            .iter()
            .chain(&self.detail_worley)
            .map(NoiseTextureRecord::request)
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            resolution = self.perlin.resolution,
            seed = self.perlin.seed,
            "generating cloud noise set"
        );

        let generate =
            |request: &FieldRequest| request.generate_with(&GenerationProgress::default(), cancel);
        let (perlin, worley) = rayon::join(
            || generate(&perlin),
            || worley.par_iter().map(&generate).collect::<Result<Vec<_>, _>>(),
        );
        let perlin = perlin?;
        let mut worley = worley?;
        let detail_worley = worley.split_off(self.shape_worley.len());
        let shape_worley = worley;

        let inputs = CompositionInputs {
            shape: self.output_shape(),
            perlin: Some(&perlin),
            shape_worley: core::array::from_fn(|i| shape_worley.get(i)),
            detail_worley: core::array::from_fn(|i| detail_worley.get(i)),
        };
        let composite = composite(&inputs);
        info!(elapsed = ?start.elapsed(), "cloud noise set done");

        Ok(CloudNoiseSet {
            perlin,
            shape_worley,
            detail_worley,
            composite,
        })
    }
}

/// Every field of a finished cloud noise set.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudNoiseSet {
    /// The smooth value noise.
    pub perlin: Field<f32>,
    /// The shape cellular fields, lowest frequency first.
    pub shape_worley: Vec<Field<f32>>,
    /// The detail cellular fields, lowest frequency first.
    pub detail_worley: Vec<Field<f32>>,
    /// The Perlin-Worley texture.
    pub composite: Field<Vec4>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_every_field() {
        let set = CloudNoisePipeline::new(16).run().unwrap();
        assert_eq!(set.shape_worley.len(), 3);
        assert_eq!(set.detail_worley.len(), 4);
        assert_eq!(set.composite.len(), 16 * 16 * 16);
        assert!(
            set.composite
                .as_slice()
                .iter()
                .all(|t| t.cmpge(Vec4::ZERO).all() && t.cmple(Vec4::ONE).all())
        );
        // Real inputs produce some cloud.
        assert!(set.composite.as_slice().iter().any(|t| t.x > 0.0));
    }

    #[test]
    fn runs_are_reproducible() {
        let pipeline = CloudNoisePipeline::new(16).with_seed(4);
        assert_eq!(pipeline.run().unwrap(), pipeline.run().unwrap());
    }

    #[test]
    fn invalid_records_fail_before_work_starts() {
        let mut pipeline = CloudNoisePipeline::new(16);
        pipeline.detail_worley[3].frequency = 0;
        assert_eq!(pipeline.run(), Err(NoiseError::InvalidFrequency(0)));
    }

    #[test]
    fn cancelled_runs_report_it() {
        let cancel = CancelFlag::default();
        cancel.cancel();
        assert_eq!(
            CloudNoisePipeline::new(16).run_with(&cancel),
            Err(NoiseError::Cancelled)
        );
    }

    #[test]
    fn runs_inside_a_single_thread_pool() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();
        let pipeline = CloudNoisePipeline::new(16).with_seed(2);
        let pooled = pool.install(|| pipeline.run()).unwrap();
        assert_eq!(pooled, pipeline.run().unwrap());
    }

    #[test]
    fn nested_runs_share_the_pool() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .unwrap();
        let sets = pool.install(|| {
            [1, 2, 3]
                .par_iter()
                .map(|&seed| CloudNoisePipeline::new(16).with_seed(seed).run())
                .collect::<Result<Vec<_>, _>>()
        });
        assert_eq!(sets.unwrap().len(), 3);
    }

    #[test]
    fn composite_matches_its_inputs() {
        let set = CloudNoisePipeline::new(16).run().unwrap();
        let i = 1234;
        let expected = crate::composite::composite_sample(
            set.perlin.as_slice()[i],
            core::array::from_fn(|k| set.shape_worley[k].as_slice()[i]),
            core::array::from_fn(|k| set.detail_worley[k].as_slice()[i]),
        );
        assert_eq!(set.composite.as_slice()[i], expected);
    }
}
