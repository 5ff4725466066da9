//! Blends finished fields into the 4-channel Perlin-Worley cloud texture.
//!
//! The red channel is the cloud shape: value noise eroded by three octaves of cellular noise.
//! The other three channels are cellular fbm at rising frequencies, used to erode edges with detail.

use bevy_math::Vec4;
use rayon::prelude::*;
use tracing::warn;

use crate::{
    NoiseFunction,
    field::{Field, FieldShape},
    hash::LatticeSeed,
    math_noise::{ClampUNorm, remap},
};

/// The fields a composite is built from, borrowed for the duration of [`composite`].
///
/// Any input may be left out. A composite with a missing input, or an input of the wrong shape, is all zeros.
#[derive(Debug, Clone, Copy)]
pub struct CompositionInputs<'a> {
    /// The shape of the output, which every input must share.
    pub shape: FieldShape,
    /// Smooth value noise.
    pub perlin: Option<&'a Field<f32>>,
    /// Inverted cellular noise, lowest frequency first.
    pub shape_worley: [Option<&'a Field<f32>>; 3],
    /// Inverted high frequency cellular noise, lowest frequency first.
    pub detail_worley: [Option<&'a Field<f32>>; 4],
}

impl<'a> CompositionInputs<'a> {
    /// Inputs for an output of `shape`, with every field still missing.
    pub fn new(shape: FieldShape) -> Self {
        Self {
            shape,
            perlin: None,
            shape_worley: [None; 3],
            detail_worley: [None; 4],
        }
    }

    /// Sets the value noise field.
    pub fn with_perlin(mut self, perlin: &'a Field<f32>) -> Self {
        self.perlin = Some(perlin);
        self
    }

    /// Sets the three shape cellular fields.
    pub fn with_shape_worley(mut self, worley: [&'a Field<f32>; 3]) -> Self {
        self.shape_worley = worley.map(Some);
        self
    }

    /// Sets the four detail cellular fields.
    pub fn with_detail_worley(mut self, worley: [&'a Field<f32>; 4]) -> Self {
        self.detail_worley = worley.map(Some);
        self
    }

    /// The names of inputs that are missing or the wrong shape.
    pub fn missing(&self) -> Vec<&'static str> {
        const SHAPE_NAMES: [&str; 3] = ["shape_worley[0]", "shape_worley[1]", "shape_worley[2]"];
        const DETAIL_NAMES: [&str; 4] = [
            "detail_worley[0]",
            "detail_worley[1]",
            "detail_worley[2]",
            "detail_worley[3]",
        ];

        let usable = |field: Option<&Field<f32>>| field.is_some_and(|f| f.shape() == self.shape);
        core::iter::once(("perlin", self.perlin))
            .chain(SHAPE_NAMES.into_iter().zip(self.shape_worley))
            .chain(DETAIL_NAMES.into_iter().zip(self.detail_worley))
            .filter(|(_, field)| !usable(*field))
            .map(|(name, _)| name)
            .collect()
    }
}

/// Composites one sample.
///
/// `worley` are the shape cellular samples and `detail` the detail ones, each lowest frequency first.
///
/// ```
/// # use cloudnoiz::composite::composite_sample;
/// let texel = composite_sample(0.9, [0.8, 0.4, 0.2], [0.0; 4]);
/// assert!((texel.x - 0.84).abs() < 1e-5);
/// ```
#[inline]
pub fn composite_sample(perlin: f32, worley: [f32; 3], detail: [f32; 4]) -> Vec4 {
    let worley_fbm = 0.625 * worley[0] + 0.25 * worley[1] + 0.125 * worley[2];
    let perlin_worley = remap(perlin, 1.0 - worley_fbm, 1.0, 0.0, 1.0);

    let detail_fbm0 = 0.625 * detail[0] + 0.25 * detail[1] + 0.125 * detail[2];
    let detail_fbm1 = 0.625 * detail[1] + 0.25 * detail[2] + 0.125 * detail[3];
    let detail_fbm2 = 0.75 * detail[2] + 0.25 * detail[3];

    ClampUNorm.evaluate(
        Vec4::new(perlin_worley, detail_fbm0, detail_fbm1, detail_fbm2),
        LatticeSeed::default(),
    )
}

/// Composites whole fields, in parallel.
///
/// This never fails. If any input is missing or has the wrong shape, a warning is logged and the result is all zeros.
pub fn composite(inputs: &CompositionInputs) -> Field<Vec4> {
    let missing = inputs.missing();
    let (
        Some(perlin),
        [Some(w0), Some(w1), Some(w2)],
        [Some(d0), Some(d1), Some(d2), Some(d3)],
    ) = (inputs.perlin, inputs.shape_worley, inputs.detail_worley)
    else {
        warn!(?missing, "composite inputs missing, producing an empty texture");
        return Field::filled(inputs.shape, Vec4::ZERO);
    };
    if !missing.is_empty() {
        warn!(?missing, shape = ?inputs.shape, "composite inputs have the wrong shape, producing an empty texture");
        return Field::filled(inputs.shape, Vec4::ZERO);
    }

    let (perlin, w0, w1, w2) = (perlin.as_slice(), w0.as_slice(), w1.as_slice(), w2.as_slice());
    let (d0, d1, d2, d3) = (d0.as_slice(), d1.as_slice(), d2.as_slice(), d3.as_slice());
    let data = (0..inputs.shape.len())
        .into_par_iter()
        .map(|i| composite_sample(perlin[i], [w0[i], w1[i], w2[i]], [d0[i], d1[i], d2[i], d3[i]]))
        .collect();

    Field::from_vec(inputs.shape, data).unwrap_or_else(|| Field::filled(inputs.shape, Vec4::ZERO))
}
