//! Contains the interpolation curves used to weigh lattice corners.

use bevy_math::{Curve, curve::Interval};

/// Smoothstep interpolation, `t² (3 - 2t)`. This has a smooth derivative that is zero at both ends.
///
/// This is the weight [`ValueNoise`](crate::cell_noise::ValueNoise) uses between lattice corners.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Smoothstep;

impl Curve<f32> for Smoothstep {
    #[inline]
    fn domain(&self) -> Interval {
        Interval::UNIT
    }

    #[inline]
    fn sample_unchecked(&self, t: f32) -> f32 {
        t * t * (3.0 - 2.0 * t)
    }
}
