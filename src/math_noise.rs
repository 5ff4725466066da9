//! Contains the small math helpers and math-based [`NoiseFunction`]s used to post-process samples.

use bevy_math::{Vec2, Vec3, Vec4};

use crate::{NoiseFunction, hash::LatticeSeed};

/// Linearly maps `v` from the range `[a, b]` to the range `[c, d]`.
/// Values outside `[a, b]` extrapolate.
///
/// When the source range has zero width, there is no meaningful answer, and this returns 0.
///
/// ```
/// # use cloudnoiz::math_noise::remap;
/// assert_eq!(remap(0.5, 0.0, 1.0, 10.0, 20.0), 15.0);
/// assert_eq!(remap(0.5, 1.0, 1.0, 0.0, 1.0), 0.0);
/// ```
#[inline]
pub fn remap(v: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    let width = b - a;
    if width == 0.0 {
        return 0.0;
    }
    c + ((v - a) / width) * (d - c)
}

/// Inverts a unit value, ex: `1.0 - c`.
/// Applying this twice gives back the original value.
#[inline(always)]
pub fn invert(c: f32) -> f32 {
    1.0 - c
}

/// A [`NoiseFunction`] that subtracts its input from 1.0, ex: `1.0 - input`.
/// For values in [0, 1], this flips dark and light.
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct ReverseUNorm;

/// A [`NoiseFunction`] that clamps its input into [0, 1].
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct ClampUNorm;

macro_rules! impl_vector_spaces {
    ($n:ty) => {
        impl NoiseFunction<$n> for ReverseUNorm {
            type Output = $n;

            #[inline]
            fn evaluate(&self, input: $n, _seed: LatticeSeed) -> Self::Output {
                1.0 - input
            }
        }

        impl NoiseFunction<$n> for ClampUNorm {
            type Output = $n;

            #[inline]
            fn evaluate(&self, input: $n, _seed: LatticeSeed) -> Self::Output {
                input.clamp(<$n>::splat(0.0), <$n>::splat(1.0))
            }
        }
    };
}

impl_vector_spaces!(Vec2);
impl_vector_spaces!(Vec3);
impl_vector_spaces!(Vec4);

impl NoiseFunction<f32> for ReverseUNorm {
    type Output = f32;

    #[inline]
    fn evaluate(&self, input: f32, _seed: LatticeSeed) -> Self::Output {
        invert(input)
    }
}

impl NoiseFunction<f32> for ClampUNorm {
    type Output = f32;

    #[inline]
    fn evaluate(&self, input: f32, _seed: LatticeSeed) -> Self::Output {
        input.clamp(0.0, 1.0)
    }
}
