#![allow(
    clippy::doc_markdown,
    reason = "These rules should not apply to the readme."
)]
#![doc = include_str!("../README.md")]

pub mod cell_noise;
pub mod cells;
pub mod composite;
pub mod config;
pub mod curves;
pub mod error;
pub mod field;
pub mod generator;
pub mod hash;
pub mod layering;
pub mod math_noise;
pub mod pipeline;
pub mod prelude;

use bevy_math::VectorSpace;
use hash::LatticeSeed;

/// Represents a simple noise function with an input `I` and an output.
///
/// Noise functions are pure: the output depends only on `self`, `input` and `seed`.
pub trait NoiseFunction<I> {
    /// The output of the function.
    type Output;

    /// Evaluates the function at `input`.
    fn evaluate(&self, input: I, seed: LatticeSeed) -> Self::Output;
}

impl<I, T0: NoiseFunction<I>> NoiseFunction<I> for (T0,) {
    type Output = T0::Output;
    #[inline]
    fn evaluate(&self, input: I, seed: LatticeSeed) -> Self::Output {
        self.0.evaluate(input, seed)
    }
}

macro_rules! impl_noise_function_tuple {
    ($($l:ident-$t:ident-$i:tt),*) => {
        impl<
            I,
            T0: NoiseFunction<I>,
            $($t: NoiseFunction<$l::Output>,)*
        > NoiseFunction<I> for (T0, $($t,)*)
        {
            type Output = <impl_noise_function_tuple!(last $($t),*)>::Output;

            #[inline]
            fn evaluate(&self, input: I, seed: LatticeSeed) -> Self::Output {
                let input = self.0.evaluate(input, seed);
                $(let input = self.$i.evaluate(input, seed);)*
                input
            }
        }
    };


    (last $f:ident $(,)? ) => {
        $f
    };

    (last $f:ident, $($items:ident),+ $(,)?) => {
        impl_noise_function_tuple!(last $($items),+)
    };
}

#[rustfmt::skip]
mod function_impls {
    use super::*;
    impl_noise_function_tuple!(T0-T1-1);
    impl_noise_function_tuple!(T0-T1-1, T1-T2-2);
    impl_noise_function_tuple!(T0-T1-1, T1-T2-2, T2-T3-3);
}

/// Indicates that this noise is samplable by type `I`.
pub trait Sampleable<I: VectorSpace> {
    /// The result of the sample.
    type Result;

    /// Samples the noise at `loc`.
    fn sample(&self, loc: I) -> Self::Result;
}

/// This is the standard end interface of a [`NoiseFunction`].
/// It scales normalized input by a frequency and evaluates with a fixed seed.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Noise<N> {
    /// The [`NoiseFunction`] powering this noise.
    pub noise: N,
    /// The seed of the [`Noise`].
    pub seed: LatticeSeed,
    /// The frequency or scale of the [`Noise`].
    pub frequency: f32,
}

impl<N: Default> Default for Noise<N> {
    fn default() -> Self {
        Self {
            noise: N::default(),
            seed: LatticeSeed(0),
            frequency: 1.0,
        }
    }
}

impl<N> From<N> for Noise<N> {
    fn from(value: N) -> Self {
        Self {
            noise: value,
            seed: LatticeSeed(0),
            frequency: 1.0,
        }
    }
}

impl<I: VectorSpace, N: NoiseFunction<I>> Sampleable<I> for Noise<N> {
    type Result = N::Output;

    #[inline]
    fn sample(&self, loc: I) -> Self::Result {
        self.noise.evaluate(loc * self.frequency, self.seed)
    }
}
