//! Contains logic for layering octaves of a [`NoiseFunction`] on top of each other.

use bevy_math::VectorSpace;

use crate::{NoiseFunction, hash::LatticeSeed};

/// Provides a user facing view of some [`LayerWeights`].
pub trait LayerWeightsSettings {
    /// The kind of [`LayerWeights`] produced by these settings.
    type Weights: LayerWeights;

    /// Prepares a new [`LayerWeights`] for a sample.
    fn start_weights(&self) -> Self::Weights;
}

/// Specifies that this generates configurable weights for different layers of noise.
pub trait LayerWeights {
    /// Generates the weight of the next layer of noise.
    fn next_weight(&mut self) -> f32;
}

/// A [`LayerWeightsSettings`] for [`PersistenceWeights`].
/// This is the weight system of traditional fractal brownian motion. See also [`Fractal`].
///
/// Values greater than 1 make later octaves weigh more, while values less than 1 make earlier octaves weigh more.
/// A value of 1 makes all octaves equally weighted. Values of 0 or nan have no defined meaning.
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Persistence(pub f32);

impl Default for Persistence {
    fn default() -> Self {
        Self(0.5)
    }
}

/// The [`LayerWeights`] for [`Persistence`].
#[derive(Clone, Copy, PartialEq)]
pub struct PersistenceWeights {
    persistence: Persistence,
    next: f32,
}

impl LayerWeights for PersistenceWeights {
    #[inline]
    fn next_weight(&mut self) -> f32 {
        let result = self.next;
        self.next *= self.persistence.0;
        result
    }
}

impl LayerWeightsSettings for Persistence {
    type Weights = PersistenceWeights;

    #[inline]
    fn start_weights(&self) -> Self::Weights {
        PersistenceWeights {
            persistence: *self,
            // Must be exactly 1 so a single octave is returned untouched.
            next: 1.0,
        }
    }
}

/// Collects weighted values into a weighted average.
///
/// `T` is the [`VectorSpace`] you want to collect.
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Normed<T> {
    total_weights: f32,
    running_total: T,
}

impl<T: VectorSpace> Default for Normed<T> {
    fn default() -> Self {
        Self {
            total_weights: 0.0,
            running_total: T::ZERO,
        }
    }
}

impl<T: VectorSpace> Normed<T> {
    /// Includes `value` in the final result at this `weight`.
    #[inline]
    pub fn include_value(&mut self, value: T, weight: f32) {
        self.running_total = self.running_total + value * weight;
        self.total_weights += weight;
    }

    /// Collapses all accumulated values into their weighted average.
    /// If nothing was included, this is zero.
    #[inline]
    pub fn finish(self) -> T {
        if self.total_weights == 0.0 {
            T::ZERO
        } else {
            self.running_total / self.total_weights
        }
    }
}

/// Represents a [`NoiseFunction`] that repeats the inner noise at different scales of input and averages the results.
/// This is fractal brownian motion (fbm).
///
/// Every octave is evaluated with the same seed.
/// Since each octave only multiplies the input by a whole number, noise that tiles with period `P` keeps tiling with period `P` once layered.
///
/// ```
/// # use bevy_math::Vec3;
/// # use cloudnoiz::{NoiseFunction, cell_noise::ValueNoise, hash::LatticeSeed, layering::Fractal};
/// let fbm = Fractal::new(ValueNoise::tiled(4.0), 4);
/// let value = fbm.evaluate(Vec3::new(0.3, 1.7, 2.2), LatticeSeed(0));
/// assert!((0.0..=1.0).contains(&value));
///
/// // A single octave is exactly the inner noise.
/// let single = Fractal::new(ValueNoise::tiled(4.0), 1);
/// let p = Vec3::new(0.3, 1.7, 2.2);
/// assert_eq!(
///     single.evaluate(p, LatticeSeed(0)),
///     ValueNoise::tiled(4.0).evaluate(p, LatticeSeed(0)),
/// );
/// ```
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Fractal<N, W = Persistence> {
    /// The [`NoiseFunction`] to layer.
    pub noise: N,
    /// How much each octave weighs relative to the others.
    pub weights: W,
    /// Lacunarity measures how far apart each octave will be.
    /// Effectively, this is a frequency multiplier.
    /// Ex: if this is 3, each octave will operate on 1/3 the scale.
    ///
    /// This should be a whole number for tiling noise.
    pub lacunarity: f32,
    /// The number of octaves.
    /// Zero octaves produce zero.
    pub octaves: u32,
}

impl<N> Fractal<N> {
    /// Classic fbm over `noise`: lacunarity 2 and persistence 0.5.
    pub fn new(noise: N, octaves: u32) -> Self {
        Self {
            noise,
            weights: Persistence::default(),
            lacunarity: 2.0,
            octaves,
        }
    }
}

impl<N: Default> Default for Fractal<N> {
    fn default() -> Self {
        Self::new(N::default(), 4)
    }
}

impl<I, N, W> NoiseFunction<I> for Fractal<N, W>
where
    I: VectorSpace,
    N: NoiseFunction<I>,
    N::Output: VectorSpace,
    W: LayerWeightsSettings,
{
    type Output = N::Output;

    #[inline]
    fn evaluate(&self, input: I, seed: LatticeSeed) -> Self::Output {
        let mut weights = self.weights.start_weights();
        let mut result = Normed::default();
        let mut working_loc = input;
        for octave in 0..self.octaves {
            if octave > 0 {
                working_loc = working_loc * self.lacunarity;
            }
            result.include_value(self.noise.evaluate(working_loc, seed), weights.next_weight());
        }
        result.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_noise::{JitteredWorley, ValueNoise};
    use bevy_math::{Vec2, Vec3};

    /// Reports the x coordinate of the input, so the scaled location of each octave can be read back.
    struct InputX;

    impl NoiseFunction<Vec3> for InputX {
        type Output = f32;

        fn evaluate(&self, input: Vec3, _seed: LatticeSeed) -> f32 {
            input.x
        }
    }

    #[test]
    fn persistence_halves_each_octave() {
        let mut weights = Persistence::default().start_weights();
        assert_eq!(weights.next_weight(), 1.0);
        assert_eq!(weights.next_weight(), 0.5);
        assert_eq!(weights.next_weight(), 0.25);
    }

    #[test]
    fn normed_is_a_weighted_average() {
        let mut normed = Normed::<f32>::default();
        normed.include_value(1.0, 1.0);
        normed.include_value(0.0, 0.5);
        assert!((normed.finish() - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(Normed::<f32>::default().finish(), 0.0);
    }

    #[test]
    fn single_octave_is_identity() {
        let inner = JitteredWorley::tiled(4.0);
        let fbm = Fractal::new(inner, 1);
        for i in 0..32 {
            let p = Vec3::new(i as f32 * 0.13, i as f32 * 0.07, 3.9 - i as f32 * 0.11);
            assert_eq!(
                fbm.evaluate(p, LatticeSeed(5)),
                inner.evaluate(p, LatticeSeed(5))
            );
        }
    }

    #[test]
    fn octaves_double_the_input() {
        // 1·1 + 0.5·2 + 0.25·4 over a total weight of 1.75
        let fbm = Fractal::new(InputX, 3);
        let value = fbm.evaluate(Vec3::X, LatticeSeed(0));
        assert!((value - 3.0 / 1.75).abs() < 1e-6);
    }

    #[test]
    fn layered_noise_still_tiles() {
        let fbm = Fractal::new(ValueNoise::tiled(4.0), 4);
        for i in 0..16 {
            let p = Vec2::new(i as f32 * 0.25 + 0.125, 1.375);
            let a = fbm.evaluate(p, LatticeSeed(0));
            let b = fbm.evaluate(p + Vec2::new(4.0, 0.0), LatticeSeed(0));
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn layered_noise_is_unit_ranged() {
        let fbm = Fractal::new(JitteredWorley::tiled(8.0), 4);
        for i in 0..64 {
            let p = Vec3::new(i as f32 * 0.125, i as f32 * 0.0625, 0.5);
            let value = fbm.evaluate(p, LatticeSeed(2));
            assert!((0.0..=1.0).contains(&value));
        }
    }
}
