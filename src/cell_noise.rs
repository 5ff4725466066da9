//! Contains the lattice-based noise primitives: smooth value noise and two flavors of cellular (Worley) noise.
//!
//! All of these operate in lattice space, where one unit is one cell.
//! Scale normalized coordinates into lattice space first, for example with [`Noise::frequency`](crate::Noise::frequency).

use bevy_math::{Curve, Vec2, Vec3};

use crate::{
    NoiseFunction,
    cells::{CellPoint, DomainCell, InterpolatableCell, Lattice, Partitioner},
    curves::Smoothstep,
    hash::{LatticeIndex, LatticeSeed, vmod},
};

/// A [`NoiseFunction`] that mixes hashed lattice corner values by a [`Curve`] `C`.
/// Produces values in [0, 1].
///
/// This is the smooth building block of the crate: it is used directly as the low frequency cloud shape and as the jitter source of [`JitteredWorley`].
///
/// ```
/// # use bevy_math::Vec3;
/// # use cloudnoiz::{NoiseFunction, cell_noise::ValueNoise, hash::LatticeSeed};
/// let noise = <ValueNoise>::default();
/// let value = noise.evaluate(Vec3::new(0.5, 1.25, 2.0), LatticeSeed(0));
/// assert!((0.0..=1.0).contains(&value));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueNoise<C = Smoothstep> {
    /// The lattice, which decides whether corners wrap.
    pub lattice: Lattice,
    /// The [`Curve`] weighing corners against each other.
    pub curve: C,
}

impl ValueNoise {
    /// Value noise that repeats every `period` cells.
    pub fn tiled(period: f32) -> Self {
        Self {
            lattice: Lattice::tiled(period),
            curve: Smoothstep,
        }
    }
}

impl<C: Curve<f32>> NoiseFunction<Vec2> for ValueNoise<C> {
    type Output = f32;

    #[inline]
    fn evaluate(&self, input: Vec2, seed: LatticeSeed) -> Self::Output {
        self.lattice.partition(input).interpolate_within(
            |corner: CellPoint<Vec2>| seed.hash(corner.wrapped.collapse_for_hash()),
            &self.curve,
        )
    }
}

impl<C: Curve<f32>> NoiseFunction<Vec3> for ValueNoise<C> {
    type Output = f32;

    #[inline]
    fn evaluate(&self, input: Vec3, seed: LatticeSeed) -> Self::Output {
        self.lattice.partition(input).interpolate_within(
            |corner: CellPoint<Vec3>| seed.hash(corner.wrapped.collapse_for_hash()),
            &self.curve,
        )
    }
}

/// Classic cellular noise.
/// Each cell holds one feature point at a hashed position within it, and the noise is the squared distance to the closest one, clamped into [0, 1].
///
/// This produces a "bubbly" pattern that is dark at feature points and creased along cell borders.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Worley {
    /// The lattice, which decides whether feature points repeat.
    pub lattice: Lattice,
}

impl Worley {
    /// Offsets into the hash for each axis of a feature point.
    /// These are fractional so they never alias another cell's index.
    const AXIS_KEYS: [f64; 3] = [0.0, 0.333, 0.667];

    /// Cellular noise that repeats every `period` cells.
    pub fn tiled(period: f32) -> Self {
        Self {
            lattice: Lattice::tiled(period),
        }
    }

    /// Samples a normalized point `p` with `cell_count` cells per unit.
    #[inline]
    pub fn sample_cells(&self, p: Vec3, cell_count: f32, seed: LatticeSeed) -> f32 {
        self.evaluate(p * cell_count, seed)
    }
}

impl NoiseFunction<Vec2> for Worley {
    type Output = f32;

    #[inline]
    fn evaluate(&self, input: Vec2, seed: LatticeSeed) -> Self::Output {
        let nearest = self
            .lattice
            .partition(input)
            .iter_neighbors()
            .map(|point| {
                let m = point.wrapped.collapse_for_hash();
                let feature = point.cell
                    + Vec2::new(
                        seed.hash(m + Self::AXIS_KEYS[0]),
                        seed.hash(m + Self::AXIS_KEYS[1]),
                    );
                input.distance_squared(feature)
            })
            .fold(f32::INFINITY, f32::min);
        nearest.clamp(0.0, 1.0)
    }
}

impl NoiseFunction<Vec3> for Worley {
    type Output = f32;

    #[inline]
    fn evaluate(&self, input: Vec3, seed: LatticeSeed) -> Self::Output {
        let nearest = self
            .lattice
            .partition(input)
            .iter_neighbors()
            .map(|point| {
                let m = point.wrapped.collapse_for_hash();
                let feature = point.cell
                    + Vec3::new(
                        seed.hash(m + Self::AXIS_KEYS[0]),
                        seed.hash(m + Self::AXIS_KEYS[1]),
                        seed.hash(m + Self::AXIS_KEYS[2]),
                    );
                input.distance_squared(feature)
            })
            .fold(f32::INFINITY, f32::min);
        nearest.clamp(0.0, 1.0)
    }
}

/// Cellular noise whose feature points are pushed off the cell corner by [`ValueNoise`].
///
/// Every axis of a cell's feature point moves by the same amount, the value noise at the (wrapped) cell coordinate.
/// Because that jitter comes from smooth noise, neighboring cells move together, giving broad darker and lighter regions that plain [`Worley`] lacks.
///
/// The period must be set for the pattern to tile, see [`JitteredWorley::tiled`].
///
/// ```
/// # use bevy_math::Vec3;
/// # use cloudnoiz::{NoiseFunction, cell_noise::JitteredWorley, hash::LatticeSeed};
/// let noise = JitteredWorley::tiled(4.0);
/// let here = noise.evaluate(Vec3::new(0.5, 1.5, 2.5), LatticeSeed(0));
/// let one_period_over = noise.evaluate(Vec3::new(4.5, 1.5, 2.5), LatticeSeed(0));
/// assert!((here - one_period_over).abs() < 1e-5);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct JitteredWorley {
    /// The lattice, which decides whether feature points repeat.
    pub lattice: Lattice,
    /// The jitter source. It is sampled at whole, already wrapped, cell coordinates.
    pub jitter: ValueNoise,
}

impl JitteredWorley {
    /// Jittered cellular noise that repeats every `period` cells.
    pub fn tiled(period: f32) -> Self {
        Self {
            lattice: Lattice::tiled(period),
            jitter: <ValueNoise>::default(),
        }
    }

    /// Samples a normalized point `p` with `cell_count` cells per unit.
    #[inline]
    pub fn sample_cells(&self, p: Vec3, cell_count: f32, seed: LatticeSeed) -> f32 {
        self.evaluate(p * cell_count, seed)
    }

    /// The offset applied to every axis of the feature point of the cell containing `cell`.
    /// Cells one period apart share it.
    #[inline]
    pub fn cell_jitter(&self, cell: Vec3, seed: LatticeSeed) -> f32 {
        let cell = cell.floor();
        let wrapped = match self.lattice.period {
            Some(period) => vmod(cell, period),
            None => cell,
        };
        self.jitter.evaluate(wrapped, seed)
    }
}

impl NoiseFunction<Vec2> for JitteredWorley {
    type Output = f32;

    #[inline]
    fn evaluate(&self, input: Vec2, seed: LatticeSeed) -> Self::Output {
        let nearest = self
            .lattice
            .partition(input)
            .iter_neighbors()
            .map(|point| {
                let n = self.cell_jitter(point.cell.extend(0.0), seed);
                let to_feature = input - point.cell - Vec2::splat(n);
                to_feature.length_squared()
            })
            .fold(f32::INFINITY, f32::min);
        nearest.clamp(0.0, 1.0)
    }
}

impl NoiseFunction<Vec3> for JitteredWorley {
    type Output = f32;

    #[inline]
    fn evaluate(&self, input: Vec3, seed: LatticeSeed) -> Self::Output {
        let nearest = self
            .lattice
            .partition(input)
            .iter_neighbors()
            .map(|point| {
                let n = self.cell_jitter(point.cell, seed);
                let to_feature = input - point.cell - Vec3::splat(n);
                to_feature.length_squared()
            })
            .fold(f32::INFINITY, f32::min);
        nearest.clamp(0.0, 1.0)
    }
}
