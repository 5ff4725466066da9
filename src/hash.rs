//! Defines the lattice hash every noise kind is built on.
//! This does not use the `rand` crate: the hash is a pure function of its input, so any sample can be reproduced from its coordinate alone.

use bevy_math::{Vec2, Vec3};

/// The seed of a noise generator.
///
/// There is no RNG state. Instead, the seed is folded into the lattice index before it is hashed, see [`LatticeSeed::offset`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct LatticeSeed(pub i32);

impl LatticeSeed {
    /// An irrational stride so that seeds don't line up with whole lattice indices.
    /// If they did, changing the seed would only shift the same pattern around.
    const STRIDE: f64 = 1.618_034;

    /// The amount this seed adds to a lattice index before hashing.
    /// The zero seed adds exactly nothing.
    ///
    /// This is an `f64`: any `i32` seed times the stride still resolves the fractional axis keys of [`Worley`](crate::cell_noise::Worley).
    #[inline(always)]
    pub fn offset(self) -> f64 {
        f64::from(self.0) * Self::STRIDE
    }

    /// Hashes the lattice index `n` under this seed.
    #[inline(always)]
    pub fn hash(self, n: f64) -> f32 {
        hash(n + self.offset())
    }
}

/// The fractional part of `x`, ex: `x - floor(x)`.
/// Unlike [`f32::fract`], this is always non-negative.
#[inline(always)]
pub fn frac(x: f32) -> f32 {
    x - x.floor()
}

/// Hashes a scalar into an `f32` in range [0, 1].
///
/// This is `frac(sin(n + 1.951) * 43758.5453)`.
/// The product is large enough that an `f32` would lose most of the fractional digits, so this is evaluated in `f64` and rounded at the end.
#[inline]
pub fn hash(n: f64) -> f32 {
    let t = (n + 1.951).sin() * 43_758.545_3;
    (t - t.floor()) as f32
}

/// [`frac`] for each element.
#[inline(always)]
pub fn vfrac(v: Vec3) -> Vec3 {
    v - v.floor()
}

/// Floors each element.
#[inline(always)]
pub fn vfloor(v: Vec3) -> Vec3 {
    v.floor()
}

/// Wraps each element into `[0, m)`, ex: `v - m * floor(v / m)`.
/// Negative elements wrap around to the top of the range.
#[inline(always)]
pub fn vmod(v: Vec3, m: f32) -> Vec3 {
    v - m * (v / m).floor()
}

/// Represents a lattice coordinate that can be collapsed into a single index to be put through [`hash`].
pub trait LatticeIndex {
    /// Collapses these values into a single scalar index.
    fn collapse_for_hash(self) -> f64;
}

/// These multipliers decorrelate neighboring lattice cells once collapsed.
/// The corner offsets of a unit cell are sums of these: 0, 1, 57, 58, 113, 114, 170, 171.
pub const COEFFICIENT_KEYS: [f64; 2] = [57.0, 113.0];

impl LatticeIndex for Vec2 {
    #[inline(always)]
    fn collapse_for_hash(self) -> f64 {
        f64::from(self.x) + f64::from(self.y) * COEFFICIENT_KEYS[0]
    }
}

impl LatticeIndex for Vec3 {
    #[inline(always)]
    fn collapse_for_hash(self) -> f64 {
        f64::from(self.x)
            + f64::from(self.y) * COEFFICIENT_KEYS[0]
            + COEFFICIENT_KEYS[1] * f64::from(self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_hash(n: f64) -> f64 {
        let t = (n + 1.951).sin() * 43758.5453;
        t - t.floor()
    }

    #[test]
    fn hash_matches_reference_formula() {
        for n in [0.0, 1.0, 57.0, 170.0, 171.0, 1234.0, -58.0] {
            let expected = reference_hash(n);
            let actual = f64::from(hash(n));
            assert!(
                (actual - expected).abs() < 1e-5,
                "hash({n}) = {actual}, expected {expected}"
            );
        }
    }

    #[test]
    fn hash_is_unit_ranged() {
        for i in -500..500 {
            let h = hash(f64::from(i) * 0.37);
            assert!((0.0..=1.0).contains(&h), "hash out of range: {h}");
        }
    }

    #[test]
    fn frac_is_non_negative() {
        assert_eq!(frac(1.25), 0.25);
        assert_eq!(frac(-0.25), 0.75);
        assert_eq!(frac(3.0), 0.0);
    }

    #[test]
    fn vmod_wraps_negative_cells() {
        let wrapped = vmod(Vec3::new(-1.0, 4.0, 5.0), 4.0);
        assert_eq!(wrapped, Vec3::new(3.0, 0.0, 1.0));
    }

    #[test]
    fn corner_indices_follow_coefficients() {
        let base = Vec3::new(2.0, 3.0, 4.0);
        let n = base.collapse_for_hash();
        assert_eq!((base + Vec3::X).collapse_for_hash(), n + 1.0);
        assert_eq!((base + Vec3::Y).collapse_for_hash(), n + 57.0);
        assert_eq!((base + Vec3::Z).collapse_for_hash(), n + 113.0);
        assert_eq!((base + Vec3::ONE).collapse_for_hash(), n + 171.0);
    }

    #[test]
    fn zero_seed_is_plain_hash() {
        assert_eq!(LatticeSeed(0).hash(42.0), hash(42.0));
        assert_ne!(LatticeSeed(7).hash(42.0), hash(42.0));
    }

    #[test]
    fn large_seeds_stay_distinct() {
        let (a, b) = (LatticeSeed(1_000_000_000), LatticeSeed(1_000_000_001));
        let differing = (0..64)
            .map(|i| f64::from(i) * 57.0)
            .filter(|&n| a.hash(n) != b.hash(n))
            .count();
        assert_eq!(differing, 64);
    }

    #[test]
    fn large_seeds_keep_fractional_keys_apart() {
        let seed = LatticeSeed(10_000_000);
        let m = Vec3::new(1.0, 2.0, 3.0).collapse_for_hash();
        let axes = [seed.hash(m), seed.hash(m + 0.333), seed.hash(m + 0.667)];
        assert_ne!(axes[0], axes[1]);
        assert_ne!(axes[1], axes[2]);
        assert_ne!(axes[0], axes[2]);
    }

    #[test]
    fn extreme_seeds_are_unit_ranged() {
        for seed in [i32::MIN, -1, i32::MAX] {
            let h = LatticeSeed(seed).hash(171.0);
            assert!((0.0..=1.0).contains(&h), "seed {seed}: {h}");
        }
    }
}
