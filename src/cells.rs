//! This contains logic for dividing a domain into lattice cells.

use bevy_math::{Curve, Vec2, Vec3};

use crate::hash::vmod;

/// Represents a portion or cell of some larger domain and a position within that cell.
pub trait DomainCell {
    /// The larger/full domain this is a segment of.
    type Full;

    /// Iterates the 3^N block of cells centered on this one, this one included.
    fn iter_neighbors(&self) -> impl Iterator<Item = CellPoint<Self::Full>>;
}

/// Represents a [`DomainCell`] that can be smoothly interpolated within.
pub trait InterpolatableCell: DomainCell {
    /// Interpolates between the values `f` produces at the corners of this [`DomainCell`] according to some [`Curve`].
    /// Interpolation runs along x first, then y, then z.
    fn interpolate_within(
        &self,
        f: impl FnMut(CellPoint<Self::Full>) -> f32,
        curve: &impl Curve<f32>,
    ) -> f32;
}

/// Represents a lattice cell relevant to a particular [`DomainCell`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPoint<T> {
    /// The least corner of the cell in lattice space.
    /// This is where geometry happens.
    pub cell: T,
    /// [`cell`](Self::cell) wrapped into the tiling period.
    /// This is what gets hashed, so cells one period apart produce the same values.
    pub wrapped: T,
}

/// Represents a type that can partition some domain `T` into cells.
pub trait Partitioner<T> {
    /// The [`DomainCell`] this partitioner produces.
    type Cell: DomainCell<Full = T>;

    /// Constructs the cell containing `full`.
    fn partition(&self, full: T) -> Self::Cell;
}

/// A lattice square or cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeCell<T> {
    /// The least corner of this cell.
    pub floored: T,
    /// The positive offset from [`floored`](Self::floored) to the point in the cell.
    pub offset: T,
    /// The period lattice coordinates wrap at, if any.
    pub period: Option<f32>,
}

/// A [`Partitioner`] that produces [`LatticeCell`]s on the integer lattice.
///
/// When `period` is set, every cell coordinate handed out for hashing is wrapped into `[0, period)`.
/// That is what makes noise built on this lattice tile.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Lattice {
    /// The tiling period in lattice cells.
    pub period: Option<f32>,
}

impl Lattice {
    /// A lattice that repeats every `period` cells along each axis.
    pub fn tiled(period: f32) -> Self {
        Self {
            period: Some(period),
        }
    }
}

impl Partitioner<Vec2> for Lattice {
    type Cell = LatticeCell<Vec2>;

    #[inline]
    fn partition(&self, full: Vec2) -> Self::Cell {
        let floored = full.floor();
        LatticeCell {
            floored,
            offset: full - floored,
            period: self.period,
        }
    }
}

impl Partitioner<Vec3> for Lattice {
    type Cell = LatticeCell<Vec3>;

    #[inline]
    fn partition(&self, full: Vec3) -> Self::Cell {
        let floored = full.floor();
        LatticeCell {
            floored,
            offset: full - floored,
            period: self.period,
        }
    }
}

#[inline(always)]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl LatticeCell<Vec2> {
    #[inline]
    fn point_at_offset(&self, offset: Vec2) -> CellPoint<Vec2> {
        let cell = self.floored + offset;
        let wrapped = match self.period {
            Some(period) => vmod(cell.extend(0.0), period).truncate(),
            None => cell,
        };
        CellPoint { cell, wrapped }
    }

    #[inline]
    fn corners_map<T>(&self, mut f: impl FnMut(CellPoint<Vec2>) -> T) -> [T; 4] {
        [
            f(self.point_at_offset(Vec2::new(0.0, 0.0))),
            f(self.point_at_offset(Vec2::new(1.0, 0.0))),
            f(self.point_at_offset(Vec2::new(0.0, 1.0))),
            f(self.point_at_offset(Vec2::new(1.0, 1.0))),
        ]
    }
}

impl DomainCell for LatticeCell<Vec2> {
    type Full = Vec2;

    #[inline]
    fn iter_neighbors(&self) -> impl Iterator<Item = CellPoint<Self::Full>> {
        (-1..=1).flat_map(move |x| {
            (-1..=1).map(move |y| self.point_at_offset(Vec2::new(x as f32, y as f32)))
        })
    }
}

impl InterpolatableCell for LatticeCell<Vec2> {
    #[inline]
    fn interpolate_within(
        &self,
        f: impl FnMut(CellPoint<Self::Full>) -> f32,
        curve: &impl Curve<f32>,
    ) -> f32 {
        // points
        let [ld, rd, lu, ru] = self.corners_map(f);
        let mix = self.offset.map(|t| curve.sample_unchecked(t));

        // lerp
        let d = lerp(ld, rd, mix.x);
        let u = lerp(lu, ru, mix.x);
        lerp(d, u, mix.y)
    }
}

impl LatticeCell<Vec3> {
    #[inline]
    fn point_at_offset(&self, offset: Vec3) -> CellPoint<Vec3> {
        let cell = self.floored + offset;
        let wrapped = match self.period {
            Some(period) => vmod(cell, period),
            None => cell,
        };
        CellPoint { cell, wrapped }
    }

    #[inline]
    fn corners_map<T>(&self, mut f: impl FnMut(CellPoint<Vec3>) -> T) -> [T; 8] {
        [
            f(self.point_at_offset(Vec3::new(0.0, 0.0, 0.0))),
            f(self.point_at_offset(Vec3::new(1.0, 0.0, 0.0))),
            f(self.point_at_offset(Vec3::new(0.0, 1.0, 0.0))),
            f(self.point_at_offset(Vec3::new(1.0, 1.0, 0.0))),
            f(self.point_at_offset(Vec3::new(0.0, 0.0, 1.0))),
            f(self.point_at_offset(Vec3::new(1.0, 0.0, 1.0))),
            f(self.point_at_offset(Vec3::new(0.0, 1.0, 1.0))),
            f(self.point_at_offset(Vec3::new(1.0, 1.0, 1.0))),
        ]
    }
}

impl DomainCell for LatticeCell<Vec3> {
    type Full = Vec3;

    #[inline]
    fn iter_neighbors(&self) -> impl Iterator<Item = CellPoint<Self::Full>> {
        (-1..=1).flat_map(move |x| {
            (-1..=1).flat_map(move |y| {
                (-1..=1).map(move |z| {
                    self.point_at_offset(Vec3::new(x as f32, y as f32, z as f32))
                })
            })
        })
    }
}

impl InterpolatableCell for LatticeCell<Vec3> {
    #[inline]
    fn interpolate_within(
        &self,
        f: impl FnMut(CellPoint<Self::Full>) -> f32,
        curve: &impl Curve<f32>,
    ) -> f32 {
        // points
        let [ldb, rdb, lub, rub, ldf, rdf, luf, ruf] = self.corners_map(f);
        let mix = self.offset.map(|t| curve.sample_unchecked(t));

        // lerp
        let db = lerp(ldb, rdb, mix.x);
        let ub = lerp(lub, rub, mix.x);
        let df = lerp(ldf, rdf, mix.x);
        let uf = lerp(luf, ruf, mix.x);
        let b = lerp(db, ub, mix.y);
        let f = lerp(df, uf, mix.y);
        lerp(b, f, mix.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::Smoothstep;

    #[test]
    fn partition_splits_floor_and_offset() {
        let cell = Lattice::default().partition(Vec3::new(1.25, -0.5, 3.0));
        assert_eq!(cell.floored, Vec3::new(1.0, -1.0, 3.0));
        assert_eq!(cell.offset, Vec3::new(0.25, 0.5, 0.0));
    }

    #[test]
    fn neighbor_counts() {
        let square = Lattice::default().partition(Vec2::new(0.5, 0.5));
        assert_eq!(square.iter_neighbors().count(), 9);
        let cube = Lattice::default().partition(Vec3::splat(0.5));
        assert_eq!(cube.iter_neighbors().count(), 27);
    }

    #[test]
    fn wrapped_neighbors_stay_in_period() {
        let cube = Lattice::tiled(4.0).partition(Vec3::new(0.5, 3.5, 0.5));
        for point in cube.iter_neighbors() {
            assert!(point.wrapped.cmpge(Vec3::ZERO).all());
            assert!(point.wrapped.cmplt(Vec3::splat(4.0)).all());
        }
    }

    #[test]
    fn interpolation_hits_corners() {
        let lattice = Lattice::default();
        let value = |p: CellPoint<Vec3>| p.cell.x + 10.0 * p.cell.y + 100.0 * p.cell.z;
        let at_origin = lattice
            .partition(Vec3::ZERO)
            .interpolate_within(value, &Smoothstep);
        assert_eq!(at_origin, 0.0);
        let midway = lattice
            .partition(Vec3::new(0.5, 0.0, 0.0))
            .interpolate_within(value, &Smoothstep);
        assert_eq!(midway, 0.5);
    }
}
