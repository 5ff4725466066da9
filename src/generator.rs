//! The user facing generator: validated parameters plus a closed choice of noise kind.

use bevy_math::{Vec2, Vec3};

use crate::{
    Noise, NoiseFunction, Sampleable,
    cell_noise::{JitteredWorley, ValueNoise, Worley},
    error::NoiseError,
    hash::LatticeSeed,
    layering::Fractal,
    math_noise::ClampUNorm,
};

/// The kinds of noise a single [`Generator`] can produce.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum NoiseKind {
    /// Smooth value noise, see [`ValueNoise`].
    #[default]
    Value,
    /// Classic cellular noise, see [`Worley`].
    Cellular,
    /// Cellular noise with value noise jitter, see [`JitteredWorley`].
    JitteredCellular,
}

/// Everything that determines a [`Generator`]'s output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorParameters {
    /// Which noise to produce.
    pub kind: NoiseKind,
    /// How many lattice cells span one unit of normalized input.
    pub frequency: u32,
    /// The tiling period, in lattice cells.
    /// Setting this equal to [`frequency`](Self::frequency) makes the noise tile over [0, 1).
    pub repeat: u32,
    /// The seed.
    pub seed: LatticeSeed,
    /// Either 2 or 3.
    pub dimensions: u32,
}

impl Default for GeneratorParameters {
    fn default() -> Self {
        Self::new(NoiseKind::default())
    }
}

impl GeneratorParameters {
    /// 3D parameters for `kind` at frequency 4, tiling over [0, 1) with seed 0.
    pub fn new(kind: NoiseKind) -> Self {
        Self {
            kind,
            frequency: 4,
            repeat: 4,
            seed: LatticeSeed(0),
            dimensions: 3,
        }
    }

    /// Sets the frequency and makes the repeat match it.
    pub fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self.repeat = frequency;
        self
    }

    /// Sets the tiling period in lattice cells.
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: i32) -> Self {
        self.seed = LatticeSeed(seed);
        self
    }

    /// Sets the number of dimensions.
    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Checks the invariants a [`Generator`] relies on.
    pub fn validate(&self) -> Result<(), NoiseError> {
        if self.frequency < 1 {
            return Err(NoiseError::InvalidFrequency(self.frequency));
        }
        if self.repeat < 1 {
            return Err(NoiseError::InvalidRepeat(self.repeat));
        }
        if !matches!(self.dimensions, 2 | 3) {
            return Err(NoiseError::InvalidDimensions(self.dimensions));
        }
        Ok(())
    }
}

/// The three noise primitives behind one type so [`Fractal`] can layer whichever is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Primitive {
    Value(ValueNoise),
    Cellular(Worley),
    JitteredCellular(JitteredWorley),
}

impl Primitive {
    fn new(kind: NoiseKind, period: f32) -> Self {
        match kind {
            NoiseKind::Value => Self::Value(ValueNoise::tiled(period)),
            NoiseKind::Cellular => Self::Cellular(Worley::tiled(period)),
            NoiseKind::JitteredCellular => Self::JitteredCellular(JitteredWorley::tiled(period)),
        }
    }
}

macro_rules! impl_primitive_dispatch {
    ($n:ty) => {
        impl NoiseFunction<$n> for Primitive {
            type Output = f32;

            #[inline]
            fn evaluate(&self, input: $n, seed: LatticeSeed) -> Self::Output {
                match self {
                    Self::Value(noise) => noise.evaluate(input, seed),
                    Self::Cellular(noise) => noise.evaluate(input, seed),
                    Self::JitteredCellular(noise) => noise.evaluate(input, seed),
                }
            }
        }
    };
}

impl_primitive_dispatch!(Vec2);
impl_primitive_dispatch!(Vec3);

/// Samples one kind of tileable noise at normalized coordinates.
///
/// A generator is immutable and holds no state between samples, so it can be shared freely between threads.
///
/// ```
/// # use bevy_math::Vec3;
/// # use cloudnoiz::generator::{Generator, GeneratorParameters, NoiseKind};
/// let generator = Generator::new(GeneratorParameters::new(NoiseKind::JitteredCellular)).unwrap();
/// let a = generator.sample_3d(Vec3::new(0.0, 0.25, 0.5), 1);
/// let b = generator.sample_3d(Vec3::new(1.0, 0.25, 0.5), 1);
/// assert!((a - b).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Generator {
    parameters: GeneratorParameters,
    primitive: Primitive,
}

impl Generator {
    /// Validates `parameters` and builds the generator they describe.
    pub fn new(parameters: GeneratorParameters) -> Result<Self, NoiseError> {
        parameters.validate()?;
        Ok(Self {
            parameters,
            primitive: Primitive::new(parameters.kind, parameters.repeat as f32),
        })
    }

    /// The parameters this was built from.
    #[inline]
    pub fn parameters(&self) -> &GeneratorParameters {
        &self.parameters
    }

    /// The number of dimensions this samples in.
    #[inline]
    pub fn dimensions(&self) -> u32 {
        self.parameters.dimensions
    }

    #[inline]
    fn layered(&self, octaves: u32) -> Noise<(Fractal<Primitive>, ClampUNorm)> {
        Noise {
            noise: (Fractal::new(self.primitive, octaves), ClampUNorm),
            seed: self.parameters.seed,
            frequency: self.parameters.frequency as f32,
        }
    }

    /// Samples 2D noise at `coord` with `octaves` layers of detail.
    /// The result is in [0, 1], and zero octaves produce zero.
    #[inline]
    pub fn sample_2d(&self, coord: Vec2, octaves: u32) -> f32 {
        self.layered(octaves).sample(coord)
    }

    /// Samples 3D noise at `coord` with `octaves` layers of detail.
    /// The result is in [0, 1], and zero octaves produce zero.
    #[inline]
    pub fn sample_3d(&self, coord: Vec3, octaves: u32) -> f32 {
        self.layered(octaves).sample(coord)
    }

    /// Samples according to this generator's dimensions.
    /// In 2D, `coord.z` is ignored.
    #[inline]
    pub fn sample_at(&self, coord: Vec3, octaves: u32) -> f32 {
        if self.parameters.dimensions == 2 {
            self.sample_2d(coord.truncate(), octaves)
        } else {
            self.sample_3d(coord, octaves)
        }
    }
}
