//! Stored noise texture settings, resolution limits and the presets used for cloud rendering.

use crate::{
    error::NoiseError,
    field::FieldRequest,
    generator::{Generator, GeneratorParameters, NoiseKind},
    hash::LatticeSeed,
};

/// Every kind of texture a [`NoiseTextureRecord`] can describe.
/// This is [`NoiseKind`] plus the Perlin-Worley composite, which is built from several fields instead of one generator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureKind {
    /// See [`NoiseKind::Value`].
    #[default]
    Value,
    /// See [`NoiseKind::Cellular`].
    Cellular,
    /// See [`NoiseKind::JitteredCellular`].
    JitteredCellular,
    /// The 4-channel composite, see [`composite`](crate::composite::composite).
    PerlinWorley,
}

impl TextureKind {
    /// The single generator kind, if this is not a composite.
    pub fn noise_kind(self) -> Option<NoiseKind> {
        match self {
            Self::Value => Some(NoiseKind::Value),
            Self::Cellular => Some(NoiseKind::Cellular),
            Self::JitteredCellular => Some(NoiseKind::JitteredCellular),
            Self::PerlinWorley => None,
        }
    }
}

impl From<NoiseKind> for TextureKind {
    fn from(kind: NoiseKind) -> Self {
        match kind {
            NoiseKind::Value => Self::Value,
            NoiseKind::Cellular => Self::Cellular,
            NoiseKind::JitteredCellular => Self::JitteredCellular,
        }
    }
}

/// The accepted range of field resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationLimits {
    /// The smallest accepted resolution.
    pub min_resolution: u32,
    /// The largest accepted resolution.
    pub max_resolution: u32,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            min_resolution: 16,
            max_resolution: 256,
        }
    }
}

impl GenerationLimits {
    /// Accepts any resolution a field can be made at.
    pub const ANY: Self = Self {
        min_resolution: 1,
        max_resolution: u32::MAX,
    };

    /// Fails if `resolution` is outside these limits.
    pub fn check(&self, resolution: u32) -> Result<(), NoiseError> {
        if (self.min_resolution..=self.max_resolution).contains(&resolution) {
            Ok(())
        } else {
            Err(NoiseError::InvalidResolution {
                resolution,
                min: self.min_resolution,
                max: self.max_resolution,
            })
        }
    }
}

/// The stored settings of one noise texture.
/// Rebuilding a field from the same record reproduces it exactly.
///
/// ```
/// # use cloudnoiz::config::NoiseTextureRecord;
/// let record = NoiseTextureRecord::shape_perlin(32);
/// let field = record.request().unwrap().generate().unwrap();
/// assert_eq!(field.len(), 32 * 32 * 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseTextureRecord {
    /// Either 2 or 3.
    pub dimensions: u32,
    /// The number of fractal octaves, usually 1 through 6.
    pub fractal_octaves: u32,
    /// Samples per axis.
    pub resolution: u32,
    /// Lattice cells per texture.
    pub frequency: u32,
    /// Whether samples are flipped to `1 - c`.
    pub revert: bool,
    /// Which texture this is.
    pub noise_kind: TextureKind,
    /// The seed. Missing from older records, where it is 0.
    #[cfg_attr(feature = "serialize", serde(default))]
    pub seed: i32,
    /// The tiling period in lattice cells.
    /// When absent, this is [`frequency`](Self::frequency), which tiles over the whole texture.
    #[cfg_attr(feature = "serialize", serde(default))]
    pub repeat: Option<u32>,
}

impl Default for NoiseTextureRecord {
    fn default() -> Self {
        Self {
            dimensions: 2,
            fractal_octaves: 4,
            resolution: 64,
            frequency: 4,
            revert: false,
            noise_kind: TextureKind::Value,
            seed: 0,
            repeat: None,
        }
    }
}

impl NoiseTextureRecord {
    /// The low frequency value noise that gives clouds their overall shape.
    pub fn shape_perlin(resolution: u32) -> Self {
        Self {
            dimensions: 3,
            fractal_octaves: 4,
            resolution,
            frequency: 4,
            ..Default::default()
        }
    }

    /// Inverted jittered cellular noise at `frequency`, a single octave.
    /// Three of these at rising frequencies erode the shape, and four more add detail.
    pub fn billow_worley(resolution: u32, frequency: u32) -> Self {
        Self {
            dimensions: 3,
            fractal_octaves: 1,
            resolution,
            frequency,
            revert: true,
            noise_kind: TextureKind::JitteredCellular,
            ..Default::default()
        }
    }

    /// The eight source textures of a cloud noise set:
    /// the shape value noise, three shape cellular layers at 4, 8 and 16 cells, and four detail cellular layers at 8, 16, 32 and 64 cells.
    pub fn cloud_shape_set(resolution: u32) -> [Self; 8] {
        [
            Self::shape_perlin(resolution),
            Self::billow_worley(resolution, 4),
            Self::billow_worley(resolution, 8),
            Self::billow_worley(resolution, 16),
            Self::billow_worley(resolution, 8),
            Self::billow_worley(resolution, 16),
            Self::billow_worley(resolution, 32),
            Self::billow_worley(resolution, 64),
        ]
    }

    /// Replaces the seed.
    pub fn with_seed(mut self, seed: i32) -> Self {
        self.seed = seed;
        self
    }

    /// The generator settings this record describes.
    pub fn generator_parameters(&self) -> Result<GeneratorParameters, NoiseError> {
        let kind = self.noise_kind.noise_kind().ok_or(NoiseError::CompositeKind)?;
        Ok(GeneratorParameters {
            kind,
            frequency: self.frequency,
            repeat: self.repeat.unwrap_or(self.frequency),
            seed: LatticeSeed(self.seed),
            dimensions: self.dimensions,
        })
    }

    /// Builds the generator this record describes.
    pub fn generator(&self) -> Result<Generator, NoiseError> {
        Generator::new(self.generator_parameters()?)
    }

    /// Builds a request for this record's field, held to the default [`GenerationLimits`].
    pub fn request(&self) -> Result<FieldRequest, NoiseError> {
        let request = FieldRequest::new(self.generator()?, self.resolution, self.fractal_octaves)
            .inverted(self.revert)
            .with_limits(GenerationLimits::default());
        request.shape()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_reject_out_of_range() {
        let limits = GenerationLimits::default();
        assert!(limits.check(16).is_ok());
        assert!(limits.check(256).is_ok());
        assert_eq!(
            limits.check(8),
            Err(NoiseError::InvalidResolution {
                resolution: 8,
                min: 16,
                max: 256
            })
        );
        assert!(limits.check(512).is_err());
    }

    #[test]
    fn repeat_defaults_to_frequency() {
        let record = NoiseTextureRecord {
            frequency: 6,
            ..Default::default()
        };
        let params = record.generator_parameters().unwrap();
        assert_eq!(params.repeat, 6);
        assert_eq!(params.seed, LatticeSeed(0));
    }

    #[test]
    fn composite_kind_has_no_generator() {
        let record = NoiseTextureRecord {
            noise_kind: TextureKind::PerlinWorley,
            ..Default::default()
        };
        assert_eq!(record.generator().err(), Some(NoiseError::CompositeKind));
    }

    #[test]
    fn request_applies_default_limits() {
        let record = NoiseTextureRecord {
            resolution: 4,
            ..Default::default()
        };
        assert!(matches!(
            record.request(),
            Err(NoiseError::InvalidResolution { resolution: 4, .. })
        ));
    }

    #[test]
    fn cloud_set_is_three_dimensional() {
        let set = NoiseTextureRecord::cloud_shape_set(32);
        assert_eq!(set[0].noise_kind, TextureKind::Value);
        for record in &set[1..] {
            assert_eq!(record.noise_kind, TextureKind::JitteredCellular);
            assert!(record.revert);
        }
        assert!(set.iter().all(|r| r.dimensions == 3 && r.resolution == 32));
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn record_round_trips_through_json() {
        let record = NoiseTextureRecord::billow_worley(16, 4).with_seed(3);
        let json = serde_json::to_string(&record).unwrap();
        let restored: NoiseTextureRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);

        let original = record.request().unwrap().generate().unwrap();
        let regenerated = restored.request().unwrap().generate().unwrap();
        assert_eq!(original, regenerated);
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn older_records_default_seed_and_repeat() {
        let json = r#"{
            "dimensions": 3,
            "fractal_octaves": 2,
            "resolution": 16,
            "frequency": 5,
            "revert": false,
            "noise_kind": "Cellular"
        }"#;
        let record: NoiseTextureRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.seed, 0);
        assert_eq!(record.repeat, None);
        assert_eq!(record.generator_parameters().unwrap().repeat, 5);
    }
}
