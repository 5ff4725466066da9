//! The error type shared by generation, configuration and background tasks.

use thiserror::Error;

/// Why a generator, field or task could not be produced.
///
/// Configuration problems are reported as soon as they are seen and are never clamped into range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoiseError {
    /// The frequency was zero.
    #[error("frequency must be at least 1, got {0}")]
    InvalidFrequency(u32),
    /// The tiling period was zero.
    #[error("repeat must be at least 1, got {0}")]
    InvalidRepeat(u32),
    /// Only 2 and 3 dimensional noise exists.
    #[error("dimensions must be 2 or 3, got {0}")]
    InvalidDimensions(u32),
    /// The field resolution was outside the accepted range.
    #[error("resolution {resolution} is outside {min}..={max}")]
    InvalidResolution {
        /// The requested resolution.
        resolution: u32,
        /// The smallest accepted resolution.
        min: u32,
        /// The largest accepted resolution.
        max: u32,
    },
    /// Fractal layering needs at least one octave.
    #[error("octaves must be at least 1, got {0}")]
    InvalidOctaves(u32),
    /// The record names a composite of several fields, which has no single generator.
    #[error("perlin-worley is a composite of several fields and has no single generator")]
    CompositeKind,
    /// Generation was cancelled before it finished.
    #[error("generation was cancelled")]
    Cancelled,
    /// A background generation task ended without sending a result.
    #[error("generation task disconnected before producing a field")]
    TaskDisconnected,
}
