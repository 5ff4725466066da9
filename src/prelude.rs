//! Contains common imports

pub use crate::{
    Noise, NoiseFunction, Sampleable,
    cell_noise::{JitteredWorley, ValueNoise, Worley},
    composite::{CompositionInputs, composite},
    config::{GenerationLimits, NoiseTextureRecord, TextureKind},
    curves::Smoothstep,
    error::NoiseError,
    field::{CancelFlag, Field, FieldRequest, FieldShape, GenerationProgress, generate_field},
    generator::{Generator, GeneratorParameters, NoiseKind},
    hash::LatticeSeed,
    layering::{Fractal, Persistence},
    math_noise::{ReverseUNorm, invert, remap},
    pipeline::{CloudNoiseSet, CloudNoisePipeline},
};
