//! Filling whole textures with noise.
//!
//! A [`Field`] is an owned buffer of samples laid out x fastest, then y, then z.
//! Generation splits that buffer into layers (z slices in 3D, rows in 2D) and fills them in parallel.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::{sync::Arc, time::Instant};

use bevy_math::Vec3;
use crossbeam_channel::{Receiver, TryRecvError, bounded};
use rayon::prelude::*;
use tracing::debug;

use crate::{
    NoiseFunction,
    config::GenerationLimits,
    error::NoiseError,
    generator::Generator,
    math_noise::ReverseUNorm,
};

/// The size of a [`Field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldShape {
    /// Samples per axis.
    pub resolution: u32,
    /// Either 2 or 3.
    pub dimensions: u32,
}

impl FieldShape {
    /// Constructs a shape.
    pub fn new(resolution: u32, dimensions: u32) -> Self {
        Self {
            resolution,
            dimensions,
        }
    }

    /// The number of samples, `resolution ^ dimensions`.
    /// Saturates at `usize::MAX`, see [`checked_len`](Self::checked_len).
    #[inline]
    pub fn len(&self) -> usize {
        self.checked_len().unwrap_or(usize::MAX)
    }

    /// The number of samples, or `None` if it does not fit in a `usize`.
    #[inline]
    pub fn checked_len(&self) -> Option<usize> {
        (self.resolution as usize).checked_pow(self.dimensions)
    }

    /// The largest resolution whose sample count fits in a `usize` at `dimensions`.
    pub fn max_resolution(dimensions: u32) -> u32 {
        let fits = |resolution: u32| (resolution as usize).checked_pow(dimensions).is_some();
        let root = (usize::MAX as f64).powf(1.0 / f64::from(dimensions.max(1)));
        let mut resolution = root.min(f64::from(u32::MAX)) as u32;
        while resolution > 1 && !fits(resolution) {
            resolution -= 1;
        }
        while resolution < u32::MAX && fits(resolution + 1) {
            resolution += 1;
        }
        resolution
    }

    /// Whether there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of samples in one generation layer.
    #[inline]
    pub fn layer_len(&self) -> usize {
        (self.resolution as usize).pow(self.dimensions.saturating_sub(1))
    }

    /// The number of generation layers.
    #[inline]
    pub fn layers(&self) -> u32 {
        self.resolution
    }

    /// The buffer index of sample `(x, y, z)`, ex: `x + y * resolution + z * resolution²`.
    #[inline]
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        let res = self.resolution as usize;
        x as usize + y as usize * res + z as usize * res * res
    }

    /// The normalized coordinate of sample `(x, y, z)`, which is in [0, 1).
    #[inline]
    pub fn normalized(&self, x: u32, y: u32, z: u32) -> Vec3 {
        Vec3::new(x as f32, y as f32, z as f32) * (1.0 / self.resolution as f32)
    }
}

/// An owned buffer of noise samples with a [`FieldShape`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    shape: FieldShape,
    data: Vec<T>,
}

impl<T: Clone> Field<T> {
    /// A field where every sample is `value`.
    pub fn filled(shape: FieldShape, value: T) -> Self {
        Self {
            shape,
            data: vec![value; shape.len()],
        }
    }
}

impl<T> Field<T> {
    /// Wraps `data`, if it is the right length for `shape`.
    pub fn from_vec(shape: FieldShape, data: Vec<T>) -> Option<Self> {
        (data.len() == shape.len()).then_some(Self { shape, data })
    }

    /// The shape of this field.
    #[inline]
    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    /// The number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The sample at `(x, y, z)`. In 2D, `z` must be 0.
    #[inline]
    pub fn get(&self, x: u32, y: u32, z: u32) -> Option<&T> {
        let res = self.shape.resolution;
        let depth = if self.shape.dimensions == 2 { 1 } else { res };
        if x >= res || y >= res || z >= depth {
            return None;
        }
        self.data.get(self.shape.index(x, y, z))
    }

    /// All samples in buffer order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Gives up the buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

#[derive(Debug, Default)]
struct ProgressCounters {
    finished: AtomicU32,
    total: AtomicU32,
}

/// How far along a generation is, shared between the generating and the observing side.
#[derive(Debug, Clone, Default)]
pub struct GenerationProgress(Arc<ProgressCounters>);

impl GenerationProgress {
    fn start(&self, total: u32) {
        self.0.finished.store(0, Ordering::Relaxed);
        self.0.total.store(total, Ordering::Relaxed);
    }

    fn finish_layer(&self) {
        self.0.finished.fetch_add(1, Ordering::Relaxed);
    }

    /// Finished layers over total layers, in [0, 1].
    /// This is 0 before generation starts.
    pub fn fraction(&self) -> f32 {
        let total = self.0.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let finished = self.0.finished.load(Ordering::Relaxed).min(total);
        finished as f32 / total as f32
    }

    /// Whether every layer is done.
    pub fn is_complete(&self) -> bool {
        self.fraction() >= 1.0
    }
}

/// Cooperative cancellation shared between a generation and whoever may want to stop it.
/// Layers already being filled finish, but no new ones start.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Asks the generation to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A request for one scalar noise field.
///
/// ```
/// # use cloudnoiz::{field::FieldRequest, generator::{Generator, GeneratorParameters, NoiseKind}};
/// let generator = Generator::new(GeneratorParameters::new(NoiseKind::Value)).unwrap();
/// let field = FieldRequest::new(generator, 16, 3).inverted(true).generate().unwrap();
/// assert_eq!(field.len(), 16 * 16 * 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRequest {
    /// What to sample.
    pub generator: Generator,
    /// Samples per axis.
    pub resolution: u32,
    /// Fractal octaves per sample.
    pub octaves: u32,
    /// Whether samples are flipped to `1 - c`.
    pub invert: bool,
    /// Extra bounds on the resolution, beyond it being non-zero.
    pub limits: Option<GenerationLimits>,
}

impl FieldRequest {
    /// A request that is not inverted and has no extra limits.
    pub fn new(generator: Generator, resolution: u32, octaves: u32) -> Self {
        Self {
            generator,
            resolution,
            octaves,
            invert: false,
            limits: None,
        }
    }

    /// Sets whether samples are flipped to `1 - c`.
    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Holds the resolution to `limits`.
    pub fn with_limits(mut self, limits: GenerationLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Validates the request and returns the shape of the field it produces.
    pub fn shape(&self) -> Result<FieldShape, NoiseError> {
        let limits = self.limits.unwrap_or(GenerationLimits::ANY);
        limits.check(self.resolution)?;
        if self.octaves == 0 {
            return Err(NoiseError::InvalidOctaves(self.octaves));
        }
        let shape = FieldShape::new(self.resolution, self.generator.dimensions());
        if shape.checked_len().is_none() {
            return Err(NoiseError::InvalidResolution {
                resolution: self.resolution,
                min: limits.min_resolution,
                max: FieldShape::max_resolution(shape.dimensions),
            });
        }
        Ok(shape)
    }

    /// Generates the field on the calling thread and the rayon pool.
    pub fn generate(&self) -> Result<Field<f32>, NoiseError> {
        self.generate_with(&GenerationProgress::default(), &CancelFlag::default())
    }

    /// Generates the field, reporting into `progress` and stopping early if `cancel` is set.
    pub fn generate_with(
        &self,
        progress: &GenerationProgress,
        cancel: &CancelFlag,
    ) -> Result<Field<f32>, NoiseError> {
        let shape = self.shape()?;
        let start = Instant::now();
        debug!(
            kind = ?self.generator.parameters().kind,
            resolution = shape.resolution,
            dimensions = shape.dimensions,
            octaves = self.octaves,
            "generating noise field"
        );

        progress.start(shape.layers());
        let seed = self.generator.parameters().seed;
        let mut data = vec![0.0f32; shape.len()];
        data.par_chunks_mut(shape.layer_len())
            .enumerate()
            .try_for_each(|(layer, samples)| {
                if cancel.is_cancelled() {
                    return Err(NoiseError::Cancelled);
                }
                let layer = layer as u32;
                for (i, sample) in samples.iter_mut().enumerate() {
                    let i = i as u32;
                    let coord = if shape.dimensions == 2 {
                        shape.normalized(i, layer, 0)
                    } else {
                        shape.normalized(i % shape.resolution, i / shape.resolution, layer)
                    };
                    let value = self.generator.sample_at(coord, self.octaves);
                    *sample = if self.invert {
                        ReverseUNorm.evaluate(value, seed)
                    } else {
                        value
                    };
                }
                progress.finish_layer();
                Ok(())
            })?;

        if cancel.is_cancelled() {
            return Err(NoiseError::Cancelled);
        }
        debug!(elapsed = ?start.elapsed(), "noise field done");
        Ok(Field { shape, data })
    }

    /// Starts generating on the rayon pool and returns a handle to the result.
    pub fn spawn(self) -> FieldTask {
        self.spawn_with_cancel(CancelFlag::default())
    }

    /// Like [`spawn`](Self::spawn), but stops when `cancel` is set.
    /// This lets one flag stop several tasks.
    pub fn spawn_with_cancel(self, cancel: CancelFlag) -> FieldTask {
        let progress = GenerationProgress::default();
        let (sender, receiver) = bounded(1);
        {
            let progress = progress.clone();
            let cancel = cancel.clone();
            rayon::spawn(move || {
                let result = self.generate_with(&progress, &cancel);
                // The handle may have been dropped, in which case nobody wants the field.
                let _ = sender.send(result);
            });
        }
        FieldTask {
            receiver,
            progress,
            cancel,
        }
    }
}

/// Generates a field for `generator` with no extra limits.
/// Fails when `resolution` or `octaves` is 0.
pub fn generate_field(
    generator: &Generator,
    resolution: u32,
    octaves: u32,
) -> Result<Field<f32>, NoiseError> {
    FieldRequest::new(*generator, resolution, octaves).generate()
}

/// A handle to a field being generated in the background.
#[derive(Debug)]
pub struct FieldTask {
    receiver: Receiver<Result<Field<f32>, NoiseError>>,
    progress: GenerationProgress,
    cancel: CancelFlag,
}

impl FieldTask {
    /// Finished layers over total layers, in [0, 1].
    pub fn progress(&self) -> f32 {
        self.progress.fraction()
    }

    /// Asks the task to stop. It will then finish with [`NoiseError::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Takes the result if it is ready.
    /// Once the result has been taken, this reports [`NoiseError::TaskDisconnected`].
    pub fn try_take(&self) -> Option<Result<Field<f32>, NoiseError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(NoiseError::TaskDisconnected)),
        }
    }

    /// Blocks until the result is ready.
    pub fn wait(self) -> Result<Field<f32>, NoiseError> {
        self.receiver
            .recv()
            .map_err(|_| NoiseError::TaskDisconnected)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GeneratorParameters, NoiseKind};

    fn jittered(frequency: u32) -> Generator {
        Generator::new(GeneratorParameters::new(NoiseKind::JitteredCellular).with_frequency(frequency))
            .unwrap()
    }

    #[test]
    fn indices_are_x_fastest() {
        let shape = FieldShape::new(4, 3);
        assert_eq!(shape.len(), 64);
        assert_eq!(shape.layer_len(), 16);
        assert_eq!(shape.index(1, 0, 0), 1);
        assert_eq!(shape.index(0, 1, 0), 4);
        assert_eq!(shape.index(0, 0, 1), 16);
        assert_eq!(FieldShape::new(4, 2).layer_len(), 4);
    }

    #[test]
    fn rejects_empty_requests() {
        let generator = jittered(4);
        assert!(matches!(
            generate_field(&generator, 0, 1),
            Err(NoiseError::InvalidResolution { resolution: 0, .. })
        ));
        assert_eq!(
            generate_field(&generator, 8, 0),
            Err(NoiseError::InvalidOctaves(0))
        );
    }

    #[test]
    fn jittered_cloud_texture_end_to_end() {
        let generator = jittered(4);
        let field = generate_field(&generator, 16, 1).unwrap();
        assert_eq!(field.len(), 4096);
        assert!(field.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));

        // One full period along x, in lattice units 0 and 4.
        for y in 0..16 {
            for z in 0..16 {
                let yz = Vec3::new(0.0, y as f32 / 16.0, z as f32 / 16.0);
                let a = generator.sample_3d(yz, 1);
                let b = generator.sample_3d(yz + Vec3::X, 1);
                assert!((a - b).abs() < 1e-5);
            }
        }

        assert_eq!(field, generate_field(&generator, 16, 1).unwrap());
    }

    #[test]
    fn samples_land_at_their_index() {
        let generator = jittered(4);
        let field = generate_field(&generator, 16, 2).unwrap();
        let shape = field.shape();
        for (x, y, z) in [(0, 0, 0), (3, 7, 11), (15, 15, 15)] {
            assert_eq!(
                field.get(x, y, z).copied(),
                Some(generator.sample_3d(shape.normalized(x, y, z), 2))
            );
        }
        assert_eq!(field.get(16, 0, 0), None);
    }

    #[test]
    fn two_dimensional_fields_fill_rows() {
        let generator = Generator::new(
            GeneratorParameters::new(NoiseKind::Value).with_dimensions(2),
        )
        .unwrap();
        let field = generate_field(&generator, 16, 3).unwrap();
        assert_eq!(field.len(), 256);
        assert_eq!(
            field.get(5, 9, 0).copied(),
            Some(generator.sample_2d(field.shape().normalized(5, 9, 0).truncate(), 3))
        );
        assert_eq!(field.get(5, 9, 1), None);
    }

    #[test]
    fn inverted_fields_flip_samples() {
        let generator = jittered(4);
        let plain = FieldRequest::new(generator, 16, 1).generate().unwrap();
        let inverted = FieldRequest::new(generator, 16, 1)
            .inverted(true)
            .generate()
            .unwrap();
        for (a, b) in plain.as_slice().iter().zip(inverted.as_slice()) {
            assert_eq!(1.0 - a, *b);
        }
    }

    #[test]
    fn progress_reaches_one() {
        let progress = GenerationProgress::default();
        assert_eq!(progress.fraction(), 0.0);
        FieldRequest::new(jittered(4), 16, 1)
            .generate_with(&progress, &CancelFlag::default())
            .unwrap();
        assert_eq!(progress.fraction(), 1.0);
        assert!(progress.is_complete());
    }

    #[test]
    fn cancelled_generation_reports_it() {
        let cancel = CancelFlag::default();
        cancel.cancel();
        let result =
            FieldRequest::new(jittered(4), 16, 1).generate_with(&GenerationProgress::default(), &cancel);
        assert_eq!(result, Err(NoiseError::Cancelled));
    }

    #[test]
    fn spawned_task_matches_direct_generation() {
        let request = FieldRequest::new(jittered(8), 16, 2);
        let task = request.spawn();
        let field = task.wait().unwrap();
        assert_eq!(field, request.generate().unwrap());
    }

    #[test]
    fn spawned_task_can_be_cancelled_up_front() {
        let cancel = CancelFlag::default();
        cancel.cancel();
        let task = FieldRequest::new(jittered(4), 32, 1).spawn_with_cancel(cancel);
        assert_eq!(task.wait(), Err(NoiseError::Cancelled));
    }

    #[test]
    fn limits_are_enforced() {
        let request = FieldRequest::new(jittered(4), 8, 1).with_limits(GenerationLimits::default());
        assert!(matches!(
            request.generate(),
            Err(NoiseError::InvalidResolution { resolution: 8, min: 16, max: 256 })
        ));
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let request = FieldRequest::new(jittered(4), u32::MAX, 1);
        let max = FieldShape::max_resolution(3);
        assert_eq!(
            request.shape(),
            Err(NoiseError::InvalidResolution {
                resolution: u32::MAX,
                min: 1,
                max,
            })
        );
        assert!(matches!(
            request.generate(),
            Err(NoiseError::InvalidResolution { .. })
        ));
        assert_eq!(FieldShape::new(u32::MAX, 3).checked_len(), None);
        assert!(FieldShape::new(max, 3).checked_len().is_some());
        assert_eq!(FieldShape::new(max + 1, 3).checked_len(), None);
    }
}
