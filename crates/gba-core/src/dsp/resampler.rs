//! Sample rate conversion from the mixer's fixed rate to the host device rate.
//!
//! Every algorithm sits behind [`Resample`]; [`Resampler`] is the closed set
//! picked once from configuration so the mixer never dispatches dynamically
//! per sample.

use crate::config::Interpolation;
use crate::dsp::stereo::StereoSample;

mod cosine;
mod cubic;
mod nearest;
mod sinc;

pub use cosine::Cosine;
pub use cubic::Cubic;
pub use nearest::Nearest;
pub use sinc::Sinc;

/// Stream-to-stream sample rate converter.
pub trait Resample {
    /// Configures the conversion ratio
    fn set_sample_rates(&mut self, source_rate: f32, dest_rate: f32);

    /// Consumes one source-rate sample and emits zero or more
    /// destination-rate samples into `output`.
    fn write<F: FnMut(StereoSample<f32>)>(&mut self, input: StereoSample<f32>, output: F);
}

/// Fractional read position shared by all algorithms.
///
/// `phase` walks 0.0..1.0 between the previous and the current input; each
/// emitted sample advances it by `source / dest`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Phase {
    shift: f64,
    phase: f64,
}

impl Phase {
    pub(crate) fn new() -> Self {
        Self {
            shift: 1.0,
            phase: 0.0,
        }
    }

    pub(crate) fn set_sample_rates(&mut self, source_rate: f32, dest_rate: f32) {
        self.shift = f64::from(source_rate) / f64::from(dest_rate);
        self.phase = 0.0;
    }

    #[inline]
    pub(crate) fn shift(&self) -> f64 {
        self.shift
    }

    /// Calls `emit` with the current fraction for every output sample that
    /// falls before the next input.
    #[inline]
    pub(crate) fn run(&mut self, mut emit: impl FnMut(f32)) {
        while self.phase < 1.0 {
            emit(self.phase as f32);
            self.phase += self.shift;
        }
        self.phase -= 1.0;
    }
}

pub enum Resampler {
    Nearest(Nearest),
    Cosine(Cosine),
    Cubic(Cubic),
    Sinc32(Box<Sinc<32>>),
    Sinc64(Box<Sinc<64>>),
    Sinc128(Box<Sinc<128>>),
    Sinc256(Box<Sinc<256>>),
}

impl Resampler {
    pub fn new(interpolation: Interpolation) -> Self {
        match interpolation {
            Interpolation::Nearest => Resampler::Nearest(Nearest::new()),
            Interpolation::Cosine => Resampler::Cosine(Cosine::new()),
            Interpolation::Cubic => Resampler::Cubic(Cubic::new()),
            Interpolation::Sinc32 => Resampler::Sinc32(Box::new(Sinc::new())),
            Interpolation::Sinc64 => Resampler::Sinc64(Box::new(Sinc::new())),
            Interpolation::Sinc128 => Resampler::Sinc128(Box::new(Sinc::new())),
            Interpolation::Sinc256 => Resampler::Sinc256(Box::new(Sinc::new())),
        }
    }

    pub fn interpolation(&self) -> Interpolation {
        match self {
            Resampler::Nearest(_) => Interpolation::Nearest,
            Resampler::Cosine(_) => Interpolation::Cosine,
            Resampler::Cubic(_) => Interpolation::Cubic,
            Resampler::Sinc32(_) => Interpolation::Sinc32,
            Resampler::Sinc64(_) => Interpolation::Sinc64,
            Resampler::Sinc128(_) => Interpolation::Sinc128,
            Resampler::Sinc256(_) => Interpolation::Sinc256,
        }
    }
}

impl Resample for Resampler {
    fn set_sample_rates(&mut self, source_rate: f32, dest_rate: f32) {
        match self {
            Resampler::Nearest(r) => r.set_sample_rates(source_rate, dest_rate),
            Resampler::Cosine(r) => r.set_sample_rates(source_rate, dest_rate),
            Resampler::Cubic(r) => r.set_sample_rates(source_rate, dest_rate),
            Resampler::Sinc32(r) => r.set_sample_rates(source_rate, dest_rate),
            Resampler::Sinc64(r) => r.set_sample_rates(source_rate, dest_rate),
            Resampler::Sinc128(r) => r.set_sample_rates(source_rate, dest_rate),
            Resampler::Sinc256(r) => r.set_sample_rates(source_rate, dest_rate),
        }
    }

    #[inline]
    fn write<F: FnMut(StereoSample<f32>)>(&mut self, input: StereoSample<f32>, output: F) {
        match self {
            Resampler::Nearest(r) => r.write(input, output),
            Resampler::Cosine(r) => r.write(input, output),
            Resampler::Cubic(r) => r.write(input, output),
            Resampler::Sinc32(r) => r.write(input, output),
            Resampler::Sinc64(r) => r.write(input, output),
            Resampler::Sinc128(r) => r.write(input, output),
            Resampler::Sinc256(r) => r.write(input, output),
        }
    }
}
