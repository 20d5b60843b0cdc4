use super::{Phase, Resample};
use crate::dsp::ring_buffer::StereoRingBuffer;
use crate::dsp::stereo::StereoSample;
use std::f64::consts::PI;

/// Kernel samples per unit of phase
const LUT_RESOLUTION: usize = 512;

/// Lowpass cutoff relative to the source Nyquist frequency
const CUTOFF: f64 = 0.95;

/// Blackman-windowed sinc interpolation over `POINTS` taps.
///
/// The kernel is tabulated whenever the rates change. When downsampling the
/// cutoff is lowered by the rate ratio to suppress aliasing.
pub struct Sinc<const POINTS: usize> {
    phase: Phase,
    taps: StereoRingBuffer<f32, POINTS>,
    // POINTS rows of LUT_RESOLUTION + 1 columns so phase 1.0 stays in its row
    lut: Vec<f32>,
}

impl<const POINTS: usize> Default for Sinc<POINTS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const POINTS: usize> Sinc<POINTS> {
    const ROW: usize = LUT_RESOLUTION + 1;

    pub fn new() -> Self {
        let mut sinc = Self {
            phase: Phase::new(),
            taps: StereoRingBuffer::new(),
            lut: vec![0.0; POINTS * Self::ROW],
        };
        for _ in 0..POINTS {
            sinc.taps.push(StereoSample::default());
        }
        sinc.build_kernel();
        sinc
    }

    fn build_kernel(&mut self) {
        let mut cutoff = CUTOFF;
        if self.phase.shift() > 1.0 {
            cutoff /= self.phase.shift();
        }

        let points = POINTS as f64;
        let mut kernel_sum = 0.0;

        for n in 0..POINTS {
            for m in 0..Self::ROW {
                let t = m as f64 / LUT_RESOLUTION as f64;
                let x1 = PI * (t - n as f64 + points / 2.0) + 1e-6;
                let x2 = 2.0 * PI * (n as f64 + t) / points;
                let sinc = (cutoff * x1).sin() / x1;
                let blackman = 0.42 - 0.49 * x2.cos() + 0.076 * (2.0 * x2).cos();
                let value = sinc * blackman;

                self.lut[n * Self::ROW + m] = value as f32;
                if m < LUT_RESOLUTION {
                    kernel_sum += value;
                }
            }
        }

        let gain = (kernel_sum / LUT_RESOLUTION as f64) as f32;
        for v in self.lut.iter_mut() {
            *v /= gain;
        }
    }
}

impl<const POINTS: usize> Resample for Sinc<POINTS> {
    fn set_sample_rates(&mut self, source_rate: f32, dest_rate: f32) {
        self.phase.set_sample_rates(source_rate, dest_rate);
        self.build_kernel();
    }

    #[inline]
    fn write<F: FnMut(StereoSample<f32>)>(&mut self, input: StereoSample<f32>, mut output: F) {
        // always full, so this drops the oldest tap
        self.taps.push(input);

        let taps = &self.taps;
        let lut = &self.lut;
        self.phase.run(|mu| {
            let column = (mu * LUT_RESOLUTION as f32).round() as usize;
            let mut sample = StereoSample::default();
            for n in 0..POINTS {
                sample += taps.peek(n) * lut[n * Self::ROW + column];
            }
            output(sample);
        });
    }
}
