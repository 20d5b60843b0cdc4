use super::{Phase, Resample};
use crate::dsp::stereo::StereoSample;

/// Repeats or skips input samples without interpolating.
pub struct Nearest {
    phase: Phase,
}

impl Default for Nearest {
    fn default() -> Self {
        Self::new()
    }
}

impl Nearest {
    pub fn new() -> Self {
        Self {
            phase: Phase::new(),
        }
    }
}

impl Resample for Nearest {
    fn set_sample_rates(&mut self, source_rate: f32, dest_rate: f32) {
        self.phase.set_sample_rates(source_rate, dest_rate);
    }

    #[inline]
    fn write<F: FnMut(StereoSample<f32>)>(&mut self, input: StereoSample<f32>, mut output: F) {
        self.phase.run(|_| output(input));
    }
}
