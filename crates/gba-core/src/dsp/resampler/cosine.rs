use super::{Phase, Resample};
use crate::dsp::stereo::StereoSample;
use std::f32::consts::PI;

/// Cosine-shaped crossfade between neighbouring inputs.
pub struct Cosine {
    phase: Phase,
    previous: StereoSample<f32>,
}

impl Default for Cosine {
    fn default() -> Self {
        Self::new()
    }
}

impl Cosine {
    pub fn new() -> Self {
        Self {
            phase: Phase::new(),
            previous: StereoSample::default(),
        }
    }
}

impl Resample for Cosine {
    fn set_sample_rates(&mut self, source_rate: f32, dest_rate: f32) {
        self.phase.set_sample_rates(source_rate, dest_rate);
    }

    #[inline]
    fn write<F: FnMut(StereoSample<f32>)>(&mut self, input: StereoSample<f32>, mut output: F) {
        let previous = self.previous;
        self.phase.run(|mu| {
            let x = (1.0 - (mu * PI).cos()) * 0.5;
            output(previous * (1.0 - x) + input * x);
        });
        self.previous = input;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halfway_point_is_the_midpoint() {
        let mut r = Cosine::new();
        r.set_sample_rates(24_000.0, 48_000.0);

        let mut out = Vec::new();
        r.write(StereoSample::splat(1.0), |s| out.push(s.left));
        // phase 0.0 -> previous (0.0), phase 0.5 -> halfway
        assert_eq!(out.len(), 2);
        assert!(out[0].abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }
}
