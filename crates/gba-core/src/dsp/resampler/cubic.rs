use super::{Phase, Resample};
use crate::dsp::stereo::StereoSample;

/// Four-point cubic interpolation.
///
/// Interpolates between the second-newest and newest history entries, so
/// output lags the input by one sample.
pub struct Cubic {
    phase: Phase,
    // [0] is the newest
    previous: [StereoSample<f32>; 3],
}

impl Default for Cubic {
    fn default() -> Self {
        Self::new()
    }
}

impl Cubic {
    pub fn new() -> Self {
        Self {
            phase: Phase::new(),
            previous: [StereoSample::default(); 3],
        }
    }
}

impl Resample for Cubic {
    fn set_sample_rates(&mut self, source_rate: f32, dest_rate: f32) {
        self.phase.set_sample_rates(source_rate, dest_rate);
    }

    #[inline]
    fn write<F: FnMut(StereoSample<f32>)>(&mut self, input: StereoSample<f32>, mut output: F) {
        let [y2, y1, y0] = self.previous;
        let y3 = input;

        let a0 = y3 - y2 - y0 + y1;
        let a1 = y0 - y1 - a0;
        let a2 = y2 - y0;
        let a3 = y1;

        self.phase.run(|mu| {
            let mu2 = mu * mu;
            output(a0 * (mu * mu2) + a1 * mu2 + a2 * mu + a3);
        });

        self.previous = [input, y2, y1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_between_the_two_middle_history_entries() {
        let mut r = Cubic::new();
        r.set_sample_rates(24_000.0, 48_000.0);

        let mut out = Vec::new();
        for i in 0..8 {
            r.write(StereoSample::splat(i as f32), |s| out.push(s.left));
        }
        // mu = 0 lands exactly on the entry two inputs back and a linear ramp
        // is reproduced exactly in between
        let tail = &out[out.len() - 4..];
        assert_eq!(tail, &[4.0, 4.5, 5.0, 5.5]);
    }

    #[test]
    fn constant_input_is_exact() {
        let mut r = Cubic::new();
        r.set_sample_rates(32_768.0, 48_000.0);

        let mut out = Vec::new();
        for _ in 0..16 {
            r.write(StereoSample::splat(0.5), |s| out.push(s));
        }
        assert!(out[out.len() - 8..].iter().all(|s| *s == StereoSample::splat(0.5)));
    }
}
