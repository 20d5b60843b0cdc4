use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Host sample rates the resampler is sized for
pub const SUPPORTED_SAMPLE_RATES: std::ops::RangeInclusive<u32> = 8_000..=192_000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unsupported sample rate {rate} Hz for {interpolation:?} interpolation")]
    UnsupportedSampleRate {
        rate: u32,
        interpolation: Interpolation,
    },

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f32),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpolation {
    Nearest,
    Cosine,
    #[default]
    Cubic,
    #[serde(rename = "sinc-32")]
    Sinc32,
    #[serde(rename = "sinc-64")]
    Sinc64,
    #[serde(rename = "sinc-128")]
    Sinc128,
    #[serde(rename = "sinc-256")]
    Sinc256,
}

/// Intermediate precision used by the mixer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MixerPrecision {
    /// Saturating 10-bit arithmetic, as the hardware DAC does it
    #[default]
    FixedPoint,
    /// Floating accumulation without the bias/saturation stage
    Float,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub interpolation: Interpolation,
    /// Output volume in percent, clamped to 0..=100 where it is used
    pub volume: i32,
    /// Preferred device rate. The device may override it.
    pub sample_rate: u32,
    pub mixer_precision: MixerPrecision,
    pub pace_to_wall_clock: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::default(),
            volume: 100,
            sample_rate: DEFAULT_SAMPLE_RATE,
            mixer_precision: MixerPrecision::default(),
            pace_to_wall_clock: false,
        }
    }
}

impl AudioConfig {
    /// Volume as a 0.0..=1.0 gain
    pub fn gain(&self) -> f32 {
        self.volume.clamp(0, 100) as f32 / 100.0
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
}

/// Checks a device sample rate against what the resampler supports.
pub fn validate_sample_rate(rate: f32, interpolation: Interpolation) -> Result<u32, ConfigError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ConfigError::InvalidSampleRate(rate));
    }
    let rate = rate.round() as u32;
    if !SUPPORTED_SAMPLE_RATES.contains(&rate) {
        return Err(ConfigError::UnsupportedSampleRate {
            rate,
            interpolation,
        });
    }
    Ok(rate)
}
