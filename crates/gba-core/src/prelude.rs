//! Convenient imports for consumers of gba-core
//!
//! Pull in everything commonly needed in one line:
//! ```rust
//! use gba_core::prelude::*;
//! ```

// Timing
pub use crate::scheduler::{EventClass, Handler, Scheduler};

// Audio hardware
pub use crate::hw::apu::callback::{AudioCallback, BlockReader};
pub use crate::hw::apu::device::{AudioDevice, AudioDeviceError, NullAudioDevice};
pub use crate::hw::apu::dma::{DmaOccasion, FifoDma};
pub use crate::hw::apu::psg::{PsgBank, PsgChannel};
pub use crate::hw::apu::{Apu, ApuError};
pub use crate::hw::irq::Irq;

// DSP
pub use crate::dsp::resampler::{Resample, Resampler};
pub use crate::dsp::ring_buffer::{RingBlockBuffer, RingBuffer};
pub use crate::dsp::stereo::StereoSample;

// Configuration and state
pub use crate::config::{AudioConfig, Config, ConfigError, Interpolation, MixerPrecision};
pub use crate::save_state::{SaveState, SaveStateError};

// Constants
pub use crate::CPU_HZ;
