use crate::hw::apu::callback::AudioCallback;
use thiserror::Error;

/// Backend failures, carried as text so the core does not depend on any
/// particular audio library.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioDeviceError {
    #[error("No audio output device available")]
    NoOutputDevice,

    #[error("Unsupported audio device configuration: {0}")]
    UnsupportedConfig(String),

    #[error("Failed to build audio stream: {0}")]
    BuildStream(String),

    #[error("Failed to start audio stream: {0}")]
    Play(String),
}

/// Host audio output.
///
/// `open` binds the callback the backend drives from its own thread.
/// `close` must be safe to call while a callback is in flight and when the
/// device was never opened.
pub trait AudioDevice {
    fn open(&mut self, callback: AudioCallback) -> Result<(), AudioDeviceError>;
    fn close(&mut self);
    fn sample_rate(&self) -> u32;
}

/// Device that never plays anything. Keeps the callback so it can be pulled
/// manually, which is what headless runs and tests do.
pub struct NullAudioDevice {
    sample_rate: u32,
    callback: Option<AudioCallback>,
}

impl NullAudioDevice {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            callback: None,
        }
    }

    pub fn callback(&self) -> Option<&AudioCallback> {
        self.callback.as_ref()
    }
}

impl Default for NullAudioDevice {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SAMPLE_RATE)
    }
}

impl AudioDevice for NullAudioDevice {
    fn open(&mut self, callback: AudioCallback) -> Result<(), AudioDeviceError> {
        self.callback = Some(callback);
        Ok(())
    }

    fn close(&mut self) {
        self.callback = None;
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
