use gba_core::config::AudioConfig;

/// Requests from the host to the emulation thread
#[derive(Debug, Clone, PartialEq)]
pub enum EmuCommand {
    Reset,
    Pause(bool),
    SetVolume(i32),
    /// New audio settings, applied with a reset
    SetAudioConfig(AudioConfig),
    Shutdown,
}

/// Notifications from the emulation thread
#[derive(Debug, Clone, PartialEq)]
pub enum EmuEvent {
    Started { sample_rate: u32 },
    /// Audio could not be set up; emulation keeps running silently
    AudioUnavailable(String),
    Stopped { frames: u64, dropped_samples: u64 },
}
