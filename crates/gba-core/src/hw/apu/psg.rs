/// One programmable sound generator channel.
///
/// Waveform synthesis lives with the channel implementation; the mixer only
/// reads the current output and the sequencer only ticks it.
pub trait PsgChannel {
    /// Current output, a small signed value
    fn sample(&self) -> i16;

    /// Advances envelope, sweep and length state by one sequencer step
    fn tick(&mut self);

    fn reset(&mut self);

    /// Reported through SOUNDCNT_X
    fn is_active(&self) -> bool {
        false
    }
}

/// Channel that outputs nothing
#[derive(Debug, Default, Copy, Clone)]
pub struct SilentChannel;

impl PsgChannel for SilentChannel {
    fn sample(&self) -> i16 {
        0
    }

    fn tick(&mut self) {}

    fn reset(&mut self) {}
}

pub const PSG_CHANNELS: usize = 4;

/// The four PSG channels in hardware order
pub struct PsgBank {
    channels: [Box<dyn PsgChannel>; PSG_CHANNELS],
}

impl Default for PsgBank {
    fn default() -> Self {
        Self::new()
    }
}

impl PsgBank {
    pub fn new() -> Self {
        Self::with_channels([
            Box::new(SilentChannel),
            Box::new(SilentChannel),
            Box::new(SilentChannel),
            Box::new(SilentChannel),
        ])
    }

    pub fn with_channels(channels: [Box<dyn PsgChannel>; PSG_CHANNELS]) -> Self {
        Self { channels }
    }

    #[inline]
    pub fn sample(&self, index: usize) -> i16 {
        self.channels[index].sample()
    }

    pub fn tick(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.tick();
        }
    }

    pub fn reset(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.reset();
        }
    }

    /// Bit n set when channel n is active
    pub fn active_mask(&self) -> u8 {
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, channel)| channel.is_active())
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    pub fn replace(&mut self, index: usize, channel: Box<dyn PsgChannel>) {
        self.channels[index] = channel;
    }
}
