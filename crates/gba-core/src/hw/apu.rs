use crate::CPU_HZ;
use crate::config::{self, AudioConfig, ConfigError, MixerPrecision};
use crate::dsp::resampler::{Resample, Resampler};
use crate::dsp::ring_buffer::StereoRingBuffer;
use crate::dsp::stereo::{LEFT, RIGHT, StereoSample};
use crate::hw::apu::callback::{AudioBuffer, AudioCallback, SharedAudioBuffer};
use crate::hw::apu::device::{AudioDevice, AudioDeviceError};
use crate::hw::apu::dma::{DmaOccasion, FifoDma};
use crate::hw::apu::fifo::{Fifo, FifoPipe};
use crate::hw::apu::pacer::Pacer;
use crate::hw::apu::psg::{PSG_CHANNELS, PsgBank};
use crate::hw::apu::sound_control::{
    DMA_VOLUME_TAB, PSG_VOLUME_TAB, SoundBias, SoundControl,
};
use crate::scheduler::{EventClass, Scheduler};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub mod callback;
pub mod device;
pub mod dma;
pub mod fifo;
mod pacer;
pub mod psg;
pub mod sound_control;


/// Rate the mixer runs at before resampling to the device
pub const MIXER_SAMPLE_RATE: f64 = 48_000.0;

/// Mixer period in (fractional) CPU cycles
pub const CYCLES_PER_SAMPLE: f64 = CPU_HZ as f64 / MIXER_SAMPLE_RATE;

/// Sequencer period in CPU cycles (512 Hz)
pub const CYCLES_PER_STEP: i64 = (CPU_HZ / 512) as i64;

pub const REG_SOUNDCNT_L: u32 = 0x0400_0080;
pub const REG_SOUNDCNT_H: u32 = 0x0400_0082;
pub const REG_SOUNDCNT_X: u32 = 0x0400_0084;
pub const REG_SOUNDBIAS: u32 = 0x0400_0088;
pub const REG_FIFO_A: u32 = 0x0400_00A0;
pub const REG_FIFO_B: u32 = 0x0400_00A4;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApuError {
    #[error("Invalid APU register read: 0x{0:08X}")]
    InvalidRegisterRead(u32),

    #[error("Invalid APU register write: 0x{0:08X}")]
    InvalidRegisterWrite(u32),

    #[error("Audio device error: {0}")]
    Device(#[from] AudioDeviceError),

    #[error("Audio configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Sound hardware: control registers, DMA FIFOs and the mixer that feeds the
/// host audio device.
///
/// Runs entirely on scheduler events. The only state shared with another
/// thread is the output buffer behind `buffer`.
pub struct Apu {
    pub soundcnt: SoundControl,
    pub bias: SoundBias,
    pub psg: PsgBank,

    fifo: [Fifo; 2],
    fifo_pipe: [FifoPipe; 2],
    latch: [i8; 2],

    config: AudioConfig,
    device: Box<dyn AudioDevice>,
    device_rate: u32,

    buffer: SharedAudioBuffer,
    resampler: Resampler,
    // device-rate output of one mixer step, flushed under a single lock
    staging: StereoRingBuffer<i16, 8>,
    pacer: Pacer,
    dropped_reported: u64,

    pub error: Option<ApuError>,
}

impl AsMut<Apu> for Apu {
    fn as_mut(&mut self) -> &mut Apu {
        self
    }
}

impl Apu {
    /// Builds a silent APU. Nothing plays and no events run until
    /// [`Apu::reset`].
    pub fn new(config: &AudioConfig, device: Box<dyn AudioDevice>) -> Self {
        Self {
            soundcnt: SoundControl::new(),
            bias: SoundBias::default(),
            psg: PsgBank::new(),

            fifo: [Fifo::new(), Fifo::new()],
            fifo_pipe: [FifoPipe::default(); 2],
            latch: [0; 2],

            config: config.clone(),
            device,
            device_rate: config.sample_rate,

            buffer: Arc::new(Mutex::new(None)),
            resampler: Resampler::new(config.interpolation),
            staging: StereoRingBuffer::new(),
            pacer: Pacer::new(config.pace_to_wall_clock),
            dropped_reported: 0,

            error: None,
        }
    }

    /// Binds the mixer and sequencer handlers for any context that holds an APU
    pub fn register_events<C: AsMut<Apu>>(scheduler: &mut Scheduler<C>) {
        scheduler.register(EventClass::ApuMixer, |ctx, s| ctx.as_mut().step_mixer(s));
        scheduler.register(EventClass::ApuSequencer, |ctx, s| {
            ctx.as_mut().step_sequencer(s)
        });
    }

    /// Returns the APU to power-on state and restarts audio output.
    ///
    /// Everything is reset and both recurring events are armed even when the
    /// device or the configuration is rejected; the error is returned after
    /// the fact and emulation can carry on without sound.
    pub fn reset<C>(&mut self, scheduler: &mut Scheduler<C>) -> Result<(), ApuError> {
        let mut result = Ok(());

        self.fifo.iter_mut().for_each(Fifo::reset);
        self.fifo_pipe = [FifoPipe::default(); 2];
        self.latch = [0; 2];
        self.psg.reset();
        self.soundcnt.reset();
        self.bias.reset();
        self.error = None;

        self.pacer = Pacer::new(self.config.pace_to_wall_clock);
        self.dropped_reported = 0;

        scheduler.cancel(EventClass::ApuMixer);
        scheduler.cancel(EventClass::ApuSequencer);
        scheduler.add(CYCLES_PER_SAMPLE.round() as i64, EventClass::ApuMixer);
        scheduler.add(CYCLES_PER_STEP, EventClass::ApuSequencer);

        self.device.close();
        if let Err(e) = self.device.open(AudioCallback::new(self.buffer.clone())) {
            warn!("APU: audio device failed to open, running without sound: {}", e);
            result = Err(ApuError::Device(e));
        }

        let interpolation = self.config.interpolation;
        self.device_rate = match config::validate_sample_rate(self.device.sample_rate() as f32, interpolation) {
            Ok(rate) => rate,
            Err(e) => {
                warn!("APU: {}", e);
                if result.is_ok() {
                    result = Err(ApuError::Config(e));
                }
                config::validate_sample_rate(self.config.sample_rate as f32, interpolation)
                    .unwrap_or(config::DEFAULT_SAMPLE_RATE)
            }
        };

        *callback::lock(&self.buffer) = Some(AudioBuffer::new());
        self.staging.reset();

        self.resampler = Resampler::new(interpolation);
        self.resampler
            .set_sample_rates(MIXER_SAMPLE_RATE as f32, self.device_rate as f32);

        info!(
            "APU: reset, {:?} resampling {} Hz -> {} Hz",
            interpolation, MIXER_SAMPLE_RATE, self.device_rate
        );

        result
    }

    /// Applies new audio settings. Interpolation, rate and pacing changes
    /// take effect on the next reset; volume applies immediately.
    pub fn set_config(&mut self, config: &AudioConfig) {
        self.config = config.clone();
    }

    pub fn set_volume(&mut self, volume: i32) {
        self.config.volume = volume;
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Rate samples are delivered to the device at
    pub fn device_sample_rate(&self) -> u32 {
        self.device_rate
    }

    /// A fresh consumer handle on the output buffer
    pub fn audio_callback(&self) -> AudioCallback {
        AudioCallback::new(self.buffer.clone())
    }

    pub fn fifo(&self, fifo_id: usize) -> &Fifo {
        &self.fifo[fifo_id]
    }

    pub fn fifo_pipe(&self, fifo_id: usize) -> FifoPipe {
        self.fifo_pipe[fifo_id]
    }

    /// Current output sample of a DMA channel
    pub fn latch(&self, fifo_id: usize) -> i8 {
        self.latch[fifo_id]
    }

    /// Word write from the DMA controller
    pub fn write_fifo_word(&mut self, fifo_id: usize, word: u32) {
        self.fifo[fifo_id].write_word(word);
    }

    /// A timer used as a sample clock overflowed `times` times.
    ///
    /// Each FIFO bound to `timer_id` asks for a DMA refill when it is down
    /// to three words, reloads its pipe when the pipe ran dry, and latches
    /// the next byte for the mixer.
    pub fn on_timer_overflow(&mut self, timer_id: usize, times: u32, dma: &mut impl FifoDma) {
        if !self.soundcnt.master_enable {
            return;
        }

        for _ in 0..times {
            for fifo_id in 0..2 {
                if self.soundcnt.dma[fifo_id].timer_id != timer_id {
                    continue;
                }
                let fifo = &mut self.fifo[fifo_id];
                let pipe = &mut self.fifo_pipe[fifo_id];

                if fifo.count() <= 3 {
                    dma.request(DmaOccasion::for_fifo(fifo_id));
                }

                if pipe.is_empty() && fifo.count() > 0 {
                    pipe.refill(fifo.read_word());
                }

                self.latch[fifo_id] = pipe.shift();
            }
        }
    }

    pub fn step_sequencer<C>(&mut self, scheduler: &mut Scheduler<C>) {
        self.psg.tick();
        scheduler.add(CYCLES_PER_STEP, EventClass::ApuSequencer);
    }

    pub fn step_mixer<C>(&mut self, scheduler: &mut Scheduler<C>) {
        let sample = match self.config.mixer_precision {
            MixerPrecision::FixedPoint => self.mix_fixed_point(),
            MixerPrecision::Float => self.mix_float(),
        };
        self.output(sample);

        // Next step lands on the next multiple of the fractional period,
        // measured from the absolute timestamp so rounding never accumulates
        let now = scheduler.now();
        let next = ((now as f64 / CYCLES_PER_SAMPLE + 1.0).round() * CYCLES_PER_SAMPLE).round() as u64;
        scheduler.add(next.saturating_sub(now) as i64, EventClass::ApuMixer);
    }

    /// Sum of the enabled PSG channels on one side
    fn psg_sum(&self, side: usize) -> i32 {
        (0..PSG_CHANNELS)
            .filter(|&ch| self.soundcnt.psg.enable[side][ch])
            .map(|ch| i32::from(self.psg.sample(ch)))
            .sum()
    }

    /// 10-bit DAC path: bias, saturate to 0..=0x3FF, recentre.
    fn mix_fixed_point(&self) -> StereoSample<f32> {
        if !self.soundcnt.master_enable {
            return StereoSample::default();
        }
        let psg = &self.soundcnt.psg;
        let psg_volume = PSG_VOLUME_TAB[psg.volume];

        let mut sample = StereoSample::<i32>::default();
        for side in [LEFT, RIGHT] {
            let mut value = (self.psg_sum(side) * psg_volume * (psg.master[side] + 1)) >> 5;

            for fifo_id in 0..2 {
                let dma = &self.soundcnt.dma[fifo_id];
                if dma.enable[side] {
                    value += i32::from(self.latch[fifo_id]) * DMA_VOLUME_TAB[dma.volume];
                }
            }

            value += self.bias.level;
            sample[side] = value.clamp(0, 0x3FF) - 0x200;
        }

        sample.map(|x| x as f32 / 512.0)
    }

    /// Floating accumulation with the same channel structure, no bias stage
    fn mix_float(&self) -> StereoSample<f32> {
        if !self.soundcnt.master_enable {
            return StereoSample::default();
        }
        let psg = &self.soundcnt.psg;
        let psg_volume = PSG_VOLUME_TAB[psg.volume] as f32;

        let mut sample = StereoSample::<f32>::default();
        for side in [LEFT, RIGHT] {
            sample[side] +=
                self.psg_sum(side) as f32 * psg_volume * (psg.master[side] + 1) as f32 / (32.0 * 512.0);

            for fifo_id in 0..2 {
                let dma = &self.soundcnt.dma[fifo_id];
                if dma.enable[side] {
                    sample[side] += f32::from(self.latch[fifo_id]) * DMA_VOLUME_TAB[dma.volume] as f32 / 512.0;
                }
            }
        }
        sample
    }

    /// Resamples one mixer sample to the device rate and queues the result.
    fn output(&mut self, sample: StereoSample<f32>) {
        let gain = self.config.gain();
        let staging = &mut self.staging;
        self.resampler.write(sample.clamp(-1.0, 1.0), |out| {
            staging.push((out.clamp(-1.0, 1.0) * gain).to_pcm16());
        });

        if self.staging.available() == 0 {
            return;
        }

        let mut guard = callback::lock(&self.buffer);
        let Some(buffer) = guard.as_mut() else {
            self.staging.reset();
            return;
        };
        while self.staging.available() > 0 {
            let sample = self.staging.pop();
            if self.pacer.admit(self.device_rate) {
                buffer.push(sample);
            }
        }

        let dropped = buffer.dropped();
        if dropped != self.dropped_reported {
            debug!(
                "APU: host fell behind, {} samples dropped",
                dropped - self.dropped_reported
            );
            self.dropped_reported = dropped;
        }
    }

    pub fn read(&mut self, addr: u32) -> u8 {
        match addr {
            REG_SOUNDCNT_L..=0x0400_0085 => {
                let index = (addr - REG_SOUNDCNT_L) as usize;
                self.soundcnt.read(index, self.psg.active_mask())
            }
            0x0400_0086 | 0x0400_0087 | 0x0400_008A | 0x0400_008B => 0,
            REG_SOUNDBIAS | 0x0400_0089 => self.bias.read((addr - REG_SOUNDBIAS) as usize),
            _ => {
                warn!("APU: invalid register read at 0x{:08X}", addr);
                self.error = Some(ApuError::InvalidRegisterRead(addr));
                0
            }
        }
    }

    pub fn write(&mut self, addr: u32, value: u8) {
        match addr {
            REG_SOUNDCNT_L..=0x0400_0085 => {
                let index = (addr - REG_SOUNDCNT_L) as usize;
                let was_enabled = self.soundcnt.master_enable;
                let strobes = self.soundcnt.write(index, value);
                for fifo_id in 0..2 {
                    if strobes & (1 << fifo_id) != 0 {
                        self.fifo[fifo_id].reset();
                    }
                }
                if was_enabled && !self.soundcnt.master_enable {
                    self.psg.reset();
                }
            }
            0x0400_0086 | 0x0400_0087 | 0x0400_008A | 0x0400_008B => {}
            REG_SOUNDBIAS | 0x0400_0089 => {
                let resolution = self.bias.resolution;
                self.bias.write((addr - REG_SOUNDBIAS) as usize, value);
                if self.bias.resolution != resolution {
                    debug!(
                        "APU: bias resolution {}, DAC at {} Hz",
                        self.bias.resolution,
                        self.bias.sample_rate()
                    );
                }
            }
            REG_FIFO_A..=0x0400_00A3 => self.fifo[0].write_byte((addr - REG_FIFO_A) as usize, value),
            REG_FIFO_B..=0x0400_00A7 => self.fifo[1].write_byte((addr - REG_FIFO_B) as usize, value),
            _ => {
                warn!("APU: invalid register write at 0x{:08X}", addr);
                self.error = Some(ApuError::InvalidRegisterWrite(addr));
            }
        }
    }

    pub fn write_half(&mut self, addr: u32, value: u16) {
        self.write(addr, value as u8);
        self.write(addr + 1, (value >> 8) as u8);
    }

    pub fn read_half(&mut self, addr: u32) -> u16 {
        u16::from(self.read(addr)) | (u16::from(self.read(addr + 1)) << 8)
    }
}

impl Drop for Apu {
    fn drop(&mut self) {
        self.device.close();
    }
}
