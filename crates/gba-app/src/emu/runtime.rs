use crate::emu::commands::{EmuCommand, EmuEvent};
use crate::emu::tone::{SampleTimer, ToneDma};
use crossbeam_channel::{Receiver, Sender};
use gba_core::hw::apu::{REG_SOUNDCNT_H, REG_SOUNDCNT_X};
use gba_core::prelude::*;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// CPU cycles in one video frame (228 lines of 1232 cycles)
pub const CYCLES_PER_FRAME: u64 = 280_896;

pub const FRAME_RATE: f64 = CPU_HZ as f64 / CYCLES_PER_FRAME as f64;

/// Rate the test tone is played back at through the FIFO
const TONE_SAMPLE_RATE: u32 = 32_768;

/// Everything the scheduler's handlers can reach
pub struct Hardware {
    pub apu: Apu,
    pub timer: SampleTimer,
    pub dma: ToneDma,
}

impl AsMut<Apu> for Hardware {
    fn as_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }
}

impl Hardware {
    fn on_timer_overflow(&mut self, scheduler: &mut Scheduler<Hardware>) {
        self.apu.on_timer_overflow(self.timer.id, 1, &mut self.dma);
        self.dma.service(&mut self.apu);
        self.timer.rearm(scheduler);
    }
}

/// Emulation loop. Owns the scheduler and the hardware and lives on its own
/// thread; the audio device pulls from the APU buffer on the host's thread.
pub struct EmuRuntime {
    scheduler: Scheduler<Hardware>,
    hw: Hardware,
    command_rx: Receiver<EmuCommand>,
    event_tx: Sender<EmuEvent>,
    paused: bool,
    running: bool,
    frames: u64,
}

impl EmuRuntime {
    pub fn new(
        config: &AudioConfig,
        device: Box<dyn AudioDevice>,
        command_rx: Receiver<EmuCommand>,
        event_tx: Sender<EmuEvent>,
    ) -> Self {
        let mut scheduler = Scheduler::new();
        Apu::register_events(&mut scheduler);

        let timer = SampleTimer::new(0, TONE_SAMPLE_RATE);
        scheduler.register(timer.event_class(), |hw: &mut Hardware, s| {
            hw.on_timer_overflow(s)
        });

        Self {
            scheduler,
            hw: Hardware {
                apu: Apu::new(config, device),
                timer,
                dma: ToneDma::new(440.0, TONE_SAMPLE_RATE as f32, 48),
            },
            command_rx,
            event_tx,
            paused: false,
            running: true,
            frames: 0,
        }
    }

    /// Power cycle: fresh clock, fresh APU, tone routed through FIFO A.
    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.frames = 0;

        match self.hw.apu.reset(&mut self.scheduler) {
            Ok(()) => {}
            Err(e) => {
                warn!("Audio unavailable: {}", e);
                self.event_tx.send(EmuEvent::AudioUnavailable(e.to_string())).ok();
            }
        }

        // master on, FIFO A to both sides at full volume, clocked by timer 0
        self.hw.apu.write(REG_SOUNDCNT_X, 0x80);
        self.hw.apu.write_half(REG_SOUNDCNT_H, 0x0304);

        self.hw.dma.reset();
        self.hw.timer.start(&mut self.scheduler);

        self.event_tx
            .send(EmuEvent::Started {
                sample_rate: self.hw.apu.device_sample_rate(),
            })
            .ok();
    }

    /// Handle EmuCommands received from the host thread
    pub fn process_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            debug!("EmuRuntime: {:?}", command);
            match command {
                EmuCommand::Reset => self.reset(),
                EmuCommand::Pause(p) => self.paused = p,
                EmuCommand::SetVolume(volume) => self.hw.apu.set_volume(volume),
                EmuCommand::SetAudioConfig(config) => {
                    self.hw.apu.set_config(&config);
                    self.reset();
                }
                EmuCommand::Shutdown => self.running = false,
            }
        }
    }

    pub fn run_frame(&mut self) {
        self.scheduler.run_for(&mut self.hw, CYCLES_PER_FRAME);
        self.frames += 1;
    }

    /// One iteration of the loop without pacing
    pub fn step(&mut self) {
        self.process_commands();
        if self.running && !self.paused {
            self.run_frame();
        }
    }

    /// Runs frames at the emulated frame rate until shut down
    pub fn run(&mut self) {
        self.reset();

        let frame_time = Duration::from_secs_f64(1.0 / FRAME_RATE);
        let mut deadline = Instant::now();

        while self.running {
            self.step();

            deadline += frame_time;
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            } else {
                // fell behind, don't try to catch up in a burst
                deadline = now;
            }
        }

        let dropped_samples = self.hw.apu.audio_callback().dropped_samples();
        info!(
            "Emulation stopped after {} frames, {} samples dropped",
            self.frames, dropped_samples
        );
        self.event_tx
            .send(EmuEvent::Stopped {
                frames: self.frames,
                dropped_samples,
            })
            .ok();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn timestamp(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn apu(&self) -> &Apu {
        &self.hw.apu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gba_core::config::Interpolation;

    fn runtime() -> (EmuRuntime, Sender<EmuCommand>, Receiver<EmuEvent>) {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let config = AudioConfig {
            interpolation: Interpolation::Cosine,
            ..AudioConfig::default()
        };
        let runtime = EmuRuntime::new(
            &config,
            Box::new(NullAudioDevice::new(44_100)),
            command_rx,
            event_tx,
        );
        (runtime, command_tx, event_rx)
    }

    fn drain(runtime: &EmuRuntime, count: usize) -> Vec<StereoSample<i16>> {
        let mut out = vec![StereoSample::default(); count];
        runtime.apu().audio_callback().fill(&mut out);
        out
    }

    #[test]
    fn reset_announces_device_rate() {
        let (mut runtime, _tx, events) = runtime();
        runtime.reset();
        assert_eq!(
            events.try_recv(),
            Ok(EmuEvent::Started {
                sample_rate: 44_100
            })
        );
    }

    #[test]
    fn a_frame_produces_a_frame_of_tone() {
        let (mut runtime, _tx, _events) = runtime();
        runtime.reset();
        runtime.run_frame();

        assert_eq!(runtime.timestamp(), CYCLES_PER_FRAME);
        let queued = runtime.apu().audio_callback().queued() as f64;
        let expected = 44_100.0 / FRAME_RATE;
        assert!((queued - expected).abs() < 3.0, "queued {}", queued);

        let out = drain(&runtime, 512);
        assert!(out.iter().any(|s| s.left > 1_000));
        assert!(out.iter().any(|s| s.left < -1_000));
        assert!(out.iter().all(|s| s.left == s.right));
    }

    #[test]
    fn pause_stops_the_clock() {
        let (mut runtime, tx, _events) = runtime();
        runtime.reset();
        tx.send(EmuCommand::Pause(true)).unwrap();
        runtime.step();
        assert!(runtime.is_paused());
        assert_eq!(runtime.timestamp(), 0);

        tx.send(EmuCommand::Pause(false)).unwrap();
        runtime.step();
        assert_eq!(runtime.frames(), 1);
    }

    #[test]
    fn volume_zero_silences_output() {
        let (mut runtime, tx, _events) = runtime();
        runtime.reset();
        tx.send(EmuCommand::SetVolume(0)).unwrap();
        runtime.step();

        assert!(drain(&runtime, 256).iter().all(|s| *s == StereoSample::default()));
    }

    #[test]
    fn shutdown_ends_the_loop() {
        let (mut runtime, tx, events) = runtime();
        tx.send(EmuCommand::Shutdown).unwrap();
        runtime.run();

        assert!(!runtime.is_running());
        let last = events.try_iter().last();
        assert!(matches!(last, Some(EmuEvent::Stopped { frames: 0, .. })));
    }

    #[test]
    fn audio_config_change_rebuilds_the_pipeline() {
        let (mut runtime, tx, events) = runtime();
        runtime.reset();
        runtime.run_frame();
        events.try_iter().for_each(drop);

        let config = AudioConfig {
            interpolation: Interpolation::Sinc64,
            volume: 0,
            ..AudioConfig::default()
        };
        tx.send(EmuCommand::SetAudioConfig(config.clone())).unwrap();
        tx.send(EmuCommand::Pause(true)).unwrap();
        runtime.step();

        assert_eq!(runtime.apu().config(), &config);
        assert_eq!(runtime.timestamp(), 0);
        assert_eq!(runtime.apu().audio_callback().queued(), 0);
        assert_eq!(
            events.try_recv(),
            Ok(EmuEvent::Started {
                sample_rate: 44_100
            })
        );
    }

    #[test]
    fn reset_command_restarts_the_clock() {
        let (mut runtime, tx, _events) = runtime();
        runtime.reset();
        runtime.run_frame();
        tx.send(EmuCommand::Reset).unwrap();
        tx.send(EmuCommand::Pause(true)).unwrap();
        runtime.step();
        assert_eq!(runtime.timestamp(), 0);
        assert_eq!(runtime.frames(), 0);
    }
}
