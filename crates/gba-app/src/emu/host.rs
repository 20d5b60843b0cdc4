use crate::audio::driver::CpalAudioDevice;
use crate::emu::commands::{EmuCommand, EmuEvent};
use crate::emu::runtime::EmuRuntime;
use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use gba_core::Config;
use gba_core::prelude::{AudioDevice, NullAudioDevice};
use log::warn;
use std::thread::JoinHandle;

/// EmuHost links the caller to the emulation thread
pub struct EmuHost {
    command_tx: Sender<EmuCommand>,
    event_rx: Receiver<EmuEvent>,
    thread: Option<JoinHandle<()>>,
}

impl EmuHost {
    /// Spawns the emulation thread. The audio device is opened on that
    /// thread; if none is available the runtime carries on silently.
    pub fn start(config: &Config) -> anyhow::Result<Self> {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let audio = config.audio.clone();

        let thread = std::thread::Builder::new()
            .name("emu".into())
            .spawn(move || {
                let device: Box<dyn AudioDevice> = match CpalAudioDevice::init(audio.sample_rate) {
                    Ok(device) => Box::new(device),
                    Err(e) => {
                        warn!("{}, continuing without sound", e);
                        event_tx.send(EmuEvent::AudioUnavailable(e.to_string())).ok();
                        Box::new(NullAudioDevice::new(audio.sample_rate))
                    }
                };

                let mut runtime = EmuRuntime::new(&audio, device, command_rx, event_tx);
                runtime.run();
            })
            .context("Failed to spawn emulation thread")?;

        Ok(Self {
            command_tx,
            event_rx,
            thread: Some(thread),
        })
    }

    pub fn send(&self, cmd: EmuCommand) {
        let _ = self.command_tx.send(cmd);
    }

    pub fn try_recv(&self) -> Option<EmuEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Stops the emulation thread and waits for it
    pub fn shutdown(&mut self) -> anyhow::Result<()> {
        self.send(EmuCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| anyhow::anyhow!("Emulation thread panicked"))?;
        }
        Ok(())
    }
}

impl Drop for EmuHost {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("{}", e);
        }
    }
}
