#![warn(clippy::all, rust_2018_idioms)]

use gba_app::config::load_config;
use gba_app::{EmuCommand, EmuEvent, EmuHost};
use log::info;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const DEFAULT_CONFIG: &str = "gba.toml";
const DEFAULT_SECONDS: u64 = 3;

fn main() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // gba-native [config.toml] [seconds]
    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let seconds = match args.next() {
        Some(s) => s.parse::<u64>()?,
        None => DEFAULT_SECONDS,
    };

    let config = load_config(&config_path)?;
    info!("Audio settings: {:?}", config.audio);

    let mut host = EmuHost::start(&config)?;
    host.send(EmuCommand::SetVolume(config.audio.volume));

    let end = Instant::now() + Duration::from_secs(seconds);
    while Instant::now() < end {
        while let Some(event) = host.try_recv() {
            log_event(&event);
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    host.shutdown()?;
    while let Some(event) = host.try_recv() {
        log_event(&event);
    }
    Ok(())
}

fn log_event(event: &EmuEvent) {
    match event {
        EmuEvent::Started { sample_rate } => info!("Playing test tone at {} Hz", sample_rate),
        EmuEvent::AudioUnavailable(reason) => info!("Running without sound: {}", reason),
        EmuEvent::Stopped {
            frames,
            dropped_samples,
        } => info!("Ran {} frames, {} samples dropped", frames, dropped_samples),
    }
}
