pub mod audio;
pub mod config;
pub mod emu;

pub use emu::commands::{EmuCommand, EmuEvent};
pub use emu::host::EmuHost;
