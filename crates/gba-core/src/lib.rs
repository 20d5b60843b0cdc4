// GBA audio/timing core modules
pub mod config;
pub mod dsp;
pub mod hw;
pub mod prelude;
pub mod save_state;
pub mod scheduler;

// Re-exports
pub use config::Config;
pub use hw::apu::Apu;
pub use scheduler::{EventClass, Scheduler};

/// Master clock of the emulated machine (cycles per second)
pub const CPU_HZ: u64 = 16_777_216;
