pub mod apu;
pub mod irq;
