use gba_core::prelude::*;
use std::f32::consts::TAU;

/// Stand-in for a game's sound driver: answers FIFO DMA requests with an
/// 8-bit sine wave, four words per request like a real sound DMA.
pub struct ToneDma {
    phase: f32,
    step: f32,
    amplitude: f32,
    pending: [bool; 2],
}

impl ToneDma {
    pub fn new(frequency: f32, sample_rate: f32, amplitude: i8) -> Self {
        Self {
            phase: 0.0,
            step: frequency / sample_rate,
            amplitude: f32::from(amplitude),
            pending: [false; 2],
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.pending = [false; 2];
    }

    fn next_byte(&mut self) -> u8 {
        let value = (self.phase * TAU).sin() * self.amplitude;
        self.phase = (self.phase + self.step).fract();
        value.round() as i8 as u8
    }

    fn next_word(&mut self) -> u32 {
        u32::from_le_bytes([
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
        ])
    }

    /// Performs the transfers requested since the last call
    pub fn service(&mut self, apu: &mut Apu) {
        for fifo_id in 0..2 {
            if std::mem::take(&mut self.pending[fifo_id]) {
                for _ in 0..4 {
                    let word = self.next_word();
                    apu.write_fifo_word(fifo_id, word);
                }
            }
        }
    }
}

impl FifoDma for ToneDma {
    fn request(&mut self, occasion: DmaOccasion) {
        self.pending[occasion.fifo_id()] = true;
    }
}

/// Hardware timer running as a fixed-rate sample clock.
pub struct SampleTimer {
    pub id: usize,
    period: i64,
}

impl SampleTimer {
    pub fn new(id: usize, sample_rate: u32) -> Self {
        Self {
            id,
            period: (CPU_HZ / u64::from(sample_rate)) as i64,
        }
    }

    pub fn event_class(&self) -> EventClass {
        EventClass::timer(self.id).unwrap_or(EventClass::Timer0)
    }

    pub fn start<C>(&self, scheduler: &mut Scheduler<C>) {
        let class = self.event_class();
        scheduler.cancel(class);
        scheduler.add(self.period, class);
    }

    pub fn rearm<C>(&self, scheduler: &mut Scheduler<C>) {
        scheduler.add(self.period, self.event_class());
    }

    pub fn period(&self) -> i64 {
        self.period
    }
}
