/// Which sound FIFO is asking for data
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DmaOccasion {
    Fifo0,
    Fifo1,
}

impl DmaOccasion {
    pub const fn for_fifo(fifo_id: usize) -> DmaOccasion {
        match fifo_id {
            0 => DmaOccasion::Fifo0,
            _ => DmaOccasion::Fifo1,
        }
    }

    pub const fn fifo_id(self) -> usize {
        match self {
            DmaOccasion::Fifo0 => 0,
            DmaOccasion::Fifo1 => 1,
        }
    }
}

/// DMA controller as seen from the sound FIFOs
pub trait FifoDma {
    fn request(&mut self, occasion: DmaOccasion);
}

/// Ignores every request
impl FifoDma for () {
    fn request(&mut self, _occasion: DmaOccasion) {}
}
