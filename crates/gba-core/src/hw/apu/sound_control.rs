use crate::dsp::stereo::{LEFT, RIGHT};
use bitflags::bitflags;

bitflags! {
    /* SOUNDCNT_H upper byte
        15 bit  8
        ---- ----
        BBBB AAAA
        |||| ||||
        |||| |||+- DMA A right enable
        |||| ||+-- DMA A left enable
        |||| |+--- DMA A timer select (0: timer 0, 1: timer 1)
        |||| +---- DMA A FIFO reset (write-only strobe)
        |||+------ DMA B right enable
        ||+------- DMA B left enable
        |+-------- DMA B timer select
        +--------- DMA B FIFO reset
     */
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct DmaSoundControl: u8 {
        const A_RIGHT = 0b0000_0001;
        const A_LEFT  = 0b0000_0010;
        const A_TIMER = 0b0000_0100;
        const A_RESET = 0b0000_1000;
        const B_RIGHT = 0b0001_0000;
        const B_LEFT  = 0b0010_0000;
        const B_TIMER = 0b0100_0000;
        const B_RESET = 0b1000_0000;
    }
}

bitflags! {
    /* SOUNDCNT_X
        7  bit  0
        ---- ----
        M--- 4321
        |    ||||
        |    |||+- PSG 1 active (read-only)
        |    ||+-- PSG 2 active (read-only)
        |    |+--- PSG 3 active (read-only)
        |    +---- PSG 4 active (read-only)
        +--------- Master enable
     */
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct SoundStatus: u8 {
        const PSG_1 =         0b0000_0001;
        const PSG_2 =         0b0000_0010;
        const PSG_3 =         0b0000_0100;
        const PSG_4 =         0b0000_1000;
        const MASTER_ENABLE = 0b1000_0000;
    }
}

pub const PSG_VOLUME_TAB: [i32; 4] = [1, 2, 4, 0];
pub const DMA_VOLUME_TAB: [i32; 2] = [2, 4];

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PsgMix {
    /// Index into [`PSG_VOLUME_TAB`]
    pub volume: usize,
    /// Per-side master volume 0..=7, indexed by LEFT/RIGHT
    pub master: [i32; 2],
    /// Per-side channel enables, indexed by LEFT/RIGHT then channel
    pub enable: [[bool; 4]; 2],
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DmaMix {
    /// Index into [`DMA_VOLUME_TAB`]
    pub volume: usize,
    pub enable: [bool; 2],
    pub timer_id: usize,
}

/// SOUNDCNT_L/H/X decoded into mixer-friendly fields
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SoundControl {
    pub psg: PsgMix,
    pub dma: [DmaMix; 2],
    pub master_enable: bool,
}

impl SoundControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Reads byte `index` (0..=5) of the SOUNDCNT_L/H/X block.
    /// `psg_active` supplies the read-only channel flags.
    pub fn read(&self, index: usize, psg_active: u8) -> u8 {
        let psg = &self.psg;
        match index {
            0 => (psg.master[RIGHT] | (psg.master[LEFT] << 4)) as u8,
            1 => {
                let mut value = 0;
                for ch in 0..4 {
                    value |= u8::from(psg.enable[RIGHT][ch]) << ch;
                    value |= u8::from(psg.enable[LEFT][ch]) << (ch + 4);
                }
                value
            }
            2 => {
                psg.volume as u8 | ((self.dma[0].volume as u8) << 2) | ((self.dma[1].volume as u8) << 3)
            }
            3 => {
                let mut bits = DmaSoundControl::empty();
                bits.set(DmaSoundControl::A_RIGHT, self.dma[0].enable[RIGHT]);
                bits.set(DmaSoundControl::A_LEFT, self.dma[0].enable[LEFT]);
                bits.set(DmaSoundControl::A_TIMER, self.dma[0].timer_id == 1);
                bits.set(DmaSoundControl::B_RIGHT, self.dma[1].enable[RIGHT]);
                bits.set(DmaSoundControl::B_LEFT, self.dma[1].enable[LEFT]);
                bits.set(DmaSoundControl::B_TIMER, self.dma[1].timer_id == 1);
                bits.bits()
            }
            4 => {
                let mut status = SoundStatus::from_bits_truncate(psg_active & 0x0F);
                status.set(SoundStatus::MASTER_ENABLE, self.master_enable);
                status.bits()
            }
            _ => 0,
        }
    }

    /// Writes byte `index` (0..=5). Returns the FIFO reset strobes
    /// (bit 0: FIFO A, bit 1: FIFO B) so the owner can clear its queues.
    pub fn write(&mut self, index: usize, value: u8) -> u8 {
        let psg = &mut self.psg;
        match index {
            0 => {
                psg.master[RIGHT] = i32::from(value & 7);
                psg.master[LEFT] = i32::from((value >> 4) & 7);
            }
            1 => {
                for ch in 0..4 {
                    psg.enable[RIGHT][ch] = value & (1 << ch) != 0;
                    psg.enable[LEFT][ch] = value & (1 << (ch + 4)) != 0;
                }
            }
            2 => {
                psg.volume = usize::from(value & 3);
                self.dma[0].volume = usize::from((value >> 2) & 1);
                self.dma[1].volume = usize::from((value >> 3) & 1);
            }
            3 => {
                let bits = DmaSoundControl::from_bits_truncate(value);
                self.dma[0].enable[RIGHT] = bits.contains(DmaSoundControl::A_RIGHT);
                self.dma[0].enable[LEFT] = bits.contains(DmaSoundControl::A_LEFT);
                self.dma[0].timer_id = usize::from(bits.contains(DmaSoundControl::A_TIMER));
                self.dma[1].enable[RIGHT] = bits.contains(DmaSoundControl::B_RIGHT);
                self.dma[1].enable[LEFT] = bits.contains(DmaSoundControl::B_LEFT);
                self.dma[1].timer_id = usize::from(bits.contains(DmaSoundControl::B_TIMER));

                return u8::from(bits.contains(DmaSoundControl::A_RESET))
                    | (u8::from(bits.contains(DmaSoundControl::B_RESET)) << 1);
            }
            4 => {
                self.master_enable =
                    SoundStatus::from_bits_truncate(value).contains(SoundStatus::MASTER_ENABLE);
            }
            _ => {}
        }
        0
    }
}

pub const BIAS_RESET: u16 = 0x0200;

/// SOUNDBIAS
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SoundBias {
    /// DC offset added before saturation (bits 1..9)
    pub level: i32,
    /// Amplitude resolution select (bits 14..15)
    pub resolution: u8,
}

impl Default for SoundBias {
    fn default() -> Self {
        let mut bias = Self {
            level: 0,
            resolution: 0,
        };
        bias.write_half(BIAS_RESET);
        bias
    }
}

impl SoundBias {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn read_half(&self) -> u16 {
        (self.level as u16 & 0x3FE) | (u16::from(self.resolution) << 14)
    }

    pub fn write_half(&mut self, value: u16) {
        self.level = i32::from(value & 0x3FE);
        self.resolution = (value >> 14) as u8;
    }

    pub fn read(&self, index: usize) -> u8 {
        (self.read_half() >> (8 * (index & 1))) as u8
    }

    pub fn write(&mut self, index: usize, value: u8) {
        let shift = 8 * (index & 1);
        let half = (self.read_half() & !(0xFF << shift)) | (u16::from(value) << shift);
        self.write_half(half);
    }

    /// Hardware output rate implied by the resolution bits
    pub fn sample_rate(&self) -> u32 {
        32_768 << self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soundcnt_l_decodes_master_and_enables() {
        let mut cnt = SoundControl::new();
        cnt.write(0, 0x35);
        cnt.write(1, 0b0010_1001);
        assert_eq!(cnt.psg.master[RIGHT], 5);
        assert_eq!(cnt.psg.master[LEFT], 3);
        assert_eq!(cnt.psg.enable[RIGHT], [true, false, false, true]);
        assert_eq!(cnt.psg.enable[LEFT], [false, true, false, false]);
        assert_eq!(cnt.read(0, 0), 0x35);
        assert_eq!(cnt.read(1, 0), 0b0010_1001);
    }

    #[test]
    fn soundcnt_h_reset_strobes_are_write_only() {
        let mut cnt = SoundControl::new();
        let strobes = cnt.write(3, 0b1101_1011);
        assert_eq!(strobes, 0b11);
        assert!(cnt.dma[0].enable[RIGHT] && cnt.dma[0].enable[LEFT]);
        assert_eq!(cnt.dma[0].timer_id, 0);
        assert!(cnt.dma[1].enable[RIGHT] && !cnt.dma[1].enable[LEFT]);
        assert_eq!(cnt.dma[1].timer_id, 1);
        assert_eq!(cnt.read(3, 0), 0b0101_0011);
    }

    #[test]
    fn soundcnt_x_merges_psg_flags() {
        let mut cnt = SoundControl::new();
        cnt.write(4, 0xFF);
        assert!(cnt.master_enable);
        assert_eq!(cnt.read(4, 0b0101), 0x85);
    }

    #[test]
    fn bias_resets_to_midpoint_and_masks_bit_zero() {
        let mut bias = SoundBias::default();
        assert_eq!(bias.level, 0x200);
        assert_eq!(bias.read_half(), 0x0200);

        bias.write(0, 0xFF);
        bias.write(1, 0x43);
        assert_eq!(bias.level, 0x3FE);
        assert_eq!(bias.resolution, 1);
        assert_eq!(bias.sample_rate(), 65_536);
    }
}
