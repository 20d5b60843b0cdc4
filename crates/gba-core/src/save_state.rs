use bytemuck::{Pod, Zeroable};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SaveStateError {
    #[error("Save state is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },
}

/// Interrupt controller latches, in the order they are stored.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct IrqState {
    pub pending_ime: u8,
    pub reg_ime: u8,
    pub pending_ie: u16,
    pub pending_if: u16,
    pub reg_ie: u16,
    pub reg_if: u16,
}

/// Fixed-shape record components copy themselves into and out of.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SaveState {
    pub irq: IrqState,
}

impl SaveState {
    pub const SIZE: usize = size_of::<IrqState>();

    pub fn to_bytes(&self) -> Vec<u8> {
        bytemuck::bytes_of(&self.irq).to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SaveStateError> {
        if bytes.len() != Self::SIZE {
            return Err(SaveStateError::Length {
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            irq: bytemuck::pod_read_unaligned(bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_has_no_padding() {
        assert_eq!(SaveState::SIZE, 10);
    }

    #[test]
    fn bytes_follow_field_order() {
        let state = SaveState {
            irq: IrqState {
                pending_ime: 1,
                reg_ime: 0,
                pending_ie: 0x2001,
                pending_if: 0x0002,
                reg_ie: 0x3FFF,
                reg_if: 0x0004,
            },
        };
        let bytes = state.to_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], 0);
        assert_eq!(u16::from_ne_bytes([bytes[2], bytes[3]]), 0x2001);
        assert_eq!(u16::from_ne_bytes([bytes[8], bytes[9]]), 0x0004);
        assert_eq!(SaveState::from_bytes(&bytes), Ok(state));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert_eq!(
            SaveState::from_bytes(&[0; 4]),
            Err(SaveStateError::Length {
                expected: 10,
                actual: 4
            })
        );
    }
}
