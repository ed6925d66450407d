use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// Width in bytes an instruction operates at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum OperandSize {
    Byte = 1,
    Word = 2,
    #[default]
    Long = 4,
}

impl OperandSize {
    pub fn bytes(self) -> usize {
        u8::from(self) as usize
    }

    pub fn bits(self) -> u32 {
        u8::from(self) as u32 * 8
    }

    pub fn mask(self) -> u32 {
        match self {
            OperandSize::Byte => 0xFF,
            OperandSize::Word => 0xFFFF,
            OperandSize::Long => 0xFFFF_FFFF,
        }
    }

    pub fn sign_mask(self) -> u32 {
        1 << (self.bits() - 1)
    }

    pub fn suffix(self) -> char {
        match self {
            OperandSize::Byte => 'b',
            OperandSize::Word => 'w',
            OperandSize::Long => 'l',
        }
    }

    pub fn from_suffix(c: char) -> Option<Self> {
        match c {
            'b' => Some(OperandSize::Byte),
            'w' => Some(OperandSize::Word),
            'l' => Some(OperandSize::Long),
            _ => None,
        }
    }
}

/// Index scale of a memory operand.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum Scale {
    #[default]
    S1 = 1,
    S2 = 2,
    S4 = 4,
    S8 = 8,
}

impl Scale {
    /// Two-bit SIB field.
    pub fn bits(self) -> u8 {
        match self {
            Scale::S1 => 0b00,
            Scale::S2 => 0b01,
            Scale::S4 => 0b10,
            Scale::S8 => 0b11,
        }
    }

    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Scale::S1,
            0b01 => Scale::S2,
            0b10 => Scale::S4,
            _ => Scale::S8,
        }
    }

    pub fn factor(self) -> u32 {
        u8::from(self) as u32
    }
}
