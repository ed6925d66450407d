use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::size::OperandSize;

/// General purpose register views. Within each width group the variants
/// follow the x86 register encoding order, so the 3-bit code is the index
/// inside the group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Reg {
    EAX,
    ECX,
    EDX,
    EBX,
    ESP,
    EBP,
    ESI,
    EDI,

    AX,
    CX,
    DX,
    BX,
    SP,
    BP,
    SI,
    DI,

    AL,
    CL,
    DL,
    BL,
    AH,
    CH,
    DH,
    BH,
}

const LONG: [Reg; 8] = [
    Reg::EAX,
    Reg::ECX,
    Reg::EDX,
    Reg::EBX,
    Reg::ESP,
    Reg::EBP,
    Reg::ESI,
    Reg::EDI,
];
const WORD: [Reg; 8] = [
    Reg::AX,
    Reg::CX,
    Reg::DX,
    Reg::BX,
    Reg::SP,
    Reg::BP,
    Reg::SI,
    Reg::DI,
];
const BYTE: [Reg; 8] = [
    Reg::AL,
    Reg::CL,
    Reg::DL,
    Reg::BL,
    Reg::AH,
    Reg::CH,
    Reg::DH,
    Reg::BH,
];

impl Reg {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().parse::<Self>() {
            Ok(r) => Ok(r),
            Err(_) => Err(format!("Unknown register name: {s}")),
        }
    }

    /// 3-bit encoding used in ModRM, SIB and short-form opcodes.
    pub fn code(self) -> u8 {
        (self as u8) & 0b111
    }

    pub fn size(self) -> OperandSize {
        match (self as u8) >> 3 {
            0 => OperandSize::Long,
            1 => OperandSize::Word,
            _ => OperandSize::Byte,
        }
    }

    pub fn from_code(code: u8, size: OperandSize) -> Self {
        let table = match size {
            OperandSize::Long => &LONG,
            OperandSize::Word => &WORD,
            OperandSize::Byte => &BYTE,
        };
        table[(code & 0b111) as usize]
    }

    /// Physical register index (encoding order of the 32-bit registers) and
    /// the bit offset of this view inside it.
    pub fn slot(self) -> (usize, u32) {
        let code = self.code() as usize;
        match self.size() {
            OperandSize::Byte if code >= 4 => (code - 4, 8),
            _ => (code, 0),
        }
    }

    /// `al`, `ax` or `eax`.
    pub fn is_accumulator(self) -> bool {
        self.code() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parse() {
        assert_eq!(Reg::parse("eax"), Ok(Reg::EAX));
        assert_eq!(Reg::parse("BH"), Ok(Reg::BH));
        assert!(Reg::parse("rax").is_err());
        assert_eq!(Reg::DH.to_string(), "dh");
    }

    #[test]
    fn codes() {
        assert_eq!(Reg::EBX.code(), 3);
        assert_eq!(Reg::SP.code(), 4);
        assert_eq!(Reg::AH.code(), 4);
        assert_eq!(Reg::BH.code(), 7);
        assert_eq!(Reg::EDI.size(), OperandSize::Long);
        assert_eq!(Reg::SI.size(), OperandSize::Word);
        assert_eq!(Reg::CL.size(), OperandSize::Byte);
    }

    #[test]
    fn from_code_inverts_code() {
        for reg in Reg::iter() {
            assert_eq!(Reg::from_code(reg.code(), reg.size()), reg);
        }
    }

    #[test]
    fn slots_alias() {
        assert_eq!(Reg::AL.slot(), (0, 0));
        assert_eq!(Reg::AH.slot(), (0, 8));
        assert_eq!(Reg::AX.slot(), (0, 0));
        assert_eq!(Reg::BH.slot(), (3, 8));
        assert_eq!(Reg::ESP.slot(), (4, 0));
        assert_eq!(Reg::SP.slot(), (4, 0));
    }
}
