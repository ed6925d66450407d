use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Base mnemonics shared by the encoder and the decoder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mnemonic {
    Mov,
    Lea,

    Push,
    Pop,
    Pushf,
    Popf,
    Pusha,
    Popa,

    Add,
    Or,
    Adc,
    Sbb,
    And,
    Sub,
    Xor,
    Cmp,

    Test,
    Not,
    Neg,
    Mul,
    Imul,
    Div,
    Idiv,
    Inc,
    Dec,

    Rol,
    Ror,
    Rcl,
    Rcr,
    Shl,
    Shr,
    Sal,
    Sar,

    Jmp,
    Jo,
    Jno,
    Jb,
    Jae,
    Je,
    Jne,
    Jbe,
    Ja,
    Js,
    Jns,
    Jp,
    Jnp,
    Jl,
    Jge,
    Jle,
    Jg,
    Call,
    Ret,

    Nop,
    Stc,
    Clc,
    Cmc,
    Std,
    Cld,
    Sti,
    Cli,
    Lahf,
    Sahf,
}

const ALU: [Mnemonic; 8] = [
    Mnemonic::Add,
    Mnemonic::Or,
    Mnemonic::Adc,
    Mnemonic::Sbb,
    Mnemonic::And,
    Mnemonic::Sub,
    Mnemonic::Xor,
    Mnemonic::Cmp,
];

const GROUP3: [Option<Mnemonic>; 8] = [
    Some(Mnemonic::Test),
    None,
    Some(Mnemonic::Not),
    Some(Mnemonic::Neg),
    Some(Mnemonic::Mul),
    Some(Mnemonic::Imul),
    Some(Mnemonic::Div),
    Some(Mnemonic::Idiv),
];

const SHIFT: [Mnemonic; 8] = [
    Mnemonic::Rol,
    Mnemonic::Ror,
    Mnemonic::Rcl,
    Mnemonic::Rcr,
    Mnemonic::Shl,
    Mnemonic::Shr,
    Mnemonic::Sal,
    Mnemonic::Sar,
];

const JCC: [Mnemonic; 16] = [
    Mnemonic::Jo,
    Mnemonic::Jno,
    Mnemonic::Jb,
    Mnemonic::Jae,
    Mnemonic::Je,
    Mnemonic::Jne,
    Mnemonic::Jbe,
    Mnemonic::Ja,
    Mnemonic::Js,
    Mnemonic::Jns,
    Mnemonic::Jp,
    Mnemonic::Jnp,
    Mnemonic::Jl,
    Mnemonic::Jge,
    Mnemonic::Jle,
    Mnemonic::Jg,
];

impl Mnemonic {
    /// Opcode extension of the `add`..`cmp` group (`0x80 /ext`, base `ext*8`).
    pub fn alu_ext(self) -> Option<u8> {
        ALU.iter().position(|m| *m == self).map(|i| i as u8)
    }

    pub fn from_alu_ext(ext: u8) -> Self {
        ALU[(ext & 0b111) as usize]
    }

    /// Opcode extension of the `0xF6/0xF7` group.
    pub fn group3_ext(self) -> Option<u8> {
        GROUP3
            .iter()
            .position(|m| *m == Some(self))
            .map(|i| i as u8)
    }

    pub fn from_group3_ext(ext: u8) -> Option<Self> {
        GROUP3[(ext & 0b111) as usize]
    }

    /// Opcode extension of the shift/rotate group. `sal` shares `shl`'s slot.
    pub fn shift_ext(self) -> Option<u8> {
        match self {
            Mnemonic::Sal => Some(4),
            m => SHIFT.iter().position(|s| *s == m).map(|i| i as u8),
        }
    }

    pub fn from_shift_ext(ext: u8) -> Self {
        SHIFT[(ext & 0b111) as usize]
    }

    /// Condition code (`0x70+cc`, `0x0F 0x80+cc`).
    pub fn cond(self) -> Option<u8> {
        JCC.iter().position(|m| *m == self).map(|i| i as u8)
    }

    pub fn from_cond(cc: u8) -> Self {
        JCC[(cc & 0xF) as usize]
    }

    /// Single-byte opcode of operand-less instructions.
    pub fn fixed_opcode(self) -> Option<u8> {
        use Mnemonic::*;
        match self {
            Pushf => Some(0x9C),
            Popf => Some(0x9D),
            Pusha => Some(0x60),
            Popa => Some(0x61),
            Ret => Some(0xC3),
            Nop => Some(0x90),
            Stc => Some(0xF9),
            Clc => Some(0xF8),
            Cmc => Some(0xF5),
            Std => Some(0xFD),
            Cld => Some(0xFC),
            Sti => Some(0xFB),
            Cli => Some(0xFA),
            Lahf => Some(0x9F),
            Sahf => Some(0x9E),
            _ => None,
        }
    }

    pub fn from_fixed_opcode(opcode: u8) -> Option<Self> {
        Self::iter().find(|m| m.fixed_opcode() == Some(opcode))
    }

    pub fn is_shift(self) -> bool {
        self.shift_ext().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alu_extensions() {
        assert_eq!(Mnemonic::Add.alu_ext(), Some(0));
        assert_eq!(Mnemonic::Or.alu_ext(), Some(1));
        assert_eq!(Mnemonic::And.alu_ext(), Some(4));
        assert_eq!(Mnemonic::Sub.alu_ext(), Some(5));
        assert_eq!(Mnemonic::Xor.alu_ext(), Some(6));
        assert_eq!(Mnemonic::Cmp.alu_ext(), Some(7));
        assert_eq!(Mnemonic::Mov.alu_ext(), None);
        for ext in 0..8 {
            assert_eq!(Mnemonic::from_alu_ext(ext).alu_ext(), Some(ext));
        }
    }

    #[test]
    fn shift_extensions() {
        assert_eq!(Mnemonic::Shl.shift_ext(), Some(4));
        assert_eq!(Mnemonic::Sal.shift_ext(), Some(4));
        assert_eq!(Mnemonic::Shr.shift_ext(), Some(5));
        assert_eq!(Mnemonic::Sar.shift_ext(), Some(7));
        assert_eq!(Mnemonic::Rcr.shift_ext(), Some(3));
    }

    #[test]
    fn conditions() {
        assert_eq!(Mnemonic::Jne.cond(), Some(5));
        assert_eq!(Mnemonic::from_cond(4), Mnemonic::Je);
        assert_eq!(Mnemonic::Jmp.cond(), None);
    }

    #[test]
    fn group3() {
        assert_eq!(Mnemonic::Not.group3_ext(), Some(2));
        assert_eq!(Mnemonic::from_group3_ext(1), None);
        assert_eq!(Mnemonic::from_group3_ext(6), Some(Mnemonic::Div));
    }

    #[test]
    fn fixed() {
        assert_eq!(Mnemonic::from_fixed_opcode(0x9C), Some(Mnemonic::Pushf));
        assert_eq!(Mnemonic::from_fixed_opcode(0xC3), Some(Mnemonic::Ret));
        assert_eq!(Mnemonic::from_fixed_opcode(0x00), None);
        assert_eq!(Mnemonic::Lahf.to_string(), "lahf");
    }
}
