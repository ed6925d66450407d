use crate::{
    error::EncodeError,
    operand::{Indirect, Operand},
    reg::Reg,
    size::{OperandSize, Scale},
};

pub const MOD_INDIRECT: u8 = 0b00;
pub const MOD_DISP8: u8 = 0b01;
pub const MOD_DISP32: u8 = 0b10;
pub const MOD_DIRECT: u8 = 0b11;

/// `rm = 100` announces a SIB byte, `index = 100` means no index.
pub const RM_SIB: u8 = 0b100;
pub const SIB_NO_INDEX: u8 = 0b100;

/// Content of the ModRM reg field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegField {
    Reg(Reg),
    Ext(u8),
}

impl RegField {
    pub fn bits(self) -> u8 {
        match self {
            RegField::Reg(r) => r.code(),
            RegField::Ext(ext) => ext & 0b111,
        }
    }
}

pub fn enc_modrm(md: u8, reg: u8, rm: u8) -> u8 {
    (md & 0b11) << 6 | (reg & 0b111) << 3 | (rm & 0b111)
}

pub fn enc_sib(scale: Scale, index: u8, base: u8) -> u8 {
    scale.bits() << 6 | (index & 0b111) << 3 | (base & 0b111)
}

/// (mod, reg, rm) or (scale, index, base)
pub fn dec_fields(byte: u8) -> (u8, u8, u8) {
    (byte >> 6, (byte >> 3) & 0b111, byte & 0b111)
}

fn address_reg(reg: Reg) -> Result<Reg, EncodeError> {
    match reg.size() {
        OperandSize::Long => Ok(reg),
        _ => Err(EncodeError::AddressRegister(reg)),
    }
}

/// Checks a memory operand against the supported zero-displacement forms and
/// returns its r/m code plus the SIB byte if one is needed.
fn memory_form(ind: &Indirect) -> Result<(u8, Option<u8>), EncodeError> {
    if ind.offset != 0 {
        return Err(EncodeError::Displacement(ind.offset));
    }
    let base = address_reg(ind.base.ok_or(EncodeError::MissingBase)?)?;
    if base == Reg::EBP {
        return Err(EncodeError::EbpBase);
    }
    match ind.index {
        Some(index) => {
            let index = address_reg(index)?;
            if index == Reg::ESP {
                return Err(EncodeError::EspIndex);
            }
            Ok((
                RM_SIB,
                Some(enc_sib(ind.scale, index.code(), base.code())),
            ))
        }
        None if base == Reg::ESP => Ok((
            RM_SIB,
            Some(enc_sib(Scale::S1, SIB_NO_INDEX, base.code())),
        )),
        None => Ok((base.code(), None)),
    }
}

/// ModRM byte and optional SIB byte for `rm` with `reg` in the reg field.
pub fn encode(rm: &Operand, reg: RegField) -> Result<Vec<u8>, EncodeError> {
    match rm {
        Operand::Register(r) => Ok(vec![enc_modrm(MOD_DIRECT, reg.bits(), r.code())]),
        Operand::Indirect(ind) => {
            let (rm, sib) = memory_form(ind)?;
            let mut bytes = vec![enc_modrm(MOD_INDIRECT, reg.bits(), rm)];
            bytes.extend(sib);
            Ok(bytes)
        }
        other => Err(EncodeError::NotRm(other.kind())),
    }
}

/// Byte count `encode` produces for `rm`.
pub fn encoded_len(rm: &Operand) -> Result<usize, EncodeError> {
    match rm {
        Operand::Register(_) => Ok(1),
        Operand::Indirect(ind) => Ok(1 + memory_form(ind)?.1.map_or(0, |_| 1)),
        other => Err(EncodeError::NotRm(other.kind())),
    }
}
