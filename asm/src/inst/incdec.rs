use arch::{
    modrm::{self, RegField},
    operand::Operand,
    size::OperandSize,
};

use super::Instruction;
use crate::error::Result;

pub fn validate(inst: &Instruction) -> Result<()> {
    inst.expect_arity(1..=1)?;
    match inst.dst()? {
        op if op.is_rm() => Ok(()),
        op => Err(inst.reject(op)),
    }
}

/// `0x40+r`/`0x48+r` exist for 16/32-bit registers only; bytes and memory
/// go through `0xFE/0xFF /ext`.
fn short_form(inst: &Instruction) -> Result<Option<u8>> {
    Ok(match inst.dst()? {
        Operand::Register(r) if inst.size != OperandSize::Byte => Some(r.code()),
        _ => None,
    })
}

pub fn length(inst: &Instruction) -> Result<usize> {
    let body = match short_form(inst)? {
        Some(_) => 1,
        None => 1 + modrm::encoded_len(inst.dst()?)?,
    };
    Ok(inst.prefix_len() + body)
}

pub fn encode(inst: &Instruction, ext: u8) -> Result<Vec<u8>> {
    let mut code = inst.prefix();
    match short_form(inst)? {
        Some(reg) => code.push(0x40 + (ext << 3) + reg),
        None => {
            code.push(0xFE + inst.wide());
            code.extend(modrm::encode(inst.dst()?, RegField::Ext(ext))?);
        }
    }
    Ok(code)
}
