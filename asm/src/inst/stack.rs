use arch::{
    bits::imm_bytes,
    modrm::{self, RegField},
    operand::Operand,
    size::OperandSize,
};

use super::Instruction;
use crate::error::Result;

// ----------------------------------------------------------------------------
// push

pub fn validate_push(inst: &Instruction) -> Result<()> {
    inst.expect_arity(1..=1)?;
    inst.at_least_word()?;
    match inst.src()? {
        op @ Operand::Label(_) => Err(inst.reject(op)),
        _ => Ok(()),
    }
}

pub fn length_push(inst: &Instruction) -> Result<usize> {
    let op = inst.src()?;
    let body = match op {
        Operand::Register(_) => 1,
        Operand::Constant(_) => 1 + inst.size.bytes(),
        _ => 1 + modrm::encoded_len(op)?,
    };
    Ok(inst.prefix_len() + body)
}

pub fn encode_push(inst: &Instruction) -> Result<Vec<u8>> {
    let op = inst.src()?;
    let mut code = inst.prefix();
    match op {
        Operand::Register(r) => code.push(0x50 + r.code()),
        Operand::Constant(n) => {
            code.push(match inst.size {
                OperandSize::Byte => 0x6A,
                _ => 0x68,
            });
            code.extend(imm_bytes(*n, inst.size));
        }
        _ => {
            code.push(0xFF);
            code.extend(modrm::encode(op, RegField::Ext(6))?);
        }
    }
    Ok(code)
}

// ----------------------------------------------------------------------------
// pop

pub fn validate_pop(inst: &Instruction) -> Result<()> {
    inst.expect_arity(1..=1)?;
    inst.at_least_word()?;
    match inst.dst()? {
        op if op.is_rm() => Ok(()),
        op => Err(inst.reject(op)),
    }
}

pub fn length_pop(inst: &Instruction) -> Result<usize> {
    let op = inst.dst()?;
    let body = match op {
        Operand::Register(_) => 1,
        _ => 1 + modrm::encoded_len(op)?,
    };
    Ok(inst.prefix_len() + body)
}

pub fn encode_pop(inst: &Instruction) -> Result<Vec<u8>> {
    let op = inst.dst()?;
    let mut code = inst.prefix();
    match op {
        Operand::Register(r) => code.push(0x58 + r.code()),
        _ => {
            code.push(0x8F);
            code.extend(modrm::encode(op, RegField::Ext(0))?);
        }
    }
    Ok(code)
}
