use arch::{
    bits::fits_unsigned,
    modrm::{self, RegField},
    operand::Operand,
    reg::Reg,
    size::OperandSize,
};

use super::Instruction;
use crate::error::{Error, Result};

enum Counter {
    One,
    Cl,
    Imm(u8),
}

/// First of two operands; a lone operand means shift by one.
fn counter(inst: &Instruction) -> Result<Counter> {
    if inst.operands.len() < 2 {
        return Ok(Counter::One);
    }
    match inst.src()? {
        Operand::Constant(1) => Ok(Counter::One),
        Operand::Constant(n) if fits_unsigned(*n, OperandSize::Byte) => Ok(Counter::Imm(*n as u8)),
        Operand::Constant(n) => Err(Error::operand_size(format!(
            "`{}` count {} does not fit in a byte",
            inst.operator, n
        ))),
        Operand::Register(Reg::CL) => Ok(Counter::Cl),
        op => Err(inst.reject(op)),
    }
}

pub fn validate(inst: &Instruction) -> Result<()> {
    inst.expect_arity(1..=2)?;
    match inst.dst()? {
        op if op.is_rm() => counter(inst).map(|_| ()),
        op => Err(inst.reject(op)),
    }
}

pub fn length(inst: &Instruction) -> Result<usize> {
    let imm = match counter(inst)? {
        Counter::Imm(_) => 1,
        _ => 0,
    };
    Ok(inst.prefix_len() + 1 + modrm::encoded_len(inst.dst()?)? + imm)
}

pub fn encode(inst: &Instruction, ext: u8) -> Result<Vec<u8>> {
    let counter = counter(inst)?;
    let opcode = match counter {
        Counter::One => 0xD0,
        Counter::Cl => 0xD2,
        Counter::Imm(_) => 0xC0,
    };
    let mut code = inst.prefix();
    code.push(opcode + inst.wide());
    code.extend(modrm::encode(inst.dst()?, RegField::Ext(ext))?);
    if let Counter::Imm(n) = counter {
        code.push(n);
    }
    Ok(code)
}
