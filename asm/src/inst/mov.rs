use arch::{
    bits::imm_bytes,
    modrm::{self, RegField},
    operand::Operand,
    size::OperandSize,
};

use super::Instruction;
use crate::error::Result;

// ----------------------------------------------------------------------------
// mov

pub fn validate(inst: &Instruction) -> Result<()> {
    inst.expect_arity(2..=2)?;
    let (src, dst) = (inst.src()?, inst.dst()?);
    if !dst.is_rm() {
        return Err(inst.reject(dst));
    }
    match src {
        Operand::Label(_) => Err(inst.reject(src)),
        Operand::Indirect(_) if dst.is_memory() => Err(inst.mem_to_mem()),
        _ => Ok(()),
    }
}

pub fn length(inst: &Instruction) -> Result<usize> {
    let (src, dst) = (inst.src()?, inst.dst()?);
    let imm = inst.size.bytes();
    let body = match (src, dst) {
        (Operand::Constant(_), Operand::Register(_)) => 1 + imm,
        (Operand::Constant(_), _) => 1 + modrm::encoded_len(dst)? + imm,
        (Operand::Register(_), _) => 1 + modrm::encoded_len(dst)?,
        _ => 1 + modrm::encoded_len(src)?,
    };
    Ok(inst.prefix_len() + body)
}

pub fn encode(inst: &Instruction) -> Result<Vec<u8>> {
    let (src, dst) = (inst.src()?, inst.dst()?);
    let mut code = inst.prefix();
    match (src, dst) {
        (Operand::Constant(n), Operand::Register(r)) => {
            let base = match inst.size {
                OperandSize::Byte => 0xB0,
                _ => 0xB8,
            };
            code.push(base + r.code());
            code.extend(imm_bytes(*n, inst.size));
        }
        (Operand::Constant(n), _) => {
            code.push(0xC6 + inst.wide());
            code.extend(modrm::encode(dst, RegField::Ext(0))?);
            code.extend(imm_bytes(*n, inst.size));
        }
        (Operand::Register(r), _) => {
            code.push(0x88 + inst.wide());
            code.extend(modrm::encode(dst, RegField::Reg(*r))?);
        }
        (_, Operand::Register(r)) => {
            code.push(0x8A + inst.wide());
            code.extend(modrm::encode(src, RegField::Reg(*r))?);
        }
        _ => return Err(inst.mem_to_mem()),
    }
    Ok(code)
}

// ----------------------------------------------------------------------------
// lea

pub fn validate_lea(inst: &Instruction) -> Result<()> {
    inst.expect_arity(2..=2)?;
    let (src, dst) = (inst.src()?, inst.dst()?);
    if !dst.is_register() {
        return Err(inst.reject(dst));
    }
    if !src.is_memory() {
        return Err(inst.reject(src));
    }
    inst.at_least_word()
}

pub fn length_lea(inst: &Instruction) -> Result<usize> {
    Ok(inst.prefix_len() + 1 + modrm::encoded_len(inst.src()?)?)
}

pub fn encode_lea(inst: &Instruction) -> Result<Vec<u8>> {
    let (src, dst) = (inst.src()?, inst.dst()?);
    let reg = match dst {
        Operand::Register(r) => *r,
        _ => return Err(inst.reject(dst)),
    };
    let mut code = inst.prefix();
    code.push(0x8D);
    code.extend(modrm::encode(src, RegField::Reg(reg))?);
    Ok(code)
}
