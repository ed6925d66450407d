//! `add or adc sbb and sub xor cmp`: opcode family `ext*8 + 0..5` plus
//! `0x80/0x81 /ext`.

use arch::{
    bits::imm_bytes,
    modrm::{self, RegField},
    operand::Operand,
};

use super::Instruction;
use crate::error::Result;

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
    let body = match src {
        Operand::Constant(_) if dst.is_accumulator() => 1 + inst.size.bytes(),
        Operand::Constant(_) => 1 + modrm::encoded_len(dst)? + inst.size.bytes(),
        Operand::Register(_) => 1 + modrm::encoded_len(dst)?,
        _ => 1 + modrm::encoded_len(src)?,
    };
    Ok(inst.prefix_len() + body)
}

pub fn encode(inst: &Instruction, ext: u8) -> Result<Vec<u8>> {
    let (src, dst) = (inst.src()?, inst.dst()?);
    let base = ext << 3;
    let mut code = inst.prefix();
    match (src, dst) {
        (Operand::Constant(n), _) if dst.is_accumulator() => {
            code.push(base + 4 + inst.wide());
            code.extend(imm_bytes(*n, inst.size));
        }
        (Operand::Constant(n), _) => {
            code.push(0x80 + inst.wide());
            code.extend(modrm::encode(dst, RegField::Ext(ext))?);
            code.extend(imm_bytes(*n, inst.size));
        }
        (Operand::Register(r), _) => {
            code.push(base + inst.wide());
            code.extend(modrm::encode(dst, RegField::Reg(*r))?);
        }
        (_, Operand::Register(r)) => {
            code.push(base + 2 + inst.wide());
            code.extend(modrm::encode(src, RegField::Reg(*r))?);
        }
        _ => return Err(inst.mem_to_mem()),
    }
    Ok(code)
}
