//! `jmp`, `jcc` and `call`. Always the rel32 form, so lengths are known in
//! pass 1 without relaxation.

use arch::{bits::imm_bytes, mnemonic::Mnemonic, operand::Operand, size::OperandSize};

use super::Instruction;
use crate::{
    error::{Error, Result},
    label::Layout,
};

pub fn validate(inst: &Instruction) -> Result<()> {
    inst.expect_arity(1..=1)?;
    match inst.dst()? {
        Operand::Label(_) => Ok(()),
        op => Err(inst.reject(op)),
    }
}

fn opcode(inst: &Instruction) -> Result<Vec<u8>> {
    match inst.mnemonic {
        Mnemonic::Jmp => Ok(vec![0xE9]),
        Mnemonic::Call => Ok(vec![0xE8]),
        m => match m.cond() {
            Some(cc) => Ok(vec![0x0F, 0x80 + cc]),
            None => Err(Error::assertion(format!(
                "`{}` is not a branch",
                inst.operator
            ))),
        },
    }
}

pub fn length(inst: &Instruction) -> Result<usize> {
    Ok(opcode(inst)?.len() + 4)
}

pub fn encode(inst: &Instruction, layout: &Layout, index: usize) -> Result<Vec<u8>> {
    let name = match inst.dst()? {
        Operand::Label(name) => name,
        op => return Err(inst.reject(op)),
    };
    let target = layout.resolve(name)? as i64;
    let next = layout.address_of(index) as i64 + length(inst)? as i64;
    let mut code = opcode(inst)?;
    code.extend(imm_bytes(target - next, OperandSize::Long));
    Ok(code)
}
