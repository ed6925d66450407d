//! Single operand `0xF6/0xF7 /ext` group: `not neg mul imul div idiv`.

use arch::modrm::{self, RegField};

use super::Instruction;
use crate::error::Result;

pub fn validate(inst: &Instruction) -> Result<()> {
    inst.expect_arity(1..=1)?;
    match inst.dst()? {
        op if op.is_rm() => Ok(()),
        op => Err(inst.reject(op)),
    }
}

pub fn length(inst: &Instruction) -> Result<usize> {
    Ok(inst.prefix_len() + 1 + modrm::encoded_len(inst.dst()?)?)
}

pub fn encode(inst: &Instruction, ext: u8) -> Result<Vec<u8>> {
    let mut code = inst.prefix();
    code.push(0xF6 + inst.wide());
    code.extend(modrm::encode(inst.dst()?, RegField::Ext(ext))?);
    Ok(code)
}
