use super::Instruction;
use crate::error::{Error, Result};

fn opcode(inst: &Instruction) -> Result<u8> {
    inst.mnemonic
        .fixed_opcode()
        .ok_or_else(|| Error::assertion(format!("`{}` has no fixed opcode", inst.operator)))
}

pub fn validate(inst: &Instruction) -> Result<()> {
    inst.expect_arity(0..=0)?;
    opcode(inst).map(|_| ())
}

pub fn length(inst: &Instruction) -> Result<usize> {
    Ok(inst.prefix_len() + 1)
}

pub fn encode(inst: &Instruction) -> Result<Vec<u8>> {
    let mut code = inst.prefix();
    code.push(opcode(inst)?);
    Ok(code)
}
