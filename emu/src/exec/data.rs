use arch::{mnemonic::Mnemonic, operand::Operand};

use super::{dst, src, unsupported};
use crate::{cpu::Cpu, decoder::Decoded, error::Result};

pub fn exec(cpu: &mut Cpu, inst: &Decoded) -> Result<()> {
    let value = match (inst.mnemonic, src(inst)?) {
        (Mnemonic::Mov, op) => cpu.read(op, inst.size)?,
        (Mnemonic::Lea, Operand::Indirect(ind)) => cpu.effective_address(ind),
        _ => return Err(unsupported(inst)),
    };
    cpu.write(dst(inst)?, inst.size, value)
}
