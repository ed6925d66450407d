use arch::{mnemonic::Mnemonic, size::OperandSize};

use super::{
    alu::{self, ShiftOp},
    dst, src, unsupported,
};
use crate::{cpu::Cpu, decoder::Decoded, eflags::Flag, error::Result};

const COUNT_MASK: u32 = 0x1F;

pub fn exec(cpu: &mut Cpu, inst: &Decoded) -> Result<()> {
    let op = match inst.mnemonic {
        Mnemonic::Rol => ShiftOp::Rol,
        Mnemonic::Ror => ShiftOp::Ror,
        Mnemonic::Rcl => ShiftOp::Rcl,
        Mnemonic::Rcr => ShiftOp::Rcr,
        Mnemonic::Shl | Mnemonic::Sal => ShiftOp::Shl,
        Mnemonic::Shr => ShiftOp::Shr,
        Mnemonic::Sar => ShiftOp::Sar,
        _ => return Err(unsupported(inst)),
    };
    let size = inst.size;
    let dst = dst(inst)?;
    let count = match inst.operands.len() {
        1 => 1,
        _ => cpu.read(src(inst)?, OperandSize::Byte)?,
    } & COUNT_MASK;
    let a = cpu.read(dst, size)?;
    let (res, update) = alu::shift(op, a, count, cpu.eflags.get(Flag::Carry), size);
    cpu.write(dst, size, res)?;
    update.apply(&mut cpu.eflags);
    Ok(())
}
