use arch::{bits::sign_extend, mnemonic::Mnemonic, reg::Reg, size::OperandSize};

use super::{alu, dst, src, unsupported};
use crate::{
    cpu::Cpu,
    decoder::Decoded,
    eflags::Flag,
    error::{Result, RuntimeError},
};

/// Two-operand ALU forms. `cmp` and `test` only update flags.
pub fn binary(cpu: &mut Cpu, inst: &Decoded) -> Result<()> {
    use Mnemonic::*;
    let size = inst.size;
    let dst = dst(inst)?;
    let b = cpu.read(src(inst)?, size)?;
    let a = cpu.read(dst, size)?;
    let carry = cpu.eflags.get(Flag::Carry);
    let (res, update) = match inst.mnemonic {
        Add => alu::add(a, b, false, size),
        Adc => alu::add(a, b, carry, size),
        Sub | Cmp => alu::sub(a, b, false, size),
        Sbb => alu::sub(a, b, carry, size),
        And | Test => alu::logic(a & b, size),
        Or => alu::logic(a | b, size),
        Xor => alu::logic(a ^ b, size),
        _ => return Err(unsupported(inst)),
    };
    if !matches!(inst.mnemonic, Cmp | Test) {
        cpu.write(dst, size, res)?;
    }
    update.apply(&mut cpu.eflags);
    Ok(())
}

pub fn unary(cpu: &mut Cpu, inst: &Decoded) -> Result<()> {
    let size = inst.size;
    let dst = dst(inst)?;
    let a = cpu.read(dst, size)?;
    let (res, update) = match inst.mnemonic {
        Mnemonic::Not => (!a & size.mask(), alu::Update::default()),
        Mnemonic::Neg => alu::neg(a, size),
        Mnemonic::Inc => alu::inc(a, size),
        Mnemonic::Dec => alu::dec(a, size),
        _ => return Err(unsupported(inst)),
    };
    cpu.write(dst, size, res)?;
    update.apply(&mut cpu.eflags);
    Ok(())
}

/// Registers holding the low and high halves of a double-width value:
/// `ah:al`, `dx:ax`, `edx:eax`.
fn halves(size: OperandSize) -> (Reg, Reg) {
    match size {
        OperandSize::Byte => (Reg::AL, Reg::AH),
        OperandSize::Word => (Reg::AX, Reg::DX),
        OperandSize::Long => (Reg::EAX, Reg::EDX),
    }
}

/// One-operand `mul`/`imul`: accumulator times source into the double-width
/// pair. CF and OF report whether the high half carries information.
pub fn multiply(cpu: &mut Cpu, inst: &Decoded) -> Result<()> {
    let size = inst.size;
    let (lo_reg, hi_reg) = halves(size);
    let b = cpu.read(dst(inst)?, size)?;
    let a = cpu.get(lo_reg);
    let (lo, hi, overflow) = match inst.mnemonic {
        Mnemonic::Mul => {
            let product = a as u64 * b as u64;
            let hi = (product >> size.bits()) as u32 & size.mask();
            (product as u32 & size.mask(), hi, hi != 0)
        }
        Mnemonic::Imul => {
            let product = sign_extend(a, size) * sign_extend(b, size);
            let lo = product as u32 & size.mask();
            let hi = (product >> size.bits()) as u32 & size.mask();
            (lo, hi, sign_extend(lo, size) != product)
        }
        _ => return Err(unsupported(inst)),
    };
    cpu.set(lo_reg, lo);
    cpu.set(hi_reg, hi);
    cpu.eflags.set(Flag::Carry, overflow);
    cpu.eflags.set(Flag::Overflow, overflow);
    Ok(())
}

/// One-operand `div`/`idiv` of the double-width pair. Quotient goes to the
/// low half, remainder to the high half.
pub fn divide(cpu: &mut Cpu, inst: &Decoded) -> Result<()> {
    let size = inst.size;
    let (lo_reg, hi_reg) = halves(size);
    let divisor = cpu.read(dst(inst)?, size)?;
    if divisor == 0 {
        return Err(RuntimeError::Divide("Division by zero.".into()));
    }
    let dividend = (cpu.get(hi_reg) as u64) << size.bits() | cpu.get(lo_reg) as u64;
    let too_large = || RuntimeError::Divide("Quotient too large for the destination.".into());
    let (quotient, remainder) = match inst.mnemonic {
        Mnemonic::Div => {
            let q = dividend / divisor as u64;
            if q > size.mask() as u64 {
                return Err(too_large());
            }
            (q as u32, (dividend % divisor as u64) as u32)
        }
        Mnemonic::Idiv => {
            let shift = 64 - 2 * size.bits();
            let dividend = ((dividend << shift) as i64) >> shift;
            let divisor = sign_extend(divisor, size);
            let q = dividend.checked_div(divisor).ok_or_else(too_large)?;
            let r = dividend.checked_rem(divisor).ok_or_else(too_large)?;
            let q_bits = q as u32 & size.mask();
            if sign_extend(q_bits, size) != q {
                return Err(too_large());
            }
            (q_bits, r as u32 & size.mask())
        }
        _ => return Err(unsupported(inst)),
    };
    cpu.set(lo_reg, quotient);
    cpu.set(hi_reg, remainder);
    Ok(())
}
