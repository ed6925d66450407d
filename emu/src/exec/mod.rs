//! Instruction semantics, one module per family.

pub mod alu;
mod arith;
mod control;
mod data;
mod flag;
mod shift;
mod stack;

use arch::{mnemonic::Mnemonic, operand::Operand};

use crate::{
    cpu::Cpu,
    decoder::Decoded,
    error::{Result, RuntimeError},
};

pub use control::condition;

impl Cpu {
    /// Applies the effect of `inst`. EIP already points past it.
    /// Returns `false` on the halt sentinel.
    pub fn execute(&mut self, inst: &Decoded) -> Result<bool> {
        use Mnemonic::*;
        match inst.mnemonic {
            Nop => return Ok(false),
            Mov | Lea => data::exec(self, inst)?,
            Add | Or | Adc | Sbb | And | Sub | Xor | Cmp | Test => arith::binary(self, inst)?,
            Not | Neg | Inc | Dec => arith::unary(self, inst)?,
            Mul | Imul => arith::multiply(self, inst)?,
            Div | Idiv => arith::divide(self, inst)?,
            Rol | Ror | Rcl | Rcr | Shl | Shr | Sal | Sar => shift::exec(self, inst)?,
            Push | Pop | Pushf | Popf | Pusha | Popa => stack::exec(self, inst)?,
            Stc | Clc | Cmc | Std | Cld | Sti | Cli | Lahf | Sahf => flag::exec(self, inst),
            _ => control::exec(self, inst)?,
        }
        Ok(true)
    }
}

// ----------------------------------------------------------------------------
// Operand helpers

fn src(inst: &Decoded) -> Result<&Operand> {
    inst.src().ok_or_else(|| missing(inst))
}

fn dst(inst: &Decoded) -> Result<&Operand> {
    inst.dst().ok_or_else(|| missing(inst))
}

fn missing(inst: &Decoded) -> RuntimeError {
    RuntimeError::Assertion(format!("`{}` is missing an operand", inst))
}

fn unsupported(inst: &Decoded) -> RuntimeError {
    RuntimeError::InstructionNotSupported(inst.to_string())
}
