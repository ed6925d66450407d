use arch::{
    bits::get_uint,
    mnemonic::Mnemonic,
    operand::{Indirect, Operand},
    reg::Reg,
    size::OperandSize,
};
use std::ops::Range;

use crate::{
    decoder::{decode, Decoded, MAX_INSTRUCTION_LENGTH},
    eflags::EFlags,
    error::{Result, RuntimeError},
    memory::Memory,
    register::RegisterFile,
};

/// Registers, flags and memory of one emulation session.
#[derive(Debug, Clone)]
pub struct Cpu {
    pub regs: RegisterFile,
    pub eflags: EFlags,
    pub memory: Memory,
    program: Range<u32>,
}

impl Cpu {
    pub fn new(memory: Memory) -> Self {
        Cpu {
            regs: RegisterFile::new(),
            eflags: EFlags::new(),
            memory,
            program: 0..0,
        }
    }

    /// Marks the address range holding the loaded program. Fetching outside
    /// of it ends execution.
    pub fn set_program(&mut self, program: Range<u32>) {
        self.program = program;
    }

    pub fn eip(&self) -> u32 {
        self.regs.eip
    }

    pub fn set_eip(&mut self, value: u32) {
        self.regs.eip = value;
    }

    pub fn get(&self, reg: Reg) -> u32 {
        self.regs.get(reg)
    }

    pub fn set(&mut self, reg: Reg, value: u32) {
        self.regs.set(reg, value);
    }

    // ------------------------------------------------------------------------
    // Fetch / decode / execute

    /// Decodes the instruction at EIP without executing it. `None` means
    /// there is nothing left to run.
    pub fn fetch(&self) -> Result<Option<Decoded>> {
        let eip = self.eip();
        if !self.program.contains(&eip) {
            return Ok(None);
        }
        decode(self.memory.window(eip, MAX_INSTRUCTION_LENGTH), eip)
    }

    /// Executes one instruction. Returns `false` when execution should stop
    /// cleanly: on `nop`, at the end of the program, or on a truncated
    /// instruction.
    pub fn step(&mut self) -> Result<bool> {
        Ok(self.exec_next()?.is_some())
    }

    /// Like `step`, but hands back the instruction that ran.
    pub fn exec_next(&mut self) -> Result<Option<Decoded>> {
        let inst = match self.fetch()? {
            Some(inst) if inst.mnemonic != Mnemonic::Nop => inst,
            _ => return Ok(None),
        };
        self.set_eip(inst.next());
        match self.execute(&inst)? {
            true => Ok(Some(inst)),
            false => Ok(None),
        }
    }

    // ------------------------------------------------------------------------
    // Operands

    /// base + index * scale + offset, wrapping at 32 bits.
    pub fn effective_address(&self, ind: &Indirect) -> u32 {
        let base = ind.base.map_or(0, |r| self.get(r));
        let index = ind
            .index
            .map_or(0, |r| self.get(r).wrapping_mul(ind.scale.factor()));
        base.wrapping_add(index).wrapping_add(ind.offset as u32)
    }

    pub fn read(&self, op: &Operand, size: OperandSize) -> Result<u32> {
        match op {
            Operand::Register(r) => Ok(get_uint(self.get(*r) as i64, size)),
            Operand::Constant(n) => Ok(get_uint(*n, size)),
            Operand::Indirect(ind) => self.memory.read(self.effective_address(ind), size),
            Operand::Label(name) => Err(RuntimeError::Assertion(format!(
                "Unresolved label {} at run time",
                name
            ))),
        }
    }

    pub fn write(&mut self, op: &Operand, size: OperandSize, value: u32) -> Result<()> {
        let value = value & size.mask();
        match op {
            Operand::Register(r) => {
                self.set(*r, value);
                Ok(())
            }
            Operand::Indirect(ind) => {
                let addr = self.effective_address(ind);
                self.memory.write(addr, size, value)
            }
            other => Err(RuntimeError::Assertion(format!(
                "Invalid operand type for write: {}",
                other.kind()
            ))),
        }
    }

    // ------------------------------------------------------------------------
    // Stack

    pub fn push(&mut self, size: OperandSize, value: u32) -> Result<()> {
        let esp = self.get(Reg::ESP);
        let esp = esp
            .checked_sub(size.bytes() as u32)
            .ok_or_else(|| RuntimeError::Assertion("Stack overflow!".into()))?;
        self.set(Reg::ESP, esp);
        self.memory.write(esp, size, value)
    }

    pub fn pop(&mut self, size: OperandSize) -> Result<u32> {
        let esp = self.get(Reg::ESP);
        if esp as usize + size.bytes() > self.memory.size() {
            return Err(RuntimeError::Assertion("Stack underflow!".into()));
        }
        let value = self.memory.read(esp, size)?;
        self.set(Reg::ESP, esp + size.bytes() as u32);
        Ok(value)
    }
}
