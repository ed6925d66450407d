use arch::reg::Reg;
use indexmap::IndexMap;

use crate::{
    cpu::Cpu,
    decoder::Decoded,
    error::{Result, RuntimeError},
    memory::Memory,
};

/// Registers shown by `register_values`, in display order.
const DISPLAY_REGS: [Reg; 8] = [
    Reg::EAX,
    Reg::EBX,
    Reg::ECX,
    Reg::EDX,
    Reg::ESI,
    Reg::EDI,
    Reg::ESP,
    Reg::EBP,
];

/// A machine: one CPU and its memory, reset on every program load.
#[derive(Debug, Clone)]
pub struct Pc {
    memory_size: u32,
    cpu: Cpu,
}

impl Pc {
    pub fn new(memory_size: u32) -> Self {
        Pc {
            memory_size,
            cpu: Cpu::new(Memory::new(memory_size as usize)),
        }
    }

    /// Resets the machine and copies `code` to `load_addr`. Execution starts
    /// at `load_addr + start_offset` with the stack pointer at the top of
    /// memory.
    pub fn load_program(&mut self, code: &[u8], load_addr: u32, start_offset: u32) -> Result<()> {
        let mut cpu = Cpu::new(Memory::new(self.memory_size as usize));
        if (self.memory_size as u64) < load_addr as u64 + code.len() as u64 {
            return Err(RuntimeError::LowMemory(
                "Code size greater than available memory.".into(),
            ));
        }
        cpu.memory.load(load_addr, code)?;
        cpu.set_program(load_addr..load_addr + code.len() as u32);
        cpu.set_eip(load_addr.wrapping_add(start_offset));
        cpu.set(Reg::ESP, self.memory_size);
        self.cpu = cpu;
        Ok(())
    }

    /// Runs one instruction. `Ok(false)` means the program has stopped.
    pub fn step(&mut self) -> Result<bool> {
        self.cpu.step()
    }

    /// Runs one instruction and returns it, `None` once the program stopped.
    pub fn exec(&mut self) -> Result<Option<Decoded>> {
        self.cpu.exec_next()
    }

    pub fn eip(&self) -> u32 {
        self.cpu.eip()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Register name to big-endian hex bytes, e.g. `eax: "00 00 FF FF"`.
    pub fn register_values(&self) -> IndexMap<String, String> {
        let regs = &self.cpu.regs;
        let mut values: IndexMap<String, String> = DISPLAY_REGS
            .iter()
            .map(|r| (r.to_string(), regs.hex(*r)))
            .collect();
        values.insert("eip".into(), regs.eip_hex());
        values
    }

    pub fn flag_values(&self) -> IndexMap<String, bool> {
        self.cpu
            .eflags
            .values()
            .into_iter()
            .map(|(flag, v)| (flag.to_string(), v))
            .collect()
    }

    pub fn memory_values(&self) -> Vec<String> {
        self.cpu.memory.hex_bytes()
    }
}
