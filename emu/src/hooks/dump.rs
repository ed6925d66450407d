use arch::{reg::Reg, size::OperandSize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

use super::Hook;
use x86emu::{decoder::Decoded, eflags::Flag, pc::Pc};

/// Prints machine state after selected instructions.
#[derive(Debug)]
pub struct Dump {
    file: Option<String>,
    all: bool,
    list: List,
}

/// Instruction address to what to print after it runs.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct List(pub HashMap<u32, Config>);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stack: bool,
    #[serde(default)]
    pub memory: Vec<u32>,
}

/// Stack words shown when no frame pointer bounds the dump.
const STACK_WORDS: u32 = 8;

impl Dump {
    pub fn arg(file: Option<String>, all: bool) -> Result<Self, String> {
        let list = match &file {
            Some(fname) => {
                let f = File::open(fname).map_err(|e| format!("{}: {}", fname, e))?;
                serde_yaml::from_reader(BufReader::new(f)).map_err(|e| format!("{}: {}", fname, e))?
            }
            None => List::default(),
        };
        Ok(Dump { file, all, list })
    }

    #[cfg(test)]
    pub fn with_list(list: List, all: bool) -> Self {
        Dump {
            file: None,
            all,
            list,
        }
    }

    fn get(&self, addr: u32) -> Option<&Config> {
        self.list.0.get(&addr)
    }
}

impl Hook for Dump {
    fn init(&mut self, pc: Pc) -> Pc {
        if self.all {
            println!(" * Dump all");
        }
        if let Some(fname) = &self.file {
            println!(" * Dump[{}] {:?}", self.list.0.len(), fname);
        }
        pc
    }

    fn exec(&mut self, _time: u64, inst: &Decoded, pc: Pc) -> Pc {
        if let Some(cfg) = self.get(inst.address) {
            print_reg(&pc);
            if cfg.stack {
                print_stack(&pc);
            }
            print_memory(&pc, &cfg.memory);
        } else if self.all {
            print_reg(&pc);
        }
        pc
    }
}

fn print_reg(pc: &Pc) {
    let cpu = pc.cpu();
    println!(" +----------------+----------------+----------------+");
    for row in [
        [Reg::EAX, Reg::EBX, Reg::ECX],
        [Reg::EDX, Reg::ESI, Reg::EDI],
    ] {
        println!(
            " | {}: {:0>8X} | {}: {:0>8X} | {}: {:0>8X} |",
            row[0],
            cpu.get(row[0]),
            row[1],
            cpu.get(row[1]),
            row[2],
            cpu.get(row[2]),
        );
    }
    println!(
        " | esp: {:0>8X} | ebp: {:0>8X} | eip: {:0>8X} |",
        cpu.get(Reg::ESP),
        cpu.get(Reg::EBP),
        cpu.eip()
    );
    let flags: String = [
        (Flag::Overflow, 'O'),
        (Flag::Direction, 'D'),
        (Flag::Interrupt, 'I'),
        (Flag::Sign, 'S'),
        (Flag::Zero, 'Z'),
        (Flag::Auxiliary, 'A'),
        (Flag::Parity, 'P'),
        (Flag::Carry, 'C'),
    ]
    .iter()
    .map(|(f, c)| if cpu.eflags.get(*f) { *c } else { '-' })
    .collect();
    println!(" | eflags: {:<41} |", flags);
    println!(" +----------------+----------------+----------------+");
}

fn print_stack(pc: &Pc) {
    let cpu = pc.cpu();
    let esp = cpu.get(Reg::ESP);
    let ebp = cpu.get(Reg::EBP);
    let top = match ebp > esp {
        true => ebp,
        false => esp.saturating_add(STACK_WORDS * 4),
    };
    let mut addr = esp;
    while addr < top {
        match cpu.memory.read(addr, OperandSize::Long) {
            Ok(v) => println!(" | {:0>8X} : {:0>8X}{:>31}|", addr, v, ""),
            Err(_) => break,
        }
        addr += 4;
    }
    println!(" +--------------------------------------------------+");
}

fn print_memory(pc: &Pc, addrs: &[u32]) {
    for addr in addrs {
        match pc.cpu().memory.read(*addr, OperandSize::Byte) {
            Ok(v) => println!(" | {:0>8X} : {:0>2X}{:>37}|", addr, v, ""),
            Err(e) => println!(" | {:0>8X} : {}", addr, e),
        }
    }
    println!(" +--------------------------------------------------+");
}
