use color_print::cprintln;

use super::Hook;
use x86emu::{decoder::Decoded, pc::Pc};

/// Prints every executed instruction.
#[derive(Debug, Default)]
pub struct Trace {
    quiet: bool,
}

impl Trace {
    pub fn new(quiet: bool) -> Self {
        Trace { quiet }
    }
}

impl Hook for Trace {
    fn exec(&mut self, time: u64, inst: &Decoded, pc: Pc) -> Pc {
        if !self.quiet {
            cprintln!(
                "[{:0>4}] <blue>{:08x}</>: {}",
                time,
                inst.address,
                inst.cformat()
            );
        }
        pc
    }
}
