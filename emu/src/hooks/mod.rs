pub mod dump;
pub mod trace;

use x86emu::{decoder::Decoded, pc::Pc};

/// Observer run by the emulator loop. Takes the machine by value and hands
/// it back, so hooks chain with a fold.
pub trait Hook {
    fn init(&mut self, pc: Pc) -> Pc {
        pc
    }
    fn exec(&mut self, time: u64, inst: &Decoded, pc: Pc) -> Pc;
}
