use arch::{mnemonic::Mnemonic, reg::Reg};

use crate::{
    cpu::Cpu,
    decoder::Decoded,
    eflags::Flag,
};

/// Flags that `lahf` and `sahf` move through AH.
const AH_FLAGS: [Flag; 5] = [
    Flag::Sign,
    Flag::Zero,
    Flag::Auxiliary,
    Flag::Parity,
    Flag::Carry,
];

pub fn exec(cpu: &mut Cpu, inst: &Decoded) {
    let flags = &mut cpu.eflags;
    match inst.mnemonic {
        Mnemonic::Stc => flags.set(Flag::Carry, true),
        Mnemonic::Clc => flags.set(Flag::Carry, false),
        Mnemonic::Cmc => flags.set(Flag::Carry, !flags.get(Flag::Carry)),
        Mnemonic::Std => flags.set(Flag::Direction, true),
        Mnemonic::Cld => flags.set(Flag::Direction, false),
        Mnemonic::Sti => flags.set(Flag::Interrupt, true),
        Mnemonic::Cli => flags.set(Flag::Interrupt, false),
        Mnemonic::Lahf => {
            // SF ZF 0 AF 0 PF 1 CF
            let ah = flags.bits() & 0xD7;
            cpu.set(Reg::AH, ah);
        }
        Mnemonic::Sahf => {
            let ah = cpu.get(Reg::AH);
            for flag in AH_FLAGS {
                cpu.eflags.set(flag, ah >> u8::from(flag) & 1 == 1);
            }
        }
        _ => {}
    }
}
