use arch::{mnemonic::Mnemonic, size::OperandSize};

use super::{dst, unsupported};
use crate::{
    cpu::Cpu,
    decoder::Decoded,
    eflags::{EFlags, Flag},
    error::Result,
};

/// Evaluates condition code `cc` (`0x70+cc`). Odd codes negate the even one
/// before them.
pub fn condition(flags: &EFlags, cc: u8) -> bool {
    let f = |flag| flags.get(flag);
    let base = match (cc & 0xF) >> 1 {
        0 => f(Flag::Overflow),
        1 => f(Flag::Carry),
        2 => f(Flag::Zero),
        3 => f(Flag::Carry) || f(Flag::Zero),
        4 => f(Flag::Sign),
        5 => f(Flag::Parity),
        6 => f(Flag::Sign) != f(Flag::Overflow),
        _ => f(Flag::Zero) || f(Flag::Sign) != f(Flag::Overflow),
    };
    base != (cc & 1 == 1)
}

pub fn exec(cpu: &mut Cpu, inst: &Decoded) -> Result<()> {
    match inst.mnemonic {
        Mnemonic::Jmp => {
            let target = cpu.read(dst(inst)?, OperandSize::Long)?;
            cpu.set_eip(target);
        }
        Mnemonic::Call => {
            let target = cpu.read(dst(inst)?, OperandSize::Long)?;
            cpu.push(OperandSize::Long, cpu.eip())?;
            cpu.set_eip(target);
        }
        Mnemonic::Ret => {
            let target = cpu.pop(OperandSize::Long)?;
            cpu.set_eip(target);
        }
        m => match m.cond() {
            Some(cc) => {
                if condition(&cpu.eflags, cc) {
                    let target = cpu.read(dst(inst)?, OperandSize::Long)?;
                    cpu.set_eip(target);
                }
            }
            None => return Err(unsupported(inst)),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(set: &[Flag]) -> EFlags {
        let mut flags = EFlags::new();
        for f in set {
            flags.set(*f, true);
        }
        flags
    }

    macro_rules! test_cond {
        ($($name:ident: $mnemonic:ident, [$($flag:ident),*] => $taken:expr;)*) => {
            $(
                #[test]
                fn $name() {
                    let cc = Mnemonic::$mnemonic.cond().unwrap();
                    assert_eq!(condition(&flags(&[$(Flag::$flag),*]), cc), $taken);
                }
            )*
        }
    }

    test_cond! {
        jo_set: Jo, [Overflow] => true;
        jno_set: Jno, [Overflow] => false;
        jb_carry: Jb, [Carry] => true;
        jae_clear: Jae, [] => true;
        je_zero: Je, [Zero] => true;
        jne_zero: Jne, [Zero] => false;
        jbe_zero: Jbe, [Zero] => true;
        ja_clear: Ja, [] => true;
        ja_carry: Ja, [Carry] => false;
        js_sign: Js, [Sign] => true;
        jns_clear: Jns, [] => true;
        jp_parity: Jp, [Parity] => true;
        jnp_parity: Jnp, [Parity] => false;
        jl_sign: Jl, [Sign] => true;
        jl_both: Jl, [Sign, Overflow] => false;
        jge_both: Jge, [Sign, Overflow] => true;
        jle_zero: Jle, [Zero] => true;
        jle_clear: Jle, [] => false;
        jg_clear: Jg, [] => true;
        jg_overflow: Jg, [Overflow] => false;
    }
}
