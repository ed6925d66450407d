use arch::{mnemonic::Mnemonic, reg::Reg};

use super::{dst, src, unsupported};
use crate::{cpu::Cpu, decoder::Decoded, error::Result};

/// Register code of the stack pointer, skipped by `popa`.
const SP_CODE: u8 = 4;

pub fn exec(cpu: &mut Cpu, inst: &Decoded) -> Result<()> {
    let size = inst.size;
    match inst.mnemonic {
        Mnemonic::Push => {
            let value = cpu.read(src(inst)?, size)?;
            cpu.push(size, value)
        }
        Mnemonic::Pop => {
            let value = cpu.pop(size)?;
            cpu.write(dst(inst)?, size, value)
        }
        Mnemonic::Pushf => cpu.push(size, cpu.eflags.bits()),
        Mnemonic::Popf => {
            let value = cpu.pop(size)?;
            let kept = cpu.eflags.bits() & !size.mask();
            cpu.eflags.set_bits(kept | value);
            Ok(())
        }
        Mnemonic::Pusha => {
            // ax cx dx bx sp bp si di, with sp as it was before the first push
            let values: Vec<u32> = (0..8).map(|code| cpu.get(Reg::from_code(code, size))).collect();
            for value in values {
                cpu.push(size, value)?;
            }
            Ok(())
        }
        Mnemonic::Popa => {
            for code in (0..8).rev() {
                let value = cpu.pop(size)?;
                if code != SP_CODE {
                    cpu.set(Reg::from_code(code, size), value);
                }
            }
            Ok(())
        }
        _ => Err(unsupported(inst)),
    }
}
