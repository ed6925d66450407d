use arch::{
    bits::{read_le, sign_extend},
    mnemonic::Mnemonic,
    modrm::{dec_fields, MOD_DIRECT, MOD_DISP32, MOD_DISP8, MOD_INDIRECT, RM_SIB, SIB_NO_INDEX},
    operand::{Indirect, Operand},
    reg::Reg,
    size::{OperandSize, Scale},
};
use color_print::cformat;
use std::fmt;

use crate::error::{Result, RuntimeError};

pub const MAX_INSTRUCTION_LENGTH: usize = 10;

const OPERAND_SIZE_PREFIX: u8 = 0x66;

/// One decoded instruction. Operands are in AT&T order, destination last.
/// Branch targets are absolute addresses carried as `Operand::Constant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub address: u32,
    pub len: usize,
    pub mnemonic: Mnemonic,
    pub size: OperandSize,
    pub operands: Vec<Operand>,
}

impl Decoded {
    pub fn next(&self) -> u32 {
        self.address.wrapping_add(self.len as u32)
    }

    pub fn dst(&self) -> Option<&Operand> {
        self.operands.last()
    }

    pub fn src(&self) -> Option<&Operand> {
        self.operands.first()
    }

    pub fn cformat(&self) -> String {
        let ops: Vec<String> = self.operands.iter().map(|o| o.cformat()).collect();
        cformat!("<red>{}</> {}", self.mnemonic, ops.join(", "))
    }
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ops: Vec<String> = self.operands.iter().map(|o| o.to_string()).collect();
        match ops.is_empty() {
            true => write!(f, "{}", self.mnemonic),
            false => write!(f, "{} {}", self.mnemonic, ops.join(", ")),
        }
    }
}

// ----------------------------------------------------------------------------
// Byte reader

enum Stop {
    Truncated,
    Unsupported,
}

type Step<T> = std::result::Result<T, Stop>;

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn byte(&mut self) -> Step<u8> {
        let b = *self.bytes.get(self.pos).ok_or(Stop::Truncated)?;
        self.pos += 1;
        Ok(b)
    }

    fn uint(&mut self, size: OperandSize) -> Step<u32> {
        let rest = self.bytes.get(self.pos..).unwrap_or(&[]);
        let v = read_le(rest, size).ok_or(Stop::Truncated)?;
        self.pos += size.bytes();
        Ok(v)
    }

    fn imm(&mut self, size: OperandSize) -> Step<Operand> {
        Ok(Operand::Constant(self.uint(size)? as i64))
    }

    /// Immediate byte sign-extended to `size`.
    fn imm8_extended(&mut self, size: OperandSize) -> Step<Operand> {
        let v = sign_extend(self.uint(OperandSize::Byte)?, OperandSize::Byte);
        Ok(Operand::Constant(v & size.mask() as i64))
    }

    fn rel(&mut self, size: OperandSize) -> Step<i64> {
        Ok(sign_extend(self.uint(size)?, size))
    }

    /// ModRM (+SIB, +displacement). Returns the reg field and the r/m operand.
    fn modrm(&mut self, size: OperandSize) -> Step<(u8, Operand)> {
        let (md, reg, rm) = dec_fields(self.byte()?);
        if md == MOD_DIRECT {
            return Ok((reg, Operand::Register(Reg::from_code(rm, size))));
        }
        let mut ind = Indirect::default();
        let mut no_base = false;
        if rm == RM_SIB {
            let (scale, index, base) = dec_fields(self.byte()?);
            if index != SIB_NO_INDEX {
                ind.index = Some(Reg::from_code(index, OperandSize::Long));
                ind.scale = Scale::from_bits(scale);
            }
            no_base = md == MOD_INDIRECT && base == 0b101;
            if !no_base {
                ind.base = Some(Reg::from_code(base, OperandSize::Long));
            }
        } else if md == MOD_INDIRECT && rm == 0b101 {
            no_base = true;
        } else {
            ind.base = Some(Reg::from_code(rm, OperandSize::Long));
        }
        ind.offset = match md {
            MOD_DISP8 => self.rel(OperandSize::Byte)?,
            MOD_DISP32 => self.rel(OperandSize::Long)?,
            _ if no_base => self.uint(OperandSize::Long)? as i64,
            _ => 0,
        };
        Ok((reg, Operand::Indirect(ind)))
    }
}

// ----------------------------------------------------------------------------
// Decoder

/// Decodes the instruction at the start of `bytes`, which were fetched from
/// `address`.
///
/// Returns `Ok(None)` when the bytes run out before the instruction is
/// complete, which happens when execution walks off the end of the loaded
/// program into a short window.
pub fn decode(bytes: &[u8], address: u32) -> Result<Option<Decoded>> {
    let mut r = Reader { bytes, pos: 0 };
    match decode_inner(&mut r, address) {
        Ok(decoded) => Ok(Some(decoded)),
        Err(Stop::Truncated) => Ok(None),
        Err(Stop::Unsupported) => {
            let seen = &bytes[..r.pos.min(bytes.len())];
            let hex: Vec<String> = seen.iter().map(|b| format!("{:02X}", b)).collect();
            Err(RuntimeError::InstructionNotSupported(hex.join(" ")))
        }
    }
}

fn decode_inner(r: &mut Reader, address: u32) -> Step<Decoded> {
    let mut opcode = r.byte()?;
    let mut wide = OperandSize::Long;
    if opcode == OPERAND_SIZE_PREFIX {
        wide = OperandSize::Word;
        opcode = r.byte()?;
    }
    let (mnemonic, size, operands) = opcode_body(r, opcode, wide)?;
    let len = r.pos;
    let operands = relocate(operands, mnemonic, address, len);
    Ok(Decoded {
        address,
        len,
        mnemonic,
        size,
        operands,
    })
}

/// Turns relative branch displacements into absolute targets.
fn relocate(operands: Vec<Operand>, mnemonic: Mnemonic, address: u32, len: usize) -> Vec<Operand> {
    let is_branch = matches!(mnemonic, Mnemonic::Jmp | Mnemonic::Call) || mnemonic.cond().is_some();
    if !is_branch {
        return operands;
    }
    let next = address as i64 + len as i64;
    operands
        .into_iter()
        .map(|op| match op {
            Operand::Constant(rel) => Operand::Constant((next + rel) & 0xFFFF_FFFF),
            op => op,
        })
        .collect()
}

type Body = (Mnemonic, OperandSize, Vec<Operand>);

fn width(opcode: u8, wide: OperandSize) -> OperandSize {
    match opcode & 1 {
        0 => OperandSize::Byte,
        _ => wide,
    }
}

fn opcode_body(r: &mut Reader, opcode: u8, wide: OperandSize) -> Step<Body> {
    use Mnemonic::*;
    use OperandSize::*;
    let reg = |code: u8, size: OperandSize| Operand::Register(Reg::from_code(code, size));

    match opcode {
        // add/or/adc/sbb/and/sub/xor/cmp, the six classic forms each
        0x00..=0x3F if opcode & 0b111 < 6 => {
            let m = Mnemonic::from_alu_ext(opcode >> 3);
            let size = width(opcode, wide);
            match opcode & 0b111 {
                0 | 1 => {
                    let (g, rm) = r.modrm(size)?;
                    Ok((m, size, vec![reg(g, size), rm]))
                }
                2 | 3 => {
                    let (g, rm) = r.modrm(size)?;
                    Ok((m, size, vec![rm, reg(g, size)]))
                }
                _ => Ok((m, size, vec![r.imm(size)?, reg(0, size)])),
            }
        }
        0x0F => {
            let second = r.byte()?;
            match second {
                0x80..=0x8F => Ok((
                    Mnemonic::from_cond(second),
                    Long,
                    vec![Operand::Constant(r.rel(Long)?)],
                )),
                _ => Err(Stop::Unsupported),
            }
        }
        0x40..=0x47 => Ok((Inc, wide, vec![reg(opcode, wide)])),
        0x48..=0x4F => Ok((Dec, wide, vec![reg(opcode, wide)])),
        0x50..=0x57 => Ok((Push, wide, vec![reg(opcode, wide)])),
        0x58..=0x5F => Ok((Pop, wide, vec![reg(opcode, wide)])),
        0x68 => Ok((Push, wide, vec![r.imm(wide)?])),
        0x6A => Ok((Push, wide, vec![r.imm8_extended(wide)?])),
        0x70..=0x7F => Ok((
            Mnemonic::from_cond(opcode),
            Long,
            vec![Operand::Constant(r.rel(Byte)?)],
        )),
        0x80 | 0x81 | 0x83 => {
            let size = width(opcode, wide);
            let (ext, rm) = r.modrm(size)?;
            let imm = match opcode {
                0x83 => r.imm8_extended(size)?,
                _ => r.imm(size)?,
            };
            Ok((Mnemonic::from_alu_ext(ext), size, vec![imm, rm]))
        }
        0x84 | 0x85 => {
            let size = width(opcode, wide);
            let (g, rm) = r.modrm(size)?;
            Ok((Test, size, vec![reg(g, size), rm]))
        }
        0x88 | 0x89 => {
            let size = width(opcode, wide);
            let (g, rm) = r.modrm(size)?;
            Ok((Mov, size, vec![reg(g, size), rm]))
        }
        0x8A | 0x8B => {
            let size = width(opcode, wide);
            let (g, rm) = r.modrm(size)?;
            Ok((Mov, size, vec![rm, reg(g, size)]))
        }
        0x8D => match r.modrm(wide)? {
            (g, rm @ Operand::Indirect(_)) => Ok((Lea, wide, vec![rm, reg(g, wide)])),
            _ => Err(Stop::Unsupported),
        },
        0x8F => match r.modrm(wide)? {
            (0, rm) => Ok((Pop, wide, vec![rm])),
            _ => Err(Stop::Unsupported),
        },
        0xA8 | 0xA9 => {
            let size = width(opcode, wide);
            Ok((Test, size, vec![r.imm(size)?, reg(0, size)]))
        }
        0xB0..=0xB7 => Ok((Mov, Byte, vec![r.imm(Byte)?, reg(opcode, Byte)])),
        0xB8..=0xBF => Ok((Mov, wide, vec![r.imm(wide)?, reg(opcode, wide)])),
        0xC0 | 0xC1 | 0xD0..=0xD3 => {
            let size = width(opcode, wide);
            let (ext, rm) = r.modrm(size)?;
            let count = match opcode {
                0xC0 | 0xC1 => r.imm(Byte)?,
                0xD0 | 0xD1 => Operand::Constant(1),
                _ => Operand::Register(Reg::CL),
            };
            Ok((Mnemonic::from_shift_ext(ext), size, vec![count, rm]))
        }
        0xC6 | 0xC7 => {
            let size = width(opcode, wide);
            match r.modrm(size)? {
                (0, rm) => Ok((Mov, size, vec![r.imm(size)?, rm])),
                _ => Err(Stop::Unsupported),
            }
        }
        0xE8 => Ok((Call, Long, vec![Operand::Constant(r.rel(Long)?)])),
        0xE9 => Ok((Jmp, Long, vec![Operand::Constant(r.rel(Long)?)])),
        0xEB => Ok((Jmp, Long, vec![Operand::Constant(r.rel(Byte)?)])),
        0xF6 | 0xF7 => {
            let size = width(opcode, wide);
            let (ext, rm) = r.modrm(size)?;
            match Mnemonic::from_group3_ext(ext) {
                Some(Test) => Ok((Test, size, vec![r.imm(size)?, rm])),
                Some(m) => Ok((m, size, vec![rm])),
                None => Err(Stop::Unsupported),
            }
        }
        0xFE | 0xFF => {
            let size = width(opcode, wide);
            match r.modrm(size)? {
                (0, rm) => Ok((Inc, size, vec![rm])),
                (1, rm) => Ok((Dec, size, vec![rm])),
                (6, rm) if opcode == 0xFF => Ok((Push, size, vec![rm])),
                _ => Err(Stop::Unsupported),
            }
        }
        // pushf popf pusha popa ret nop and the flag instructions
        _ => match Mnemonic::from_fixed_opcode(opcode) {
            Some(m) => Ok((m, wide, vec![])),
            None => Err(Stop::Unsupported),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Mnemonic::*;
    use OperandSize::*;

    fn r(reg: Reg) -> Operand {
        Operand::Register(reg)
    }

    fn c(n: i64) -> Operand {
        Operand::Constant(n)
    }

    fn m(ind: Indirect) -> Operand {
        Operand::Indirect(ind)
    }

    macro_rules! test_decode {
        ($($name:ident: $bytes:expr => $mnemonic:expr, $size:expr, $operands:expr;)*) => {
            $(
                #[test]
                fn $name() {
                    let bytes: &[u8] = &$bytes;
                    let decoded = decode(bytes, 0).unwrap().unwrap();
                    assert_eq!(decoded.mnemonic, $mnemonic);
                    assert_eq!(decoded.size, $size);
                    assert_eq!(decoded.operands, $operands);
                    assert_eq!(decoded.len, bytes.len());
                }
            )*
        }
    }

    test_decode! {
        mov_imm_word: [0x66, 0xB8, 0x20, 0x00] => Mov, Word, vec![c(0x20), r(Reg::AX)];
        mov_imm_long: [0xBC, 0x00, 0x00, 0x05, 0x00] => Mov, Long, vec![c(0x50000), r(Reg::ESP)];
        mov_imm_byte: [0xB4, 0x7F] => Mov, Byte, vec![c(0x7F), r(Reg::AH)];
        mov_reg_reg: [0x66, 0x89, 0xC8] => Mov, Word, vec![r(Reg::CX), r(Reg::AX)];
        mov_load: [0x8A, 0x18] => Mov, Byte, vec![m(Indirect::base(Reg::EAX)), r(Reg::BL)];
        mov_store_imm: [0xC7, 0x00, 0x01, 0x00, 0x00, 0x00] => Mov, Long, vec![c(1), m(Indirect::base(Reg::EAX))];
        add_reg_reg: [0x66, 0x01, 0xC1] => Add, Word, vec![r(Reg::AX), r(Reg::CX)];
        or_acc_imm: [0x66, 0x0D, 0x00, 0x34] => Or, Word, vec![c(0x3400), r(Reg::AX)];
        sub_rm_imm: [0x80, 0xE9, 0x05] => Sub, Byte, vec![c(5), r(Reg::CL)];
        cmp_sign_extended: [0x83, 0xF8, 0xFF] => Cmp, Long, vec![c(0xFFFF_FFFF), r(Reg::EAX)];
        xor_load: [0x66, 0x33, 0x03] => Xor, Word, vec![m(Indirect::base(Reg::EBX)), r(Reg::AX)];
        not_sib: [0xF7, 0x14, 0xBE] => Not, Long, vec![m(Indirect {
            base: Some(Reg::ESI),
            offset: 0,
            index: Some(Reg::EDI),
            scale: Scale::S4,
        })];
        esp_base: [0xFF, 0x34, 0x24] => Push, Long, vec![m(Indirect::base(Reg::ESP))];
        disp8: [0x8B, 0x45, 0xFC] => Mov, Long, vec![m(Indirect {
            base: Some(Reg::EBP),
            offset: -4,
            ..Default::default()
        }), r(Reg::EAX)];
        absolute: [0x8B, 0x05, 0x10, 0x00, 0x00, 0x00] => Mov, Long, vec![m(Indirect {
            offset: 0x10,
            ..Default::default()
        }), r(Reg::EAX)];
        inc_word: [0x66, 0x43] => Inc, Word, vec![r(Reg::BX)];
        dec_byte: [0xFE, 0xC9] => Dec, Byte, vec![r(Reg::CL)];
        shl_one: [0xD1, 0xE0] => Shl, Long, vec![c(1), r(Reg::EAX)];
        sar_cl: [0x66, 0xD3, 0xF8] => Sar, Word, vec![r(Reg::CL), r(Reg::AX)];
        rol_imm: [0xC0, 0xC0, 0x03] => Rol, Byte, vec![c(3), r(Reg::AL)];
        push_imm8: [0x6A, 0xFE] => Push, Long, vec![c(0xFFFF_FFFE)];
        pop_word: [0x66, 0x5B] => Pop, Word, vec![r(Reg::BX)];
        pushf_word: [0x66, 0x9C] => Pushf, Word, vec![];
        pushad: [0x60] => Pusha, Long, vec![];
        lahf: [0x9F] => Lahf, Long, vec![];
        test_acc: [0xA8, 0x01] => Test, Byte, vec![c(1), r(Reg::AL)];
        idiv: [0xF6, 0xFB] => Idiv, Byte, vec![r(Reg::BL)];
        lea: [0x8D, 0x04, 0x58] => Lea, Long, vec![m(Indirect {
            base: Some(Reg::EAX),
            offset: 0,
            index: Some(Reg::EBX),
            scale: Scale::S2,
        }), r(Reg::EAX)];
    }

    #[test]
    fn branch_targets_are_absolute() {
        let jnz = decode(&[0x0F, 0x85, 0xF5, 0xFF, 0xFF, 0xFF], 12).unwrap().unwrap();
        assert_eq!(jnz.mnemonic, Jne);
        assert_eq!(jnz.operands, vec![c(7)]);
        let call = decode(&[0xE8, 0x05, 0x00, 0x00, 0x00], 9).unwrap().unwrap();
        assert_eq!(call.operands, vec![c(19)]);
        let short = decode(&[0xEB, 0xFE], 4).unwrap().unwrap();
        assert_eq!((short.mnemonic, short.operands), (Jmp, vec![c(4)]));
        let jl = decode(&[0x7C, 0x02], 0).unwrap().unwrap();
        assert_eq!((jl.mnemonic, jl.operands), (Jl, vec![c(4)]));
    }

    #[test]
    fn truncated_window() {
        assert_eq!(decode(&[], 0), Ok(None));
        assert_eq!(decode(&[0x66], 0), Ok(None));
        assert_eq!(decode(&[0x66, 0xB8, 0x20], 0), Ok(None));
        assert_eq!(decode(&[0x0F, 0x85, 0xF5], 0), Ok(None));
    }

    #[test]
    fn unsupported() {
        assert_eq!(
            decode(&[0x0F, 0x05], 0),
            Err(RuntimeError::InstructionNotSupported("0F 05".into()))
        );
        assert!(decode(&[0xCC], 0).is_err());
        assert!(decode(&[0xF6, 0xC8], 0).is_err());
        assert!(decode(&[0x8D, 0xC0], 0).is_err());
    }

    #[test]
    fn display() {
        let decoded = decode(&[0x66, 0x01, 0xC1], 0).unwrap().unwrap();
        assert_eq!(decoded.to_string(), "add %ax, %cx");
        assert_eq!(decode(&[0xC3], 0).unwrap().unwrap().to_string(), "ret");
    }
}
