mod binary;
mod branch;
mod fixed;
mod group3;
mod incdec;
mod mov;
mod shift;
mod stack;

use arch::{
    mnemonic::Mnemonic,
    operand::{Indirect, Operand},
    reg::Reg,
    size::{OperandSize, Scale},
};
use color_print::cformat;
use std::{fmt, ops::RangeInclusive};

use crate::{
    error::{Error, Result},
    label::Layout,
    parser::RawOperand,
    table,
};

pub const OPERAND_SIZE_OVERRIDE: u8 = 0x66;

/// Validation, length prediction and byte emission for one statement kind.
/// `encoded_length` must always equal the length of what `encode` returns.
pub trait Encode {
    fn validate(&self) -> Result<()>;
    fn encoded_length(&self) -> Result<usize>;
    fn encode(&self, layout: &Layout, index: usize) -> Result<Vec<u8>>;
}

// ----------------------------------------------------------------------------
// Instruction

/// Encoder family an instruction belongs to, with its opcode extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Mov,
    Lea,
    Push,
    Pop,
    Fixed,
    Binary(u8),
    Test,
    Group3(u8),
    IncDec(u8),
    Shift(u8),
    Branch,
}

impl Form {
    fn of(m: Mnemonic) -> Self {
        use Mnemonic::*;
        match m {
            Mov => Form::Mov,
            Lea => Form::Lea,
            Push => Form::Push,
            Pop => Form::Pop,
            Test => Form::Test,
            Inc => Form::IncDec(0),
            Dec => Form::IncDec(1),
            Jmp | Call => Form::Branch,
            m => {
                if let Some(ext) = m.alu_ext() {
                    Form::Binary(ext)
                } else if let Some(ext) = m.group3_ext() {
                    Form::Group3(ext)
                } else if let Some(ext) = m.shift_ext() {
                    Form::Shift(ext)
                } else if m.cond().is_some() {
                    Form::Branch
                } else {
                    Form::Fixed
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Operator as written, e.g. `notw` or `jnz`.
    pub operator: String,
    pub mnemonic: Mnemonic,
    /// AT&T order: source first, destination last.
    pub operands: Vec<Operand>,
    pub size: OperandSize,
    form: Form,
}

impl Instruction {
    pub fn new(operator: &str, raw: &[RawOperand]) -> Result<Self> {
        let (mnemonic, implied) = table::lookup(operator).ok_or_else(|| Error::operator(operator))?;
        let operands = raw.iter().map(operand).collect::<Result<Vec<_>>>()?;
        let size = infer_size(operator, mnemonic, &operands, implied)?;
        let inst = Instruction {
            operator: operator.to_string(),
            mnemonic,
            operands,
            size,
            form: Form::of(mnemonic),
        };
        inst.validate()?;
        Ok(inst)
    }

    pub fn form(&self) -> Form {
        self.form
    }

    pub fn cformat(&self) -> String {
        let operands: Vec<String> = self.operands.iter().map(Operand::cformat).collect();
        cformat!("<r>{:<7}</>{}", self.operator, operands.join(", "))
    }

    // ------------------------------------------------------------------------
    // Helpers shared by the encoder families

    fn expect_arity(&self, range: RangeInclusive<usize>) -> Result<()> {
        if range.contains(&self.operands.len()) {
            return Ok(());
        }
        let expected = match range.start() == range.end() {
            true => range.start().to_string(),
            false => format!("{} to {}", range.start(), range.end()),
        };
        Err(Error::assertion(format!(
            "`{}` expects {} operand(s), found {}",
            self.operator,
            expected,
            self.operands.len()
        )))
    }

    fn src(&self) -> Result<&Operand> {
        self.operands
            .first()
            .ok_or_else(|| Error::assertion(format!("`{}` is missing an operand", self.operator)))
    }

    fn dst(&self) -> Result<&Operand> {
        self.operands
            .last()
            .ok_or_else(|| Error::assertion(format!("`{}` is missing an operand", self.operator)))
    }

    fn reject(&self, op: &Operand) -> Error {
        Error::operand_type(format!(
            "`{}` does not accept the {} operand `{}`",
            self.operator,
            op.kind(),
            op
        ))
    }

    fn mem_to_mem(&self) -> Error {
        Error::operand_type(format!(
            "`{}` cannot take two memory operands",
            self.operator
        ))
    }

    fn at_least_word(&self) -> Result<()> {
        match self.size {
            OperandSize::Byte => Err(Error::operand_size(format!(
                "`{}` cannot operate on a single byte",
                self.operator
            ))),
            _ => Ok(()),
        }
    }

    fn prefix(&self) -> Vec<u8> {
        match self.size {
            OperandSize::Word => vec![OPERAND_SIZE_OVERRIDE],
            _ => vec![],
        }
    }

    fn prefix_len(&self) -> usize {
        self.prefix().len()
    }

    /// Opcode bit selecting the 16/32-bit variant over the 8-bit one.
    fn wide(&self) -> u8 {
        match self.size {
            OperandSize::Byte => 0,
            _ => 1,
        }
    }
}

impl Encode for Instruction {
    fn validate(&self) -> Result<()> {
        match self.form {
            Form::Mov => mov::validate(self),
            Form::Lea => mov::validate_lea(self),
            Form::Push => stack::validate_push(self),
            Form::Pop => stack::validate_pop(self),
            Form::Fixed => fixed::validate(self),
            Form::Binary(_) => binary::validate(self),
            Form::Test => test::validate(self),
            Form::Group3(_) => group3::validate(self),
            Form::IncDec(_) => incdec::validate(self),
            Form::Shift(_) => shift::validate(self),
            Form::Branch => branch::validate(self),
        }
    }

    fn encoded_length(&self) -> Result<usize> {
        match self.form {
            Form::Mov => mov::length(self),
            Form::Lea => mov::length_lea(self),
            Form::Push => stack::length_push(self),
            Form::Pop => stack::length_pop(self),
            Form::Fixed => fixed::length(self),
            Form::Binary(_) => binary::length(self),
            Form::Test => test::length(self),
            Form::Group3(_) => group3::length(self),
            Form::IncDec(_) => incdec::length(self),
            Form::Shift(_) => shift::length(self),
            Form::Branch => branch::length(self),
        }
    }

    fn encode(&self, layout: &Layout, index: usize) -> Result<Vec<u8>> {
        match self.form {
            Form::Mov => mov::encode(self),
            Form::Lea => mov::encode_lea(self),
            Form::Push => stack::encode_push(self),
            Form::Pop => stack::encode_pop(self),
            Form::Fixed => fixed::encode(self),
            Form::Binary(ext) => binary::encode(self, ext),
            Form::Test => test::encode(self),
            Form::Group3(ext) => group3::encode(self, ext),
            Form::IncDec(ext) => incdec::encode(self, ext),
            Form::Shift(ext) => shift::encode(self, ext),
            Form::Branch => branch::encode(self, layout, index),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands: Vec<String> = self.operands.iter().map(|o| o.to_string()).collect();
        match operands.is_empty() {
            true => write!(f, "{}", self.operator),
            false => write!(f, "{} {}", self.operator, operands.join(", ")),
        }
    }
}

// ----------------------------------------------------------------------------
// Operand conversion & size inference

fn register(name: &str) -> Result<Reg> {
    Reg::parse(name).map_err(Error::register)
}

fn address_register(name: &str) -> Result<Reg> {
    let reg = register(name)?;
    match reg.size() {
        OperandSize::Long => Ok(reg),
        _ => Err(Error::register(format!(
            "`%{reg}` cannot be used in an address, only 32-bit registers can"
        ))),
    }
}

fn operand(raw: &RawOperand) -> Result<Operand> {
    match raw {
        RawOperand::Register(name) => register(name).map(Operand::Register),
        RawOperand::Constant(n) => Ok(Operand::Constant(*n)),
        RawOperand::Label(name) => Ok(Operand::Label(name.clone())),
        RawOperand::Indirect {
            base,
            offset,
            index,
            scale,
        } => {
            let base = base.as_deref().map(address_register).transpose()?;
            let index = index.as_deref().map(address_register).transpose()?;
            if base.is_none() && index.is_none() {
                return Err(Error::operand_type(format!(
                    "Memory operand `{offset:#x}` needs a base or index register"
                )));
            }
            let scale = match scale {
                None => Scale::S1,
                Some(n) => u8::try_from(*n)
                    .ok()
                    .and_then(|n| Scale::try_from(n).ok())
                    .ok_or_else(|| {
                        Error::operand_type(format!("Scale must be 1, 2, 4 or 8, found {n}"))
                    })?,
            };
            Ok(Operand::Indirect(Indirect {
                base,
                offset: *offset,
                index,
                scale,
            }))
        }
    }
}

/// Register operands decide the size and must agree with each other and with
/// any size the operator spelling implies. Shift counters (`%cl`) are ignored.
fn infer_size(
    operator: &str,
    mnemonic: Mnemonic,
    operands: &[Operand],
    implied: Option<OperandSize>,
) -> Result<OperandSize> {
    let sized = match mnemonic.is_shift() && operands.len() == 2 {
        true => &operands[1..],
        false => operands,
    };
    let mut found: Option<Reg> = None;
    for reg in sized.iter().filter_map(Operand::reg) {
        match found {
            Some(prev) if prev.size() != reg.size() => {
                return Err(Error::operand_size(format!(
                    "Operand size mismatch in `{operator}`: `%{prev}` and `%{reg}`"
                )))
            }
            _ => found = Some(reg),
        }
    }
    match (found, implied) {
        (Some(reg), Some(size)) if reg.size() != size => Err(Error::operand_size(format!(
            "`{operator}` operates on {} byte(s) but `%{reg}` is {} byte(s)",
            size.bytes(),
            reg.size().bytes()
        ))),
        (Some(reg), _) => Ok(reg.size()),
        (None, Some(size)) => Ok(size),
        (None, None) => Ok(OperandSize::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, parser};

    fn build(src: &str) -> Result<Instruction> {
        let parsed = parser::parse(src)?;
        match &parsed.statements[0].body {
            parser::Body::Instruction { operator, operands } => Instruction::new(operator, operands),
            parser::Body::Directive { .. } => panic!("expected instruction"),
        }
    }

    #[test]
    fn size_from_register() {
        assert_eq!(build("mov %bx,%ax").unwrap().size, OperandSize::Word);
        assert_eq!(build("add $1,%al").unwrap().size, OperandSize::Byte);
        assert_eq!(build("not (%edx)").unwrap().size, OperandSize::Long);
    }

    #[test]
    fn size_from_suffix() {
        assert_eq!(build("notw (%esi,%edi,4)").unwrap().size, OperandSize::Word);
        assert_eq!(build("movb $1,(%eax)").unwrap().size, OperandSize::Byte);
        assert_eq!(build("pushf").unwrap().size, OperandSize::Word);
    }

    #[test]
    fn shift_counter_does_not_size() {
        assert_eq!(build("shl %cl,%eax").unwrap().size, OperandSize::Long);
    }

    #[test]
    fn mismatches() {
        let err = build("mov %al,%bx").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidOperandSize);
        let err = build("movw %eax,%ebx").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidOperandSize);
    }

    #[test]
    fn operand_errors() {
        assert_eq!(build("mov %eax,%xyz").unwrap_err().kind, ErrorKind::InvalidRegister);
        assert_eq!(build("mov %eax,(%ax)").unwrap_err().kind, ErrorKind::InvalidRegister);
        assert_eq!(build("frob %eax").unwrap_err().kind, ErrorKind::InvalidOperator);
        assert_eq!(
            build("mov %eax,(%ebx,%ecx,3)").unwrap_err().kind,
            ErrorKind::InvalidOperandType
        );
        assert_eq!(build("mov %eax,0x10").unwrap_err().kind, ErrorKind::InvalidOperandType);
    }

    #[test]
    fn display() {
        let inst = build("mov $0x12,%al").unwrap();
        assert_eq!(inst.to_string(), "mov $0x12, %al");
        assert_eq!(build("ret").unwrap().to_string(), "ret");
    }
}
