use color_print::cformat;
use std::fmt;

use crate::{reg::Reg, size::Scale};

// ----------------------------------------------------------------------------
// Operand

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Reg),
    Constant(i64),
    Indirect(Indirect),
    Label(String),
}

/// `offset(%base,%index,scale)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indirect {
    pub base: Option<Reg>,
    pub offset: i64,
    pub index: Option<Reg>,
    pub scale: Scale,
}

impl Indirect {
    pub fn base(base: Reg) -> Self {
        Indirect {
            base: Some(base),
            ..Default::default()
        }
    }
}

impl Operand {
    pub fn reg(&self) -> Option<Reg> {
        match self {
            Operand::Register(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_register(&self) -> bool {
        matches!(self, Operand::Register(_))
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Operand::Indirect(_))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Operand::Constant(_))
    }

    /// Register or memory: anything that can sit in the ModRM r/m field.
    pub fn is_rm(&self) -> bool {
        self.is_register() || self.is_memory()
    }

    pub fn is_accumulator(&self) -> bool {
        self.reg().map_or(false, Reg::is_accumulator)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Register(_) => "register",
            Operand::Constant(_) => "constant",
            Operand::Indirect(_) => "memory",
            Operand::Label(_) => "label",
        }
    }

    pub fn cformat(&self) -> String {
        match self {
            Operand::Register(_) => cformat!("<b>{}</>", self),
            Operand::Constant(_) => cformat!("<y>{}</>", self),
            Operand::Indirect(_) => cformat!("<c>{}</>", self),
            Operand::Label(_) => cformat!("<g>{}</>", self),
        }
    }
}

fn hex(n: i64) -> String {
    if n < 0 {
        format!("-0x{:x}", n.unsigned_abs())
    } else {
        format!("0x{:x}", n)
    }
}

impl fmt::Display for Indirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.offset != 0 || (self.base.is_none() && self.index.is_none()) {
            write!(f, "{}", hex(self.offset))?;
        }
        if self.base.is_none() && self.index.is_none() {
            return Ok(());
        }
        write!(f, "(")?;
        if let Some(base) = self.base {
            write!(f, "%{}", base)?;
        }
        if let Some(index) = self.index {
            write!(f, ",%{},{}", index, self.scale.factor())?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "%{}", r),
            Operand::Constant(n) => write!(f, "${}", hex(*n)),
            Operand::Indirect(ind) => write!(f, "{}", ind),
            Operand::Label(name) => write!(f, "{}", name),
        }
    }
}
