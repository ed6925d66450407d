use arch::{
    bits::{fits_unsigned, imm_bytes},
    size::OperandSize,
};
use color_print::cformat;
use std::fmt;

use crate::{
    error::{Error, Result},
    inst::Encode,
    label::Layout,
};

/// `.byte`, `.value`/`.word` and `.long`: raw little-endian data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub width: OperandSize,
    pub values: Vec<i64>,
}

impl Directive {
    pub fn new(name: &str, values: &[i64]) -> Result<Self> {
        let width = match name {
            ".byte" => OperandSize::Byte,
            ".value" | ".word" => OperandSize::Word,
            ".long" => OperandSize::Long,
            _ => return Err(Error::directive(name)),
        };
        let directive = Directive {
            name: name.to_string(),
            width,
            values: values.to_vec(),
        };
        directive.validate()?;
        Ok(directive)
    }

    pub fn cformat(&self) -> String {
        let values: Vec<String> = self.values.iter().map(|v| format!("{v:#x}")).collect();
        cformat!("<m>{:<7}</><y>{}</>", self.name, values.join(", "))
    }
}

impl Encode for Directive {
    fn validate(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(Error::assertion(format!(
                "`{}` needs at least one expression",
                self.name
            )));
        }
        match self.values.iter().find(|v| !fits_unsigned(**v, self.width)) {
            Some(v) => Err(Error::operand_size(format!(
                "`{}` value {} does not fit in {} byte(s)",
                self.name,
                v,
                self.width.bytes()
            ))),
            None => Ok(()),
        }
    }

    fn encoded_length(&self) -> Result<usize> {
        Ok(self.width.bytes() * self.values.len())
    }

    fn encode(&self, _layout: &Layout, _index: usize) -> Result<Vec<u8>> {
        Ok(self
            .values
            .iter()
            .flat_map(|v| imm_bytes(*v, self.width))
            .collect())
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(|v| format!("{v:#x}")).collect();
        write!(f, "{} {}", self.name, values.join(", "))
    }
}
