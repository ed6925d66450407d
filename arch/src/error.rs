use thiserror::Error;

use crate::reg::Reg;

/// Failures while building ModRM/SIB bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Displacement `{0}` is not supported, only zero offsets can be encoded")]
    Displacement(i64),

    #[error("Memory operand requires a base register")]
    MissingBase,

    #[error("`%{0}` cannot be used in an address, only 32-bit registers can")]
    AddressRegister(Reg),

    #[error("`%esp` cannot be used as an index register")]
    EspIndex,

    #[error("`(%ebp)` needs a displacement byte")]
    EbpBase,

    #[error("A {0} operand cannot be encoded in the r/m field")]
    NotRm(&'static str),
}
