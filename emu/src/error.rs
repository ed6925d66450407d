use thiserror::Error;

/// Failure of a single execution step. The emulator stops on any of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("LowMemoryError: {0}")]
    LowMemory(String),

    #[error("IllegalMemoryAccessError: Illegal memory access at address {address} for length {length}.")]
    IllegalMemoryAccess { address: u64, length: usize },

    #[error("InstructionNotSupportedError: Instruction {0} not yet supported.")]
    InstructionNotSupported(String),

    #[error("DivideError: {0}")]
    Divide(String),

    #[error("AssertionError: {0}")]
    Assertion(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

impl RuntimeError {
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::LowMemory(_) => "LowMemoryError",
            RuntimeError::IllegalMemoryAccess { .. } => "IllegalMemoryAccessError",
            RuntimeError::InstructionNotSupported(_) => "InstructionNotSupportedError",
            RuntimeError::Divide(_) => "DivideError",
            RuntimeError::Assertion(_) => "AssertionError",
        }
    }
}
