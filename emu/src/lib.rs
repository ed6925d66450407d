pub mod cpu;
pub mod decoder;
pub mod eflags;
pub mod error;
pub mod exec;
pub mod memory;
pub mod pc;
pub mod register;

pub use error::RuntimeError;
pub use pc::Pc;
