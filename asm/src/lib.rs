pub mod directive;
pub mod error;
pub mod inst;
pub mod label;
pub mod msg;
pub mod parser;
pub mod program;
pub mod table;

pub use error::{Error, ErrorKind};
pub use program::{assemble, AssembledProgram};
