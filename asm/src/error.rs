use arch::error::EncodeError;
use color_print::cprintln;
use serde::Serialize;
use strum::Display;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum ErrorKind {
    SyntaxError,
    InvalidOperator,
    InvalidDirective,
    InvalidRegister,
    InvalidOperandType,
    InvalidOperandSize,
    InvalidLabel,
    AssertionError,
}

/// Assembly-time failure. Renders as `Line N, Kind: message`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{kind}: {message}", line_prefix(.line))]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub line: Option<usize>,
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|l| format!("Line {l}, ")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
            line: None,
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }

    pub fn operator(operator: &str) -> Self {
        Self::new(
            ErrorKind::InvalidOperator,
            format!("Unknown operator `{operator}`"),
        )
    }

    pub fn directive(name: &str) -> Self {
        Self::new(
            ErrorKind::InvalidDirective,
            format!("Unknown directive `{name}`"),
        )
    }

    pub fn register(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRegister, message)
    }

    pub fn operand_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOperandType, message)
    }

    pub fn operand_size(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOperandSize, message)
    }

    pub fn label(name: &str) -> Self {
        Self::new(ErrorKind::InvalidLabel, format!("Undefined label `{name}`"))
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AssertionError, message)
    }

    /// Attaches the source line unless one is already set.
    pub fn at(mut self, line: usize) -> Self {
        self.line.get_or_insert(line);
        self
    }

    /// Print error with the offending source line
    pub fn print_diag(&self, file: &str, source: &str) {
        cprintln!("<red,bold>error</>: {}: {}", self.kind, self.message);
        if let Some(line) = self.line {
            let content = line
                .checked_sub(1)
                .and_then(|idx| source.lines().nth(idx))
                .unwrap_or("");
            cprintln!("     <blue>--></> <underline>{}:{}</>", file, line);
            cprintln!("      <blue>|</>");
            cprintln!(" <blue>{:>4} |</> {}", line, content);
            cprintln!("      <blue>|</>");
        }
    }
}

impl From<EncodeError> for Error {
    fn from(err: EncodeError) -> Self {
        Error::assertion(err.to_string())
    }
}
