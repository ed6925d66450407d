use color_print::cprintln;

/// Non-fatal diagnostic collected while assembling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Warn(String),
    Note(String),
}

impl Msg {
    pub fn diag(&self, file: &str, line: usize, source: &str) {
        match self {
            Msg::Warn(msg) => cprintln!("<yellow,bold>warn</>: {}", msg),
            Msg::Note(msg) => cprintln!("<green,bold>note</>: {}", msg),
        }
        let raw = line
            .checked_sub(1)
            .and_then(|idx| source.lines().nth(idx))
            .unwrap_or("");
        cprintln!("     <blue>--></> <underline>{}:{}</>", file, line);
        cprintln!("      <blue>|</>");
        cprintln!(" <blue>{:>4} |</> {}", line, raw);
        cprintln!("      <blue>|</>");
    }
}
