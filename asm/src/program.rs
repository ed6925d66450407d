use color_print::cformat;
use indexmap::IndexMap;
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

use crate::{
    directive::Directive,
    error::{Error, Result},
    inst::{Encode, Instruction},
    label::Layout,
    msg::Msg,
    parser::{self, Body},
};

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Instruction(Instruction),
    Directive(Directive),
}

impl Statement {
    pub fn build(body: &Body) -> Result<Self> {
        match body {
            Body::Instruction { operator, operands } => {
                Instruction::new(operator, operands).map(Statement::Instruction)
            }
            Body::Directive { name, args } => Directive::new(name, args).map(Statement::Directive),
        }
    }

    fn encoder(&self) -> &dyn Encode {
        match self {
            Statement::Instruction(inst) => inst,
            Statement::Directive(dir) => dir,
        }
    }

    pub fn operator(&self) -> &str {
        match self {
            Statement::Instruction(inst) => &inst.operator,
            Statement::Directive(dir) => &dir.name,
        }
    }

    pub fn operands(&self) -> Vec<String> {
        match self {
            Statement::Instruction(inst) => inst.operands.iter().map(|o| o.to_string()).collect(),
            Statement::Directive(dir) => dir.values.iter().map(|v| format!("{v:#x}")).collect(),
        }
    }

    pub fn cformat(&self) -> String {
        match self {
            Statement::Instruction(inst) => inst.cformat(),
            Statement::Directive(dir) => dir.cformat(),
        }
    }
}

impl Encode for Statement {
    fn validate(&self) -> Result<()> {
        self.encoder().validate()
    }

    fn encoded_length(&self) -> Result<usize> {
        self.encoder().encoded_length()
    }

    fn encode(&self, layout: &Layout, index: usize) -> Result<Vec<u8>> {
        self.encoder().encode(layout, index)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Instruction(inst) => write!(f, "{}", inst),
            Statement::Directive(dir) => write!(f, "{}", dir),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub statement: Statement,
    /// 1-based source line.
    pub line: usize,
    pub machine_code: Vec<u8>,
}

// ----------------------------------------------------------------------------
// Output forms

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub address: String,
    pub label: String,
    pub machine_code: String,
    pub operator: String,
    pub operands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub program: String,
    pub line_nums: Vec<usize>,
    pub symbol_table: IndexMap<String, usize>,
    pub reverse_symbol_table: BTreeMap<usize, String>,
    pub instruction_start_addr: Vec<u32>,
    pub instruction_lengths: Vec<usize>,
    pub addr_instruction_map: BTreeMap<u32, usize>,
}

fn hex_bytes(bytes: &[u8]) -> String {
    let hex: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
    hex.join(" ")
}

// ----------------------------------------------------------------------------
// Assembled program

#[derive(Debug, Clone)]
pub struct AssembledProgram {
    program: String,
    entries: Vec<Entry>,
    layout: Layout,
    reverse_symbols: BTreeMap<usize, String>,
    warnings: Vec<(Msg, usize)>,
}

pub fn assemble(text: &str) -> Result<AssembledProgram> {
    AssembledProgram::assemble(text)
}

impl AssembledProgram {
    pub fn assemble(text: &str) -> Result<Self> {
        // 1. Parse
        let parsed = parser::parse(text)?;

        // 2. Build statements and collect labels
        let mut entries: Vec<Entry> = vec![];
        let mut layout = Layout::new();
        let mut label_lines: IndexMap<String, usize> = IndexMap::new();
        let mut warnings = vec![];
        let mut define = |name: &str, index: usize, line: usize, layout: &mut Layout| {
            if layout.define(name, index).is_some() {
                warnings.push((Msg::Warn(format!("Re-defined label `{name}`")), line));
                if let Some(prev) = label_lines.get(name) {
                    warnings.push((
                        Msg::Note("Already defined here, the later definition wins".into()),
                        *prev,
                    ));
                }
            }
            label_lines.insert(name.to_string(), line);
        };
        for raw in &parsed.statements {
            let statement = Statement::build(&raw.body).map_err(|e| e.at(raw.line))?;
            for label in &raw.labels {
                define(label, entries.len(), raw.line, &mut layout);
            }
            entries.push(Entry {
                statement,
                line: raw.line,
                machine_code: vec![],
            });
        }
        for (label, line) in &parsed.trailing {
            define(label, entries.len(), *line, &mut layout);
        }

        // 3. Resolve lengths and start addresses
        for entry in &entries {
            let len = entry
                .statement
                .encoded_length()
                .map_err(|e| e.at(entry.line))?;
            layout.push(len);
        }

        // 4. Generate machine code
        for (index, entry) in entries.iter_mut().enumerate() {
            let code = entry
                .statement
                .encode(&layout, index)
                .map_err(|e| e.at(entry.line))?;
            if code.len() != layout.lengths()[index] {
                return Err(Error::assertion(format!(
                    "`{}` encoded to {} byte(s) but {} were reserved",
                    entry.statement,
                    code.len(),
                    layout.lengths()[index]
                ))
                .at(entry.line));
            }
            entry.machine_code = code;
        }

        let reverse_symbols = layout
            .symbols()
            .iter()
            .map(|(name, index)| (*index, name.clone()))
            .collect();

        Ok(AssembledProgram {
            program: text.to_string(),
            entries,
            layout,
            reverse_symbols,
            warnings,
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn machine_code(&self) -> Vec<u8> {
        self.entries
            .iter()
            .flat_map(|e| e.machine_code.iter().copied())
            .collect()
    }

    pub fn symbol_table(&self) -> &IndexMap<String, usize> {
        self.layout.symbols()
    }

    pub fn reverse_symbol_table(&self) -> &BTreeMap<usize, String> {
        &self.reverse_symbols
    }

    pub fn instruction_start_addr(&self) -> &[u32] {
        self.layout.start_addr()
    }

    pub fn instruction_lengths(&self) -> &[usize] {
        self.layout.lengths()
    }

    pub fn index_at(&self, addr: u32) -> Option<usize> {
        self.layout.index_at(addr)
    }

    /// Source line of the statement starting at `addr`.
    pub fn line_at(&self, addr: u32) -> Option<usize> {
        self.index_at(addr).map(|i| self.entries[i].line)
    }

    /// Offset of the `start` (or `_start`) label, else 0.
    pub fn entry_point(&self) -> u32 {
        ["start", "_start"]
            .iter()
            .find_map(|name| self.layout.resolve(name).ok())
            .unwrap_or(0)
    }

    pub fn warnings(&self) -> &[(Msg, usize)] {
        &self.warnings
    }

    pub fn line_nums(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.line).collect()
    }

    pub fn table(&self) -> Vec<Row> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| Row {
                address: format!("{:x}", self.layout.address_of(i)),
                label: self.reverse_symbols.get(&i).cloned().unwrap_or_default(),
                machine_code: hex_bytes(&entry.machine_code),
                operator: entry.statement.operator().to_string(),
                operands: entry.statement.operands(),
            })
            .collect()
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            program: self.program.clone(),
            line_nums: self.line_nums(),
            symbol_table: self.layout.symbols().clone(),
            reverse_symbol_table: self.reverse_symbols.clone(),
            instruction_start_addr: self.layout.start_addr().to_vec(),
            instruction_lengths: self.layout.lengths().to_vec(),
            addr_instruction_map: self
                .layout
                .addr_index()
                .iter()
                .map(|(addr, index)| (*addr, *index))
                .collect(),
        }
    }

    /// Colored listing row for statement `index`.
    pub fn cformat_row(&self, index: usize) -> String {
        let entry = &self.entries[index];
        let label = match self.reverse_symbols.get(&index) {
            Some(name) => cformat!("<g>{}:</> ", name),
            None => String::new(),
        };
        format!(
            "[{:08X}] {:<24}| {:>4}: {}{}",
            self.layout.address_of(index),
            hex_bytes(&entry.machine_code),
            entry.line,
            label,
            entry.statement.cformat()
        )
    }
}

impl fmt::Display for AssembledProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Addr\t\t\tMachine Code\t\t\tAssembly")?;
        writeln!(f, "{}", "-".repeat(80))?;
        for (i, entry) in self.entries.iter().enumerate() {
            let label = match self.reverse_symbols.get(&i) {
                Some(name) => format!("{name}: "),
                None => String::new(),
            };
            writeln!(
                f,
                "{:x}:\t\t\t{:<24}\t{}{}",
                self.layout.address_of(i),
                hex_bytes(&entry.machine_code),
                label,
                entry.statement
            )?;
        }
        Ok(())
    }
}
