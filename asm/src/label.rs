use bimap::BiMap;
use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Symbol table plus the per-statement address layout computed after pass 1.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    symbols: IndexMap<String, usize>,
    start_addr: Vec<u32>,
    lengths: Vec<usize>,
    addr_index: BiMap<u32, usize>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to statement `index`, returning the index it replaced.
    pub fn define(&mut self, name: &str, index: usize) -> Option<usize> {
        self.symbols.insert(name.to_string(), index)
    }

    /// Appends the next statement, placed right after the previous one.
    pub fn push(&mut self, len: usize) {
        let addr = self.end();
        self.addr_index.insert(addr, self.start_addr.len());
        self.start_addr.push(addr);
        self.lengths.push(len);
    }

    /// First address after the last statement.
    pub fn end(&self) -> u32 {
        match (self.start_addr.last(), self.lengths.last()) {
            (Some(addr), Some(len)) => addr + *len as u32,
            _ => 0,
        }
    }

    /// Start address of statement `index`; one past the end for a trailing label.
    pub fn address_of(&self, index: usize) -> u32 {
        self.start_addr
            .get(index)
            .copied()
            .unwrap_or_else(|| self.end())
    }

    pub fn resolve(&self, name: &str) -> Result<u32> {
        match self.symbols.get(name) {
            Some(index) => Ok(self.address_of(*index)),
            None => Err(Error::label(name)),
        }
    }

    pub fn symbols(&self) -> &IndexMap<String, usize> {
        &self.symbols
    }

    pub fn start_addr(&self) -> &[u32] {
        &self.start_addr
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn index_at(&self, addr: u32) -> Option<usize> {
        self.addr_index.get_by_left(&addr).copied()
    }

    pub fn addr_index(&self) -> &BiMap<u32, usize> {
        &self.addr_index
    }
}
