use arch::size::OperandSize;
use std::ops::Range;

use crate::error::{Result, RuntimeError};

/// Byte-addressable little-endian memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Memory {
            bytes: vec![0; size],
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    fn range(&self, address: u32, length: usize) -> Result<Range<usize>> {
        let start = address as usize;
        match start.checked_add(length) {
            Some(end) if end <= self.bytes.len() => Ok(start..end),
            _ => Err(RuntimeError::IllegalMemoryAccess {
                address: address as u64,
                length,
            }),
        }
    }

    pub fn read(&self, address: u32, size: OperandSize) -> Result<u32> {
        let range = self.range(address, size.bytes())?;
        Ok(self.bytes[range]
            .iter()
            .rev()
            .fold(0u32, |acc, b| (acc << 8) | *b as u32))
    }

    pub fn write(&mut self, address: u32, size: OperandSize, value: u32) -> Result<()> {
        let range = self.range(address, size.bytes())?;
        self.bytes[range].copy_from_slice(&value.to_le_bytes()[..size.bytes()]);
        Ok(())
    }

    pub fn load(&mut self, address: u32, data: &[u8]) -> Result<()> {
        let range = self.range(address, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    /// Up to `max` bytes starting at `address`, clipped at the end of memory.
    pub fn window(&self, address: u32, max: usize) -> &[u8] {
        let start = (address as usize).min(self.bytes.len());
        let end = start.saturating_add(max).min(self.bytes.len());
        &self.bytes[start..end]
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn hex_bytes(&self) -> Vec<String> {
        self.bytes.iter().map(|b| format!("{:02X}", b)).collect()
    }
}
