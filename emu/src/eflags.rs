use num_enum::IntoPrimitive;
use strum::{Display, EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Flag {
    Carry = 0,
    Parity = 2,
    Auxiliary = 4,
    Zero = 6,
    Sign = 7,
    Trap = 8,
    Interrupt = 9,
    Direction = 10,
    Overflow = 11,
}

/// EFLAGS with bit 1 reserved as 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EFlags(u32);

const RESERVED: u32 = 1 << 1;

impl Default for EFlags {
    fn default() -> Self {
        EFlags(RESERVED)
    }
}

impl EFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, flag: Flag) -> bool {
        self.0 >> u8::from(flag) & 1 == 1
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        let bit = 1 << u8::from(flag);
        match value {
            true => self.0 |= bit,
            false => self.0 &= !bit,
        }
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Loads every modelled flag from `bits`; unmodelled bits are dropped.
    pub fn set_bits(&mut self, bits: u32) {
        for flag in Flag::iter() {
            self.set(flag, bits >> u8::from(flag) & 1 == 1);
        }
    }

    pub fn values(&self) -> Vec<(Flag, bool)> {
        Flag::iter().map(|f| (f, self.get(f))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_positions() {
        let mut flags = EFlags::new();
        flags.set(Flag::Overflow, true);
        flags.set(Flag::Carry, true);
        assert_eq!(flags.bits(), 1 << 11 | 1 << 1 | 1);
        flags.set(Flag::Carry, false);
        assert!(!flags.get(Flag::Carry));
        assert!(flags.get(Flag::Overflow));
    }

    #[test]
    fn load_bits() {
        let mut flags = EFlags::new();
        flags.set_bits(0xFFFF_FFFF);
        assert_eq!(flags.bits(), 0x0FD7);
        flags.set_bits(0);
        assert_eq!(flags.bits(), RESERVED);
    }
}
