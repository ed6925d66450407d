pub mod bits;
pub mod error;
pub mod mnemonic;
pub mod modrm;
pub mod operand;
pub mod reg;
pub mod size;
