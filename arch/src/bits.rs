use crate::size::OperandSize;

/// Truncates `n` to an unsigned value of `size` bytes (masking, not saturating).
pub fn get_uint(n: i64, size: OperandSize) -> u32 {
    (n as u32) & size.mask()
}

/// Little-endian immediate bytes of `n` truncated to `size`.
pub fn imm_bytes(n: i64, size: OperandSize) -> Vec<u8> {
    get_uint(n, size).to_le_bytes()[..size.bytes()].to_vec()
}

/// True if `n` survives unsigned truncation to `size` unchanged.
pub fn fits_unsigned(n: i64, size: OperandSize) -> bool {
    n >= 0 && get_uint(n, size) as i64 == n
}

/// Even population count of the low byte.
pub fn parity(v: u32) -> bool {
    (v & 0xFF).count_ones() % 2 == 0
}

pub fn sign(v: u32, size: OperandSize) -> bool {
    v & size.sign_mask() != 0
}

pub fn sign_extend(v: u32, size: OperandSize) -> i64 {
    let shift = 64 - size.bits();
    ((v as i64) << shift) >> shift
}

/// Reads `size` little-endian bytes.
pub fn read_le(bytes: &[u8], size: OperandSize) -> Option<u32> {
    let bytes = bytes.get(..size.bytes())?;
    Some(
        bytes
            .iter()
            .rev()
            .fold(0u32, |acc, b| (acc << 8) | *b as u32),
    )
}
