use arch::reg::Reg;

/// One 32-bit cell per physical register; narrower views mask and shift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    gpr: [u32; 8],
    pub eip: u32,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reg: Reg) -> u32 {
        let (slot, shift) = reg.slot();
        (self.gpr[slot] >> shift) & reg.size().mask()
    }

    /// Writes through the view `reg`; bits outside it are preserved.
    pub fn set(&mut self, reg: Reg, value: u32) {
        let (slot, shift) = reg.slot();
        let mask = reg.size().mask() << shift;
        self.gpr[slot] = (self.gpr[slot] & !mask) | ((value << shift) & mask);
    }

    /// Big-endian hex bytes, e.g. `00 00 FF FF`.
    pub fn hex(&self, reg: Reg) -> String {
        hex_bytes(&self.get(reg).to_be_bytes()[4 - reg.size().bytes()..])
    }

    pub fn eip_hex(&self) -> String {
        hex_bytes(&self.eip.to_be_bytes())
    }
}

fn hex_bytes(bytes: &[u8]) -> String {
    let hex: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
    hex.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_write_keeps_high_byte() {
        let mut regs = RegisterFile::new();
        regs.set(Reg::AX, 0xABCD);
        regs.set(Reg::AL, 0x12);
        assert_eq!(regs.get(Reg::AX), 0xAB12);
        regs.set(Reg::AH, 0x34);
        assert_eq!(regs.get(Reg::AX), 0x3412);
        assert_eq!(regs.get(Reg::AL), 0x12);
    }

    #[test]
    fn long_write_shows_through_views() {
        let mut regs = RegisterFile::new();
        regs.set(Reg::EBX, 0xDEADBEEF);
        assert_eq!(regs.get(Reg::BL), 0xEF);
        assert_eq!(regs.get(Reg::BH), 0xBE);
        assert_eq!(regs.get(Reg::BX), 0xBEEF);
        regs.set(Reg::BX, 0x1234);
        assert_eq!(regs.get(Reg::EBX), 0xDEAD1234);
    }

    #[test]
    fn views_are_masked() {
        let mut regs = RegisterFile::new();
        regs.set(Reg::CL, 0x1FF);
        assert_eq!(regs.get(Reg::ECX), 0xFF);
        regs.set(Reg::SI, 0xFFFF_0001);
        assert_eq!(regs.get(Reg::ESI), 0x0001);
    }

    #[test]
    fn hex_strings() {
        let mut regs = RegisterFile::new();
        regs.set(Reg::EAX, 0xFFFF);
        assert_eq!(regs.hex(Reg::EAX), "00 00 FF FF");
        assert_eq!(regs.hex(Reg::AH), "FF");
        regs.eip = 0x10;
        assert_eq!(regs.eip_hex(), "00 00 00 10");
    }
}
