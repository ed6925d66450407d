use arch::{
    bits::{parity, sign, sign_extend},
    size::OperandSize,
};

use crate::eflags::{EFlags, Flag};

/// Flags produced by one operation. `None` leaves the flag untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Update {
    pub carry: Option<bool>,
    pub parity: Option<bool>,
    pub auxiliary: Option<bool>,
    pub zero: Option<bool>,
    pub sign: Option<bool>,
    pub overflow: Option<bool>,
}

impl Update {
    /// ZF, SF and PF of a truncated result.
    pub fn result(res: u32, size: OperandSize) -> Self {
        let res = res & size.mask();
        Update {
            zero: Some(res == 0),
            sign: Some(sign(res, size)),
            parity: Some(parity(res)),
            ..Default::default()
        }
    }

    pub fn apply(&self, flags: &mut EFlags) {
        let pairs = [
            (Flag::Carry, self.carry),
            (Flag::Parity, self.parity),
            (Flag::Auxiliary, self.auxiliary),
            (Flag::Zero, self.zero),
            (Flag::Sign, self.sign),
            (Flag::Overflow, self.overflow),
        ];
        for (flag, value) in pairs {
            if let Some(v) = value {
                flags.set(flag, v);
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Arithmetic

/// `a + b + carry_in`
pub fn add(a: u32, b: u32, carry_in: bool, size: OperandSize) -> (u32, Update) {
    let full = a as u64 + b as u64 + carry_in as u64;
    let res = full as u32 & size.mask();
    let update = Update {
        carry: Some(full > size.mask() as u64),
        auxiliary: Some((a ^ b ^ res) & 0x10 != 0),
        overflow: Some(sign((a ^ res) & (b ^ res), size)),
        ..Update::result(res, size)
    };
    (res, update)
}

/// `a - b - borrow_in`. CF is the unsigned borrow.
pub fn sub(a: u32, b: u32, borrow_in: bool, size: OperandSize) -> (u32, Update) {
    let res = a.wrapping_sub(b).wrapping_sub(borrow_in as u32) & size.mask();
    let update = Update {
        carry: Some((a as u64) < b as u64 + borrow_in as u64),
        auxiliary: Some((a ^ b ^ res) & 0x10 != 0),
        overflow: Some(sign((a ^ b) & (a ^ res), size)),
        ..Update::result(res, size)
    };
    (res, update)
}

/// `and`, `or`, `xor`, `test`: OF and CF cleared.
pub fn logic(res: u32, size: OperandSize) -> (u32, Update) {
    let res = res & size.mask();
    let update = Update {
        carry: Some(false),
        overflow: Some(false),
        ..Update::result(res, size)
    };
    (res, update)
}

pub fn inc(a: u32, size: OperandSize) -> (u32, Update) {
    let (res, update) = add(a, 1, false, size);
    (res, Update { carry: None, ..update })
}

pub fn dec(a: u32, size: OperandSize) -> (u32, Update) {
    let (res, update) = sub(a, 1, false, size);
    (res, Update { carry: None, ..update })
}

/// Two's complement negation. CF is set unless the operand is zero.
pub fn neg(a: u32, size: OperandSize) -> (u32, Update) {
    sub(0, a & size.mask(), false, size)
}

// ----------------------------------------------------------------------------
// Shifts and rotates

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOp {
    Rol,
    Ror,
    Rcl,
    Rcr,
    Shl,
    Shr,
    Sar,
}

/// Shifts `a` by `count` (already masked to 5 bits). A zero count changes
/// nothing, flags included.
pub fn shift(op: ShiftOp, a: u32, count: u32, carry_in: bool, size: OperandSize) -> (u32, Update) {
    let bits = size.bits();
    let mask = size.mask() as u64;
    let a = a & size.mask();
    if count == 0 {
        return (a, Update::default());
    }
    let msb = |v: u32| sign(v, size);
    match op {
        ShiftOp::Shl => {
            let wide = (a as u64) << count;
            let res = (wide & mask) as u32;
            let cf = count <= bits && (wide >> bits) & 1 == 1;
            let update = Update {
                carry: Some(cf),
                overflow: (count == 1).then(|| msb(res) != cf),
                ..Update::result(res, size)
            };
            (res, update)
        }
        ShiftOp::Shr => {
            let res = if count >= bits { 0 } else { a >> count };
            let cf = count <= bits && ((a as u64) >> (count - 1)) & 1 == 1;
            let update = Update {
                carry: Some(cf),
                overflow: (count == 1).then(|| msb(a)),
                ..Update::result(res, size)
            };
            (res, update)
        }
        ShiftOp::Sar => {
            let signed = sign_extend(a, size);
            let n = count.min(bits);
            let res = (signed >> n) as u32 & size.mask();
            let cf = (signed >> (n - 1)) & 1 == 1;
            let update = Update {
                carry: Some(cf),
                overflow: (count == 1).then_some(false),
                ..Update::result(res, size)
            };
            (res, update)
        }
        ShiftOp::Rol => {
            let n = count % bits;
            let res = ((a as u64) << n | (a as u64) >> ((bits - n) % bits)) & mask;
            let res = res as u32;
            let cf = res & 1 == 1;
            let update = Update {
                carry: Some(cf),
                overflow: (count == 1).then(|| msb(res) != cf),
                ..Default::default()
            };
            (res, update)
        }
        ShiftOp::Ror => {
            let n = count % bits;
            let res = ((a as u64) >> n | (a as u64) << ((bits - n) % bits)) & mask;
            let res = res as u32;
            let cf = msb(res);
            let update = Update {
                carry: Some(cf),
                overflow: (count == 1).then(|| cf != (res >> (bits - 2) & 1 == 1)),
                ..Default::default()
            };
            (res, update)
        }
        ShiftOp::Rcl | ShiftOp::Rcr => {
            // rotate through a (bits + 1)-wide value with CF on top
            let width = bits + 1;
            let n = count % width;
            let full_mask = (1u64 << width) - 1;
            let v = (a as u64) | (carry_in as u64) << bits;
            let rotated = match op {
                ShiftOp::Rcl => (v << n | v >> ((width - n) % width)) & full_mask,
                _ => (v >> n | v << ((width - n) % width)) & full_mask,
            };
            let res = (rotated & mask) as u32;
            let cf = rotated >> bits & 1 == 1;
            let of = match op {
                ShiftOp::Rcl => msb(res) != cf,
                _ => msb(res) != (res >> (bits - 2) & 1 == 1),
            };
            let update = Update {
                carry: Some(cf),
                overflow: (count == 1).then_some(of),
                ..Default::default()
            };
            (res, update)
        }
    }
}
