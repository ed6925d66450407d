use arch::{mnemonic::Mnemonic, size::OperandSize};
use once_cell::sync::Lazy;
use std::collections::HashMap;

use Mnemonic::*;
use OperandSize::*;

/// Mnemonics accepting the `b`, `w` and `l` suffixes.
const SIZED: &[Mnemonic] = &[
    Mov, Add, Or, Adc, Sbb, And, Sub, Xor, Cmp, Test, Not, Neg, Mul, Imul, Div, Idiv, Inc, Dec,
    Rol, Ror, Rcl, Rcr, Shl, Shr, Sal, Sar,
];

/// Mnemonics accepting only `w` and `l`.
const WIDE: &[Mnemonic] = &[Lea, Push, Pop];

const PLAIN: &[Mnemonic] = &[
    Jmp, Call, Ret, Nop, Stc, Clc, Cmc, Std, Cld, Sti, Cli, Lahf, Sahf,
];

const JCC_ALIASES: &[(&str, Mnemonic)] = &[
    ("jc", Jb),
    ("jnae", Jb),
    ("jnb", Jae),
    ("jnc", Jae),
    ("jz", Je),
    ("jnz", Jne),
    ("jna", Jbe),
    ("jnbe", Ja),
    ("jpe", Jp),
    ("jpo", Jnp),
    ("jnge", Jl),
    ("jnl", Jge),
    ("jng", Jle),
    ("jnle", Jg),
];

const FIXED_SIZE: &[(&str, Mnemonic, OperandSize)] = &[
    ("pushf", Pushf, Word),
    ("pushfd", Pushf, Long),
    ("popf", Popf, Word),
    ("popfd", Popf, Long),
    ("pusha", Pusha, Word),
    ("pushad", Pusha, Long),
    ("popa", Popa, Word),
    ("popad", Popa, Long),
];

/// Operator spelling -> (base mnemonic, size implied by the spelling).
static TABLE: Lazy<HashMap<String, (Mnemonic, Option<OperandSize>)>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for m in SIZED {
        table.insert(m.to_string(), (*m, None));
        for size in [Byte, Word, Long] {
            table.insert(format!("{}{}", m, size.suffix()), (*m, Some(size)));
        }
    }
    for m in WIDE {
        table.insert(m.to_string(), (*m, None));
        for size in [Word, Long] {
            table.insert(format!("{}{}", m, size.suffix()), (*m, Some(size)));
        }
    }
    for m in PLAIN {
        table.insert(m.to_string(), (*m, None));
    }
    for cc in 0..16 {
        let m = Mnemonic::from_cond(cc);
        table.insert(m.to_string(), (m, None));
    }
    for (name, m) in JCC_ALIASES {
        table.insert(name.to_string(), (*m, None));
    }
    for (name, m, size) in FIXED_SIZE {
        table.insert(name.to_string(), (*m, Some(*size)));
    }
    table
});

pub fn lookup(operator: &str) -> Option<(Mnemonic, Option<OperandSize>)> {
    TABLE.get(operator).copied()
}
