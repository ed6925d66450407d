use x86asm::{assemble, inst::Encode, program::Statement, ErrorKind};

fn assert(code: &str, expected: &[u8]) {
    let program = assemble(code).unwrap_or_else(|e| panic!("{code}: {e}"));
    let bytes = program.machine_code();
    println!("{:<28} {:02X?}", code, bytes);
    assert_eq!(bytes, expected, "{code}");
    for entry in program.entries() {
        assert_eq!(
            entry.statement.encoded_length().unwrap(),
            entry.machine_code.len(),
            "{code}"
        );
    }
}

fn assert_err(code: &str, kind: ErrorKind) {
    match assemble(code) {
        Ok(p) => panic!("{code}: expected {kind}, got {:02X?}", p.machine_code()),
        Err(e) => assert_eq!(e.kind, kind, "{code}: {e}"),
    }
}

macro_rules! case {
    ($name:ident, $code:expr, [$($byte:expr),* $(,)?]) => {
        #[test]
        fn $name() {
            assert($code, &[$($byte),*]);
        }
    };
}

macro_rules! fail {
    ($name:ident, $code:expr, $kind:ident) => {
        #[test]
        fn $name() {
            assert_err($code, ErrorKind::$kind);
        }
    };
}

// mov / lea
case!(mov_imm_al, "mov $0x12,%al", [0xB0, 0x12]);
case!(mov_imm_ah, "mov $0x34,%ah", [0xB4, 0x34]);
case!(mov_imm_ax, "mov $0x5678,%ax", [0x66, 0xB8, 0x78, 0x56]);
case!(mov_imm_ebx, "mov $0xdeadbeef,%ebx", [0xBB, 0xEF, 0xBE, 0xAD, 0xDE]);
case!(mov_reg_word, "mov %bx,%ax", [0x66, 0x89, 0xD8]);
case!(mov_reg_byte, "mov %ah,%bl", [0x88, 0xE3]);
case!(mov_reg_to_mem_byte, "mov %bl,(%eax)", [0x88, 0x18]);
case!(mov_reg_to_mem_word, "mov %bx,(%eax)", [0x66, 0x89, 0x18]);
case!(mov_mem_to_reg, "mov (%ecx),%edx", [0x8B, 0x11]);
case!(mov_imm_to_mem, "movb $0x7f,(%esi)", [0xC6, 0x06, 0x7F]);
case!(mov_imm_to_mem_long, "movl $1,(%esp)", [0xC7, 0x04, 0x24, 0x01, 0x00, 0x00, 0x00]);
case!(lea_sib, "lea (%ebx,%ecx,2),%eax", [0x8D, 0x04, 0x4B]);
case!(lea_word, "lea (%eax),%dx", [0x66, 0x8D, 0x10]);

// arithmetic
case!(add_word, "add %bx,%ax", [0x66, 0x01, 0xD8]);
case!(add_byte, "add %al,%cl", [0x00, 0xC1]);
case!(add_long, "add %eax,%ecx", [0x01, 0xC1]);
case!(add_imm_acc, "add $0x10,%eax", [0x05, 0x10, 0x00, 0x00, 0x00]);
case!(add_imm_reg, "add $0x10,%bl", [0x80, 0xC3, 0x10]);
case!(add_mem_src, "add (%edi),%ecx", [0x03, 0x0F]);
case!(sub_imm_acc, "sub $1,%al", [0x2C, 0x01]);
case!(sub_imm_reg, "subw $2,%cx", [0x66, 0x81, 0xE9, 0x02, 0x00]);
case!(sub_reg, "sub %ecx,%eax", [0x29, 0xC8]);
case!(adc_reg, "adc %edx,%eax", [0x11, 0xD0]);
case!(sbb_imm, "sbb $3,%al", [0x1C, 0x03]);
case!(cmp_imm, "cmp $0x5,%ebx", [0x81, 0xFB, 0x05, 0x00, 0x00, 0x00]);
case!(cmp_reg, "cmp %al,%bl", [0x38, 0xC3]);
case!(inc_long, "inc %ecx", [0x41]);
case!(inc_word, "inc %bx", [0x66, 0x43]);
case!(inc_byte, "inc %al", [0xFE, 0xC0]);
case!(dec_word, "dec %ax", [0x66, 0x48]);
case!(dec_mem, "decl (%eax)", [0xFF, 0x08]);
case!(neg_reg, "neg %eax", [0xF7, 0xD8]);
case!(mul_byte, "mul %bl", [0xF6, 0xE3]);
case!(imul_long, "imul %ecx", [0xF7, 0xE9]);
case!(div_word, "div %bx", [0x66, 0xF7, 0xF3]);
case!(idiv_mem, "idivl (%ebx)", [0xF7, 0x3B]);

// logical
case!(or_imm_acc, "or $0x3400,%ax", [0x66, 0x0D, 0x00, 0x34]);
case!(and_imm_acc, "and $0xff00,%ax", [0x66, 0x25, 0x00, 0xFF]);
case!(xor_reg, "xor %bx,%bx", [0x66, 0x31, 0xDB]);
case!(not_long, "not %eax", [0xF7, 0xD0]);
case!(not_word, "not %bx", [0x66, 0xF7, 0xD3]);
case!(not_high_byte, "not %ch", [0xF6, 0xD5]);
case!(not_mem, "not (%edx)", [0xF7, 0x12]);
case!(not_sib, "notw (%esi, %edi, 4)", [0x66, 0xF7, 0x14, 0xBE]);
case!(test_imm_al, "test $0xfa, %al", [0xA8, 0xFA]);
case!(test_imm_ax, "test $0x1812, %ax", [0x66, 0xA9, 0x12, 0x18]);
case!(test_imm_ecx, "test $0x1812fe, %ecx", [0xF7, 0xC1, 0xFE, 0x12, 0x18, 0x00]);
case!(test_reg, "test %dh, %al", [0x84, 0xF0]);
case!(test_reg_mem, "test %ch, (%edx)", [0x84, 0x2A]);

// shift / rotate
case!(shl_one, "shl %eax", [0xD1, 0xE0]);
case!(shl_explicit_one, "shl $1,%eax", [0xD1, 0xE0]);
case!(sal_imm, "sal $3,%ax", [0x66, 0xC1, 0xE0, 0x03]);
case!(shr_cl, "shr %cl,%ebx", [0xD3, 0xEB]);
case!(sar_imm_byte, "sar $2,%dl", [0xC0, 0xFA, 0x02]);
case!(rol_one, "rolb (%eax)", [0xD0, 0x00]);
case!(ror_cl, "ror %cl,%si", [0x66, 0xD3, 0xCE]);
case!(rcl_imm, "rcl $4,%ecx", [0xC1, 0xD1, 0x04]);
case!(rcr_one, "rcr %dh", [0xD0, 0xDE]);

// stack
case!(push_long, "push %eax", [0x50]);
case!(push_ax, "push %ax", [0x66, 0x50]);
case!(push_bx, "push %bx", [0x66, 0x53]);
case!(pop_ax, "pop %ax", [0x66, 0x58]);
case!(push_imm, "push $0x12345678", [0x68, 0x78, 0x56, 0x34, 0x12]);
case!(push_imm_word, "pushw $0x1234", [0x66, 0x68, 0x34, 0x12]);
case!(push_mem, "pushl (%ebx)", [0xFF, 0x33]);
case!(pop_mem, "popl (%ecx)", [0x8F, 0x01]);
case!(pushf, "pushf", [0x66, 0x9C]);
case!(pushfd, "pushfd", [0x9C]);
case!(popf, "popf", [0x66, 0x9D]);
case!(popfd, "popfd", [0x9D]);
case!(pusha, "pusha", [0x66, 0x60]);
case!(pushad, "pushad", [0x60]);
case!(popa, "popa", [0x66, 0x61]);
case!(popad, "popad", [0x61]);

// misc
case!(ret, "ret", [0xC3]);
case!(nop, "nop", [0x90]);
case!(lahf, "lahf", [0x9F]);
case!(sahf, "sahf", [0x9E]);
case!(stc, "stc", [0xF9]);
case!(clc, "clc", [0xF8]);
case!(cmc, "cmc", [0xF5]);
case!(sti, "sti", [0xFB]);
case!(cli, "cli", [0xFA]);
case!(std, "std", [0xFD]);
case!(cld, "cld", [0xFC]);

// directives
case!(byte, ".byte 0x23, 23", [0x23, 0x17]);
case!(value_pair, ".value 0xbeef, 0xdead", [0xEF, 0xBE, 0xAD, 0xDE]);
case!(value_single, ".value 12345", [0x39, 0x30]);
case!(long_pair, ".long 0x50, 0xdead", [0x50, 0x00, 0x00, 0x00, 0xAD, 0xDE, 0x00, 0x00]);
case!(long_single, ".long 0xdeadbeef", [0xEF, 0xBE, 0xAD, 0xDE]);

// branches
case!(jmp_self, "L: jmp L", [0xE9, 0xFB, 0xFF, 0xFF, 0xFF]);
case!(jmp_forward, "jmp L\nL: nop", [0xE9, 0x00, 0x00, 0x00, 0x00, 0x90]);
case!(je_back, "L: nop\nje L", [0x90, 0x0F, 0x84, 0xF9, 0xFF, 0xFF, 0xFF]);
case!(jg_end, "jg end\nend:", [0x0F, 0x8F, 0x00, 0x00, 0x00, 0x00]);
case!(call_forward, "call f\nf: ret", [0xE8, 0x00, 0x00, 0x00, 0x00, 0xC3]);

// rejected shapes
fail!(mov_mem_to_mem, "mov (%eax),(%ebx)", InvalidOperandType);
fail!(mov_to_imm, "mov %eax,$1", InvalidOperandType);
fail!(and_mem_to_mem, "and (%eax),(%ebx)", InvalidOperandType);
fail!(or_mem_to_mem, "or (%eax),(%ebx)", InvalidOperandType);
fail!(xor_mem_to_mem, "xor (%eax),(%ebx)", InvalidOperandType);
fail!(shift_count_too_big, "shl $256,%eax", InvalidOperandSize);
fail!(shift_count_register, "shl %bl,%eax", InvalidOperandType);
fail!(push_byte, "push %al", InvalidOperandSize);
fail!(pop_imm, "pop $1", InvalidOperandType);
fail!(lea_byte, "lea (%eax),%al", InvalidOperandSize);
fail!(lea_reg_src, "lea %eax,%ebx", InvalidOperandType);
fail!(jmp_register, "jmp %eax", InvalidOperandType);
fail!(jmp_undefined, "jmp nowhere", InvalidLabel);
fail!(call_undefined, "call nowhere", InvalidLabel);
fail!(unknown_operator, "frob %eax", InvalidOperator);
fail!(unknown_directive, ".quad 1", InvalidDirective);
fail!(unknown_register, "inc %r8", InvalidRegister);
fail!(size_mismatch, "add %al,%ebx", InvalidOperandSize);
fail!(ret_operand, "ret $4", AssertionError);
fail!(displacement, "mov 4(%eax),%ebx", AssertionError);
fail!(ebp_base, "mov (%ebp),%ebx", AssertionError);
fail!(byte_overflow, ".byte 300", InvalidOperandSize);
fail!(syntax, "mov %eax,,%ebx", SyntaxError);

#[test]
fn error_lines_are_one_based() {
    let err = assemble("nop\n\nmov (%eax),(%ebx)").unwrap_err();
    assert_eq!(err.line, Some(3));
    assert!(err.to_string().starts_with("Line 3, InvalidOperandType"));

    let err = assemble("jmp L1\nnop\njmp nowhere").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidLabel);
    assert_eq!(err.line, Some(1));
}

#[test]
fn statements_keep_operator_spelling() {
    let program = assemble("jnz L\nL: notw (%esi,%edi,4)").unwrap();
    match &program.entries()[0].statement {
        Statement::Instruction(inst) => assert_eq!(inst.operator, "jnz"),
        other => panic!("unexpected {other:?}"),
    }
}
