use x86asm::{assemble, msg::Msg, AssembledProgram};

const PROGRAM: &str = "\
mov $0x20,%ax
mov $0xa,%bx
add %bx,%ax
or $0x3400,%ax
and $0xff00,%ax
xor %bx,%bx
inc %bx
";

const LOOP: &str = "\
xor %cx,%cx
mov $0x3,%ax
L1:add %ax,%cx
dec %ax
jnz L1
mov %cx,%ax
";

const LOOP_COMMENTED: &str = "\
; sum 3 + 2 + 1 into cx
xor %cx,%cx
mov $0x3,%ax      ; counter

L1:
  add %ax,%cx
  dec %ax
  jnz L1          ; until ax == 0
mov %cx,%ax
";

const CALL: &str = "\
mov $0x50000,%esp
mov $0x1234,%ax
call L2
L1: jmp L1
L2: inc %ax
ret
";

const LOOP_BYTES: [u8; 21] = [
    0x66, 0x31, 0xC9, 0x66, 0xB8, 0x03, 0x00, 0x66, 0x01, 0xC1, 0x66, 0x48, 0x0F, 0x85, 0xF5,
    0xFF, 0xFF, 0xFF, 0x66, 0x89, 0xC8,
];

fn check_layout(program: &AssembledProgram) {
    let addrs = program.instruction_start_addr();
    let lens = program.instruction_lengths();
    assert_eq!(addrs.len(), lens.len());
    assert_eq!(addrs.first().copied().unwrap_or(0), 0);
    for i in 1..addrs.len() {
        assert_eq!(addrs[i], addrs[i - 1] + lens[i - 1] as u32);
    }
    let total: usize = lens.iter().sum();
    assert_eq!(total, program.machine_code().len());
    for (i, entry) in program.entries().iter().enumerate() {
        assert_eq!(entry.machine_code.len(), lens[i]);
        assert_eq!(program.index_at(addrs[i]), Some(i));
    }
}

#[test]
fn straight_line_program() {
    let program = assemble(PROGRAM).unwrap();
    assert_eq!(
        program.machine_code(),
        vec![
            0x66, 0xB8, 0x20, 0x00, 0x66, 0xBB, 0x0A, 0x00, 0x66, 0x01, 0xD8, 0x66, 0x0D, 0x00,
            0x34, 0x66, 0x25, 0x00, 0xFF, 0x66, 0x31, 0xDB, 0x66, 0x43
        ]
    );
    check_layout(&program);
}

#[test]
fn loop_program() {
    let program = assemble(LOOP).unwrap();
    assert_eq!(program.machine_code(), LOOP_BYTES.to_vec());
    assert_eq!(program.symbol_table().get("L1"), Some(&2));
    assert_eq!(program.reverse_symbol_table().get(&2).map(String::as_str), Some("L1"));
    assert_eq!(program.instruction_start_addr(), &[0, 3, 7, 10, 12, 18]);
    check_layout(&program);
}

#[test]
fn loop_program_with_comments() {
    let program = assemble(LOOP_COMMENTED).unwrap();
    assert_eq!(program.machine_code(), LOOP_BYTES.to_vec());
    assert_eq!(program.line_nums(), vec![2, 3, 6, 7, 8, 9]);
    assert_eq!(program.line_at(10), Some(7));
    assert_eq!(program.line_at(11), None);
}

#[test]
fn call_program() {
    let program = assemble(CALL).unwrap();
    assert_eq!(
        program.machine_code(),
        vec![
            0xBC, 0x00, 0x00, 0x05, 0x00, 0x66, 0xB8, 0x34, 0x12, 0xE8, 0x05, 0x00, 0x00, 0x00,
            0xE9, 0xFB, 0xFF, 0xFF, 0xFF, 0x66, 0x40, 0xC3
        ]
    );
    check_layout(&program);
}

#[test]
fn assembly_is_idempotent() {
    for src in [PROGRAM, LOOP, LOOP_COMMENTED, CALL] {
        let a = assemble(src).unwrap();
        let b = assemble(src).unwrap();
        assert_eq!(a.machine_code(), b.machine_code());
        assert_eq!(a.symbol_table(), b.symbol_table());
        assert_eq!(a.metadata(), b.metadata());
    }
}

#[test]
fn entry_point_follows_start_label() {
    assert_eq!(assemble(LOOP).unwrap().entry_point(), 0);
    let program = assemble(".long 0\nstart: nop").unwrap();
    assert_eq!(program.entry_point(), 4);
}

#[test]
fn redefined_label_warns_and_later_wins() {
    let program = assemble("L: nop\nL: ret\njmp L").unwrap();
    assert_eq!(program.symbol_table().get("L"), Some(&1));
    assert_eq!(
        program.machine_code(),
        vec![0x90, 0xC3, 0xE9, 0xFA, 0xFF, 0xFF, 0xFF]
    );
    let warnings = program.warnings();
    assert_eq!(warnings.len(), 2);
    assert!(matches!(&warnings[0], (Msg::Warn(_), 2)));
    assert!(matches!(&warnings[1], (Msg::Note(_), 1)));
}

#[test]
fn metadata_tables() {
    let program = assemble(LOOP).unwrap();
    let meta = program.metadata();
    assert_eq!(meta.program, LOOP);
    assert_eq!(meta.line_nums, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(meta.instruction_lengths, vec![3, 4, 3, 2, 6, 3]);
    assert_eq!(meta.addr_instruction_map.get(&12), Some(&4));
    assert_eq!(meta.reverse_symbol_table.get(&2).map(String::as_str), Some("L1"));
    let yaml = serde_yaml::to_string(&meta).unwrap();
    assert!(yaml.contains("symbol_table"));
}

#[test]
fn table_rows() {
    let program = assemble(LOOP).unwrap();
    let rows = program.table();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[2].address, "7");
    assert_eq!(rows[2].label, "L1");
    assert_eq!(rows[2].machine_code, "66 01 C1");
    assert_eq!(rows[2].operator, "add");
    assert_eq!(rows[2].operands, vec!["%ax", "%cx"]);
    assert_eq!(rows[4].operands, vec!["L1"]);
    assert_eq!(rows[4].address, "c");
}

#[test]
fn listing() {
    let listing = assemble(LOOP).unwrap().to_string();
    let mut lines = listing.lines();
    assert_eq!(lines.next(), Some("Addr\t\t\tMachine Code\t\t\tAssembly"));
    assert_eq!(lines.next(), Some("-".repeat(80).as_str()));
    assert!(listing.contains("L1: add %ax, %cx"));
    assert!(listing.contains("0F 85 F5 FF FF FF"));
}
