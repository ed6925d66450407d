use x86asm::AssembledProgram;

pub fn print_dump(path: &str, program: &AssembledProgram) {
    println!(
        "{}+------[{}]{}",
        "-".repeat(35),
        path,
        "-".repeat(45usize.saturating_sub(path.len()))
    );
    for index in 0..program.entries().len() {
        println!("{}", program.cformat_row(index));
    }
    println!("-----------------------------------+-----------------------------------------------------");
}
