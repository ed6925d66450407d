mod hooks;

use clap::Parser;
use color_print::{cformat, cprintln};
use std::process::ExitCode;

use hooks::{dump::Dump, trace::Trace, Hook};
use x86emu::Pc;

#[derive(Parser, Debug)]
#[clap(version, about = "Instruction-level emulator for a 32-bit x86 subset")]
struct Args {
    /// Stop after this many instructions
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    /// Memory size in bytes
    #[arg(short, long, default_value_t = 0x10000)]
    memory: u32,

    /// Address the program is loaded at
    #[arg(short, long, default_value_t = 0)]
    load_addr: u32,

    /// YAML file of per-address dump settings
    #[arg(short, long)]
    dump_cfg: Option<String>,

    /// Dump registers after every instruction
    #[arg(short = 'a', long)]
    dump_all: bool,

    /// Do not trace executed instructions
    #[arg(short, long)]
    quiet: bool,

    #[arg(default_value = "main.s")]
    input_file: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("x86 Emulator");

    println!("+-----------------------------------------------+");
    println!("| {:<45} |", args.input_file);
    println!("+-----------------------------------------------+");

    // ------------------------------------------------------------------------
    // Assemble source
    let source = match std::fs::read_to_string(&args.input_file) {
        Ok(s) => s,
        Err(e) => {
            cprintln!("<r,s>Failed to open File</>: {}: {}", args.input_file, e);
            return ExitCode::FAILURE;
        }
    };
    let program = match x86asm::assemble(&source) {
        Ok(p) => p,
        Err(e) => {
            e.print_diag(&args.input_file, &source);
            return ExitCode::FAILURE;
        }
    };
    for (msg, line) in program.warnings() {
        msg.diag(&args.input_file, *line, &source);
    }

    // ------------------------------------------------------------------------
    // Initialize machine
    let mut pc = Pc::new(args.memory);
    if let Err(e) = pc.load_program(&program.machine_code(), args.load_addr, program.entry_point()) {
        cprintln!("<r,s>error</>: {}", e);
        return ExitCode::FAILURE;
    }

    // ------------------------------------------------------------------------
    // Initialize hooks
    println!("[INIT]");
    let dump = match Dump::arg(args.dump_cfg, args.dump_all) {
        Ok(d) => d,
        Err(e) => {
            cprintln!("<r,s>Failed to load dump config</>: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(Trace::new(args.quiet)), Box::new(dump)];
    pc = hooks.iter_mut().fold(pc, |pc, hook| hook.init(pc));

    // ------------------------------------------------------------------------
    // Main loop
    let mut steps = 0_u64;
    for time in 0_u64..args.tmax.unwrap_or(u64::MAX) {
        let addr = pc.eip();
        match pc.exec() {
            Ok(Some(inst)) => {
                pc = hooks
                    .iter_mut()
                    .fold(pc, |pc, hook| hook.exec(time, &inst, pc));
                steps = time + 1;
            }
            Ok(None) => break,
            Err(e) => {
                cprintln!("<r,s>error</>: {}", e);
                let line = addr
                    .checked_sub(args.load_addr)
                    .and_then(|offset| program.line_at(offset));
                if let Some(line) = line {
                    let raw = line
                        .checked_sub(1)
                        .and_then(|idx| source.lines().nth(idx))
                        .unwrap_or("");
                    cprintln!("     <blue>--></> <underline>{}:{}</>", args.input_file, line);
                    cprintln!("      <blue>|</>");
                    cprintln!(" <blue>{:>4} |</> {}", line, raw);
                    cprintln!("      <blue>|</>");
                }
                return ExitCode::FAILURE;
            }
        }
    }

    println!("=================================================");
    println!(
        "{}",
        cformat!("<g,s>Halted</>: {} instruction(s), eip 0x{:X}", steps, pc.eip())
    );
    for (name, value) in pc.register_values() {
        println!("  {:>3}: {}", name, value);
    }
    ExitCode::SUCCESS
}
