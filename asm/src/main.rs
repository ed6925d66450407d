mod util;

use color_print::{cformat, cprintln};
use std::process::ExitCode;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.s")]
    input: String,

    /// Output file
    #[clap(short, long, default_value = "main.bin")]
    output: String,

    /// Dump assembly listing
    #[clap(short, long)]
    dump: bool,

    /// Write debug metadata as YAML
    #[clap(short, long)]
    meta: Option<String>,
}

fn main() -> ExitCode {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("x86 Assembler");

    println!("1. Read File");
    println!("  < {}", args.input);
    let source = match std::fs::read_to_string(&args.input) {
        Ok(s) => s,
        Err(e) => {
            cprintln!("<r,s>Failed to open File</>: {}: {}", args.input, e);
            return ExitCode::FAILURE;
        }
    };

    println!("2. Assemble");
    let program = match x86asm::assemble(&source) {
        Ok(p) => p,
        Err(e) => {
            e.print_diag(&args.input, &source);
            return ExitCode::FAILURE;
        }
    };
    for (msg, line) in program.warnings() {
        msg.diag(&args.input, *line, &source);
    }

    println!("3. Write Binary");
    println!("  > {}", args.output);
    if let Err(e) = std::fs::write(&args.output, program.machine_code()) {
        cprintln!("<r,s>Failed to write File</>: {}: {}", args.output, e);
        return ExitCode::FAILURE;
    }

    if let Some(path) = &args.meta {
        println!("  > {}", path);
        let written = serde_yaml::to_string(&program.metadata())
            .map_err(|e| e.to_string())
            .and_then(|yaml| std::fs::write(path, yaml).map_err(|e| e.to_string()));
        if let Err(e) = written {
            cprintln!("<r,s>Failed to write File</>: {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    }

    if args.dump {
        util::print_dump(&args.input, &program);
    }

    println!(
        "{}",
        cformat!(
            "<g,s>Done</>: {} statement(s), {} byte(s), entry 0x{:X}",
            program.entries().len(),
            program.machine_code().len(),
            program.entry_point()
        )
    );
    ExitCode::SUCCESS
}
