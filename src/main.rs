use rlox as lib;
use rlox::{DebugFlags, DiagnosticStyle, InterpretResult, Vm};
use std::env;
use std::process;

const USAGE: &str = "Usage: rlox [run] <path> [--print-code] [--trace] [--pretty]
       rlox repl
       rlox disasm <path>";

const EXIT_USAGE: i32 = 64;
const EXIT_COMPILE: i32 = 65;
const EXIT_IO: i32 = 74;

fn main() {
    env_logger::init();

    // subcommands: run (default) / repl / disasm
    //   rlox program.lox --trace
    //   rlox disasm program.lox
    let mut args = env::args().skip(1).collect::<Vec<String>>();
    if args.is_empty() {
        lib::repl::run_repl();
        return;
    }
    let mut subcmd = "run".to_string();
    if ["run", "repl", "disasm"].contains(&args[0].as_str()) {
        subcmd = args.remove(0);
    }

    let mut flags = DebugFlags::empty();
    let mut pretty = false;
    let mut input_path: Option<String> = None;
    for arg in &args {
        match arg.as_str() {
            "--print-code" => flags |= DebugFlags::PRINT_CODE,
            "--trace" => flags |= DebugFlags::TRACE_EXECUTION,
            "--pretty" => pretty = true,
            s if s.starts_with("--") => usage_error(&format!("unknown option '{}'", s)),
            p if input_path.is_none() => input_path = Some(p.to_string()),
            p => usage_error(&format!("unexpected argument '{}'", p)),
        }
    }

    match subcmd.as_str() {
        "repl" => lib::repl::run_repl(),
        "disasm" => {
            let path = input_path.unwrap_or_else(|| usage_error("missing <path>"));
            let src = read_source(&path);
            match lib::disassemble_source(&src) {
                Ok(listing) => print!("{}", listing),
                Err(errors) => {
                    for error in errors {
                        eprintln!("{}", error);
                    }
                    process::exit(EXIT_COMPILE);
                }
            }
        }
        _ => {
            let path = input_path.unwrap_or_else(|| usage_error("missing <path>"));
            let src = read_source(&path);
            let diagnostics = if pretty {
                DiagnosticStyle::Rich { path: path.clone() }
            } else {
                DiagnosticStyle::Plain
            };
            let mut vm = Vm::new().with_flags(flags).with_diagnostics(diagnostics);
            let result = vm.interpret(&src);
            if result != InterpretResult::Ok {
                process::exit(result.exit_code());
            }
        }
    }
}

fn read_source(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) => {
            eprintln!("Could not read file \"{}\": {}", path, e);
            process::exit(EXIT_IO);
        }
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("rlox: {}", message);
    eprintln!("{}", USAGE);
    process::exit(EXIT_USAGE);
}
