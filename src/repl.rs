//! Interactive read-eval-print loop.
//!
//! Every line is compiled and run on the same [`Vm`], so globals defined on
//! one line stay visible on the next. Compile and runtime errors are reported
//! and the session carries on.

use crate::runtime_io::{RuntimeIo, StdIo};
use crate::vm::{InterpretResult, Vm};
use log::debug;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

const HISTORY_FILE: &str = ".rlox_history";
const PROMPT: &str = "> ";

/// REPL session state
pub struct ReplState {
    pub vm: Vm,
}

impl ReplState {
    pub fn new() -> Self {
        Self { vm: Vm::new() }
    }

    /// Compile and run one line of input. Blank input does nothing.
    pub fn eval_line<IO: RuntimeIo>(&mut self, input: &str, io: &mut IO) -> InterpretResult {
        if input.trim().is_empty() {
            return InterpretResult::Ok;
        }
        self.vm.interpret_with_io(input, io)
    }

    /// Bound globals as `name = value`, sorted by name.
    pub fn list_globals(&self) -> Vec<String> {
        let mut globals: Vec<_> = self
            .vm
            .globals()
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), value.to_string()))
            .collect();
        globals.sort();
        globals
            .into_iter()
            .map(|(name, value)| format!("{} = {}", name, value))
            .collect()
    }

    /// Drop every definition and start over with a fresh VM.
    pub fn reset(&mut self) {
        self.vm = Vm::new();
    }
}

impl Default for ReplState {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle a `:command` line.
///
/// Returns `Ok(true)` when the session should end.
pub fn handle_command<IO: RuntimeIo>(
    cmd: &str,
    state: &mut ReplState,
    io: &mut IO,
) -> Result<bool, String> {
    let cmd = cmd.trim();
    let (name, rest) = match cmd.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (cmd, ""),
    };

    match name {
        ":quit" | ":q" => Ok(true),
        ":help" | ":h" => {
            io.write(HELP);
            Ok(false)
        }
        ":globals" | ":g" => {
            let globals = state.list_globals();
            if globals.is_empty() {
                io.write_line("No globals defined.");
            }
            for line in globals {
                io.write_line(&format!("  {}", line));
            }
            Ok(false)
        }
        ":reset" | ":r" => {
            state.reset();
            io.write_line("Session cleared.");
            Ok(false)
        }
        ":disasm" | ":d" => {
            if rest.is_empty() {
                return Err("Usage: :disasm <code>".to_string());
            }
            match crate::disassemble_source(rest) {
                Ok(listing) => io.write(&listing),
                Err(errors) => {
                    for error in errors {
                        io.write_error_line(&error.to_string());
                    }
                }
            }
            Ok(false)
        }
        _ => Err(format!("Unknown command: {}", name)),
    }
}

/// Dispatch one line of input: `:commands` to [`handle_command`], anything
/// else to the VM. Returns `true` when the session should end.
pub fn process_line<IO: RuntimeIo>(line: &str, state: &mut ReplState, io: &mut IO) -> bool {
    let line = line.trim();
    if line.starts_with(':') {
        match handle_command(line, state, io) {
            Ok(quit) => return quit,
            Err(e) => io.write_error_line(&e),
        }
        return false;
    }
    state.eval_line(line, io);
    false
}

const HELP: &str = "Commands:
  :quit, :q          Exit the REPL
  :help, :h          Show this help
  :globals, :g       List defined globals
  :reset, :r         Clear all definitions
  :disasm, :d <code> Show the bytecode for <code> without running it
";

fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HISTORY_FILE))
}

/// Run the interactive session on stdin/stdout until `:quit` or end of input.
pub fn run_repl() {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Could not start line editor: {}", e);
            return;
        }
    };
    let history = history_path();
    if let Some(path) = &history {
        let _ = rl.load_history(path);
    }

    debug!("repl session started");
    let mut state = ReplState::new();
    let mut io = StdIo;
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                if process_line(trimmed, &mut state, &mut io) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }

    if let Some(path) = &history {
        let _ = rl.save_history(path);
    }
    debug!("repl session ended");
}
