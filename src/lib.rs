pub mod lexer;
pub mod repl;
pub mod runtime_io;
pub mod vm;

pub use runtime_io::{BufferIo, RuntimeIo, StdIo};
pub use vm::{CompileError, DebugFlags, DiagnosticStyle, InterpretResult, Vm};

/// Compile and run `source` on a throwaway VM, writing to stdout/stderr.
pub fn interpret(source: &str) -> InterpretResult {
    Vm::new().interpret(source)
}

/// Like [`interpret`] but captures program output and diagnostics.
pub fn interpret_to_buffer(source: &str) -> (InterpretResult, BufferIo) {
    let mut io = BufferIo::new();
    let result = Vm::new().interpret_with_io(source, &mut io);
    (result, io)
}

/// Compile `source` without running it and return the chunk disassembly.
pub fn disassemble_source(source: &str) -> Result<String, Vec<CompileError>> {
    let mut heap = vm::Heap::new();
    let chunk = vm::compile(source, &mut heap)?;
    Ok(vm::disasm::disassemble_chunk_to_string(&chunk, "code"))
}
