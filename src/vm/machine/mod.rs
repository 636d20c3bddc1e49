// machine module: the bytecode interpreter.
//
// `interpret` compiles source into a chunk and then runs the
// fetch-decode-execute loop over it until RETURN or a runtime error.

use super::DebugFlags;
use super::bytecode::{Chunk, OpCode};
use super::compiler::compile;
use super::disasm::{disassemble_chunk_to_string, disassemble_instruction_to_string};
use super::heap::Heap;
use super::table::Table;
use super::value::{ObjString, Value, hash_string};
use crate::runtime_io::{RuntimeIo, StdIo};
use log::debug;
use std::fmt::Write as _;
use std::rc::Rc;

mod instruction;


/// Capacity of the value stack.
pub const STACK_MAX: usize = 256;

// ========== types ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretResult {
    Ok,
    CompileError,
    RuntimeError,
}

impl InterpretResult {
    /// Process exit status for file mode.
    pub fn exit_code(self) -> i32 {
        match self {
            InterpretResult::Ok => 0,
            InterpretResult::CompileError => 65,
            InterpretResult::RuntimeError => 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmErrorKind {
    TypeError,
    UndefinedVariable(String),
    StackOverflow,
    StackUnderflow,
    InvalidBytecode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmError {
    pub kind: VmErrorKind,
    pub message: String,
    /// Source line of the faulting instruction, filled in when reported.
    pub line: Option<usize>,
}

pub type VmResult<T> = Result<T, VmError>;

/// VmError construction helper
pub fn err(kind: VmErrorKind, message: impl Into<String>) -> VmError {
    VmError {
        kind,
        message: message.into(),
        line: None,
    }
}

/// VM state for the current `interpret` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
    Ready,
    Running,
    Finished(InterpretResult),
}

/// How compile errors are written to the error sink.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DiagnosticStyle {
    /// `[line N] Error at 'x': message`
    #[default]
    Plain,
    /// Source-annotated report naming `path`.
    Rich { path: String },
}

pub struct Vm {
    chunk: Chunk,
    ip: usize,
    /// Offset of the opcode currently executing, for error lines.
    instruction_start: usize,
    stack: Vec<Value>,
    pub max_stack: usize,
    globals: Table,
    heap: Heap,
    pub flags: DebugFlags,
    pub diagnostics: DiagnosticStyle,
    state: VmState,
    last_error: Option<VmError>,
}

// ========== VM ==========

impl Vm {
    pub fn new() -> Self {
        Self {
            chunk: Chunk::new(),
            ip: 0,
            instruction_start: 0,
            stack: Vec::with_capacity(STACK_MAX),
            max_stack: STACK_MAX,
            globals: Table::new(),
            heap: Heap::new(),
            flags: DebugFlags::empty(),
            diagnostics: DiagnosticStyle::Plain,
            state: VmState::Ready,
            last_error: None,
        }
    }

    pub fn with_flags(mut self, flags: DebugFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticStyle) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn state(&self) -> VmState {
        self.state
    }

    pub fn last_error(&self) -> Option<&VmError> {
        self.last_error.as_ref()
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn globals(&self) -> &Table {
        &self.globals
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        let key = self.globals.find_string(name, hash_string(name.as_bytes()))?;
        self.globals.get(&key)
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// The chunk compiled by the most recent `interpret` call.
    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn interpret(&mut self, source: &str) -> InterpretResult {
        let mut stdio = StdIo;
        self.interpret_with_io(source, &mut stdio)
    }

    /// Compile and run `source` with an explicit output provider.
    pub fn interpret_with_io<IO: RuntimeIo>(&mut self, source: &str, io: &mut IO) -> InterpretResult {
        debug!("interpret: {} bytes of source", source.len());
        self.reset_stack();
        self.last_error = None;
        self.state = VmState::Running;

        let result = match compile(source, &mut self.heap) {
            Ok(chunk) => {
                if self.flags.contains(DebugFlags::PRINT_CODE) {
                    io.write(&disassemble_chunk_to_string(&chunk, "code"));
                }
                self.chunk = chunk;
                self.ip = 0;
                match self.run(io) {
                    Ok(()) => InterpretResult::Ok,
                    Err(error) => {
                        self.runtime_error(error, io);
                        InterpretResult::RuntimeError
                    }
                }
            }
            Err(errors) => {
                for error in &errors {
                    let text = match &self.diagnostics {
                        DiagnosticStyle::Plain => error.to_string(),
                        DiagnosticStyle::Rich { path } => {
                            error.report(path, source).trim_end().to_string()
                        }
                    };
                    io.write_error_line(&text);
                }
                InterpretResult::CompileError
            }
        };

        debug!("interpret finished: {:?}", result);
        self.state = VmState::Finished(result);
        result
    }

    fn run<IO: RuntimeIo>(&mut self, io: &mut IO) -> VmResult<()> {
        use instruction::ExecutionFlow;
        loop {
            if self.flags.contains(DebugFlags::TRACE_EXECUTION) {
                self.trace_execution(io);
            }
            self.instruction_start = self.ip;
            let op = self.read_op()?;
            match self.execute_instruction(op, io)? {
                ExecutionFlow::Continue => {}
                ExecutionFlow::Return => return Ok(()),
            }
        }
    }

    /// Report `error` against the faulting instruction's line and abandon the
    /// rest of the program.
    fn runtime_error<IO: RuntimeIo>(&mut self, mut error: VmError, io: &mut IO) {
        let line = self.chunk.line_at(self.instruction_start);
        error.line = line;
        io.write_error_line(&error.message);
        match line {
            Some(line) => io.write_error_line(&format!("[line {}] in script", line)),
            None => io.write_error_line("[line ?] in script"),
        }
        debug!("runtime error: {:?}", error.kind);
        self.reset_stack();
        self.last_error = Some(error);
    }

    fn trace_execution<IO: RuntimeIo>(&self, io: &mut IO) {
        let mut line = String::from("          ");
        for value in &self.stack {
            let _ = write!(line, "[ {} ]", value);
        }
        io.write_line(&line);
        if self.ip < self.chunk.len() {
            let (text, _) = disassemble_instruction_to_string(&self.chunk, self.ip);
            io.write_line(&text);
        }
    }

    /// Release every heap object, global binding and the current chunk.
    pub fn free(&mut self) {
        self.reset_stack();
        self.globals.clear();
        self.heap.free();
        self.chunk = Chunk::new();
        self.ip = 0;
        self.state = VmState::Ready;
    }

    // ========== stack ==========

    fn reset_stack(&mut self) {
        self.stack.clear();
    }

    fn push(&mut self, v: Value) -> VmResult<()> {
        if self.stack.len() >= self.max_stack {
            return Err(err(VmErrorKind::StackOverflow, "Stack overflow."));
        }
        self.stack.push(v);
        Ok(())
    }

    fn pop(&mut self) -> VmResult<Value> {
        self.stack
            .pop()
            .ok_or_else(|| err(VmErrorKind::StackUnderflow, "Stack underflow."))
    }

    fn peek(&self, distance: usize) -> VmResult<&Value> {
        self.stack
            .len()
            .checked_sub(distance + 1)
            .and_then(|ix| self.stack.get(ix))
            .ok_or_else(|| err(VmErrorKind::StackUnderflow, "Stack underflow."))
    }

    // ========== bytecode reads ==========

    fn read_byte(&mut self) -> VmResult<u8> {
        let byte = self.chunk.code.get(self.ip).copied().ok_or_else(|| {
            err(
                VmErrorKind::InvalidBytecode,
                "Instruction pointer ran past the end of the chunk.",
            )
        })?;
        self.ip += 1;
        Ok(byte)
    }

    fn read_op(&mut self) -> VmResult<OpCode> {
        let byte = self.read_byte()?;
        OpCode::from_repr(byte).ok_or_else(|| {
            err(
                VmErrorKind::InvalidBytecode,
                format!("Unknown opcode {}.", byte),
            )
        })
    }

    fn read_constant(&mut self) -> VmResult<Value> {
        let index = self.read_byte()?;
        self.chunk
            .constants
            .get(index as usize)
            .cloned()
            .ok_or_else(|| {
                err(
                    VmErrorKind::InvalidBytecode,
                    format!("Constant index {} is out of range.", index),
                )
            })
    }

    fn read_string(&mut self) -> VmResult<Rc<ObjString>> {
        match self.read_constant()? {
            Value::Str(name) => Ok(name),
            other => Err(err(
                VmErrorKind::InvalidBytecode,
                format!("Expected a name constant, found {}.", other.type_name()),
            )),
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Vm {
    fn drop(&mut self) {
        self.free();
    }
}
