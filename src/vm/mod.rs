pub mod bytecode;
pub mod compiler;
pub mod disasm;
pub mod heap;
pub mod machine;
pub mod table;
pub mod value;

pub use bytecode::{Chunk, OpCode};
pub use compiler::{CompileError, Compiler, ErrorLocation, compile};
pub use heap::Heap;
pub use machine::{
    DiagnosticStyle, InterpretResult, Vm, VmError, VmErrorKind, VmResult, VmState, err,
};
pub use table::Table;
pub use value::{ObjString, Value};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DebugFlags: u8 {
        /// Dump the disassembly of every freshly compiled chunk
        const PRINT_CODE      = 1 << 0;

        /// Dump the stack and the next instruction before each step
        const TRACE_EXECUTION = 1 << 1;
    }
}
