use super::value::Value;
use strum::{Display, FromRepr};

/// Operands are single bytes, so a chunk can address at most this many constants.
pub const MAX_CONSTANTS: usize = u8::MAX as usize + 1;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OpCode {
    /// operand: constant index
    Constant,
    Nil,
    True,
    False,
    Pop,
    /// operand: stack slot
    GetLocal,
    /// operand: stack slot
    SetLocal,
    /// operand: constant index of the name
    GetGlobal,
    /// operand: constant index of the name
    DefineGlobal,
    /// operand: constant index of the name
    SetGlobal,
    Equal,
    Greater,
    Less,
    Add,
    Subtract,
    Multiply,
    Divide,
    Not,
    Negate,
    Print,
    Return,
}

impl OpCode {
    /// Number of operand bytes following the opcode.
    pub fn operand_len(self) -> usize {
        match self {
            OpCode::Constant
            | OpCode::GetLocal
            | OpCode::SetLocal
            | OpCode::GetGlobal
            | OpCode::DefineGlobal
            | OpCode::SetGlobal => 1,
            _ => 0,
        }
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

/// Compiled bytecode with a line number for every byte and a constant pool.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    pub code: Vec<u8>,
    pub lines: Vec<usize>,
    pub constants: Vec<Value>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, byte: u8, line: usize) {
        self.code.push(byte);
        self.lines.push(line);
    }

    pub fn write_op(&mut self, op: OpCode, line: usize) {
        self.write(op.into(), line);
    }

    /// Index of the new constant, or `None` once the pool is full.
    pub fn add_constant(&mut self, value: Value) -> Option<u8> {
        if self.constants.len() >= MAX_CONSTANTS {
            return None;
        }
        self.constants.push(value);
        u8::try_from(self.constants.len() - 1).ok()
    }

    pub fn line_at(&self, offset: usize) -> Option<usize> {
        self.lines.get(offset).copied()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_keeps_lines_parallel() {
        let mut chunk = Chunk::new();
        chunk.write_op(OpCode::Constant, 1);
        chunk.write(0, 1);
        chunk.write_op(OpCode::Return, 2);
        assert_eq!(chunk.len(), 3);
        assert_eq!(chunk.code.len(), chunk.lines.len());
        assert_eq!(chunk.line_at(2), Some(2));
        assert_eq!(chunk.line_at(3), None);
    }

    #[test]
    fn test_constant_pool_caps_at_256() {
        let mut chunk = Chunk::new();
        for i in 0..MAX_CONSTANTS {
            assert_eq!(chunk.add_constant(Value::Number(i as f64)), Some(i as u8));
        }
        assert_eq!(chunk.add_constant(Value::Nil), None);
        assert_eq!(chunk.constants.len(), MAX_CONSTANTS);
    }

    #[test]
    fn test_opcode_byte_round_trip() {
        for byte in 0..=u8::MAX {
            if let Some(op) = OpCode::from_repr(byte) {
                assert_eq!(u8::from(op), byte);
            }
        }
        assert_eq!(OpCode::from_repr(OpCode::Return as u8), Some(OpCode::Return));
        assert_eq!(OpCode::from_repr(200), None);
    }

    #[test]
    fn test_opcode_names_and_widths() {
        assert_eq!(OpCode::DefineGlobal.to_string(), "DEFINE_GLOBAL");
        assert_eq!(OpCode::Constant.operand_len(), 1);
        assert_eq!(OpCode::GetLocal.operand_len(), 1);
        assert_eq!(OpCode::Add.operand_len(), 0);
    }
}
