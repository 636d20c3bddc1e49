use super::bytecode::{Chunk, OpCode};
use std::fmt::{self, Write};

pub fn disassemble_chunk_to_string(chunk: &Chunk, name: &str) -> String {
    let mut output = String::new();
    let _ = disassemble_chunk(chunk, name, &mut output);
    output
}

pub fn disassemble_chunk(chunk: &Chunk, name: &str, w: &mut impl Write) -> fmt::Result {
    writeln!(w, "== {} ==", name)?;
    let mut offset = 0;
    while offset < chunk.len() {
        offset = disassemble_instruction(chunk, offset, w)?;
    }
    Ok(())
}

/// Single instruction without the trailing newline, plus the next offset.
pub fn disassemble_instruction_to_string(chunk: &Chunk, offset: usize) -> (String, usize) {
    let mut output = String::new();
    let next = disassemble_instruction(chunk, offset, &mut output).unwrap_or(offset + 1);
    if output.ends_with('\n') {
        output.pop();
    }
    (output, next)
}

/// Writes one line for the instruction at `offset` and returns the offset of
/// the instruction after it.
pub fn disassemble_instruction(
    chunk: &Chunk,
    offset: usize,
    w: &mut impl Write,
) -> Result<usize, fmt::Error> {
    write!(w, "{:04} ", offset)?;
    if offset > 0 && chunk.line_at(offset) == chunk.line_at(offset - 1) {
        write!(w, "   | ")?;
    } else {
        write!(w, "{:4} ", chunk.line_at(offset).unwrap_or(0))?;
    }

    let byte = chunk.code[offset];
    let Some(op) = OpCode::from_repr(byte) else {
        writeln!(w, "Unknown opcode {}", byte)?;
        return Ok(offset + 1);
    };
    let name = format!("OP_{}", op);

    match op {
        OpCode::Constant | OpCode::GetGlobal | OpCode::DefineGlobal | OpCode::SetGlobal => {
            constant_instruction(&name, chunk, offset, w)
        }
        OpCode::GetLocal | OpCode::SetLocal => byte_instruction(&name, chunk, offset, w),
        _ => {
            writeln!(w, "{}", name)?;
            Ok(offset + 1)
        }
    }
}

fn constant_instruction(
    name: &str,
    chunk: &Chunk,
    offset: usize,
    w: &mut impl Write,
) -> Result<usize, fmt::Error> {
    let Some(&index) = chunk.code.get(offset + 1) else {
        writeln!(w, "{:<16} <truncated>", name)?;
        return Ok(chunk.len());
    };
    match chunk.constants.get(index as usize) {
        Some(value) => writeln!(w, "{:<16} {:4} '{}'", name, index, value)?,
        None => writeln!(w, "{:<16} {:4} <bad constant>", name, index)?,
    }
    Ok(offset + 2)
}

fn byte_instruction(
    name: &str,
    chunk: &Chunk,
    offset: usize,
    w: &mut impl Write,
) -> Result<usize, fmt::Error> {
    let Some(&slot) = chunk.code.get(offset + 1) else {
        writeln!(w, "{:<16} <truncated>", name)?;
        return Ok(chunk.len());
    };
    writeln!(w, "{:<16} {:4}", name, slot)?;
    Ok(offset + 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::value::Value;

    fn sample_chunk() -> Chunk {
        let mut chunk = Chunk::new();
        let constant = chunk.add_constant(Value::Number(1.5)).unwrap();
        chunk.write_op(OpCode::Constant, 123);
        chunk.write(constant, 123);
        chunk.write_op(OpCode::Negate, 123);
        chunk.write_op(OpCode::GetLocal, 124);
        chunk.write(3, 124);
        chunk.write_op(OpCode::Print, 124);
        chunk.write_op(OpCode::Return, 125);
        chunk
    }

    #[test]
    fn test_one_line_per_instruction() {
        let output = disassemble_chunk_to_string(&sample_chunk(), "test chunk");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "== test chunk ==");
        // five logical instructions spread over seven bytes
        assert_eq!(lines.len(), 1 + 5);
    }

    #[test]
    fn test_instruction_format() {
        let output = disassemble_chunk_to_string(&sample_chunk(), "code");
        let expected = "\
== code ==
0000  123 OP_CONSTANT         0 '1.5'
0002    | OP_NEGATE
0003  124 OP_GET_LOCAL        3
0005    | OP_PRINT
0006  125 OP_RETURN
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_instruction_offsets() {
        let chunk = sample_chunk();
        let (text, next) = disassemble_instruction_to_string(&chunk, 0);
        assert_eq!(next, 2);
        assert!(text.contains("OP_CONSTANT"));
        let (_, next) = disassemble_instruction_to_string(&chunk, next);
        assert_eq!(next, 3);
    }

    #[test]
    fn test_unknown_and_truncated() {
        let mut chunk = Chunk::new();
        chunk.write(250, 1);
        chunk.write_op(OpCode::Constant, 1);
        let output = disassemble_chunk_to_string(&chunk, "bad");
        assert!(output.contains("Unknown opcode 250"));
        assert!(output.contains("<truncated>"));
    }
}
