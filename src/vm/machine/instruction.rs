use super::{Vm, VmErrorKind, VmResult, err};
use crate::runtime_io::RuntimeIo;
use crate::vm::bytecode::OpCode;
use crate::vm::value::Value;

/// Outcome of executing one instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionFlow {
    Continue,
    /// RETURN reached; the current `interpret` call is done
    Return,
}

impl Vm {
    /// Dispatch a single decoded instruction. Operands are read from the chunk
    /// by the handlers that need them.
    pub(super) fn execute_instruction<IO: RuntimeIo>(
        &mut self,
        op: OpCode,
        io: &mut IO,
    ) -> VmResult<ExecutionFlow> {
        match op {
            // ===== constants =====
            OpCode::Constant => self.handle_constant(),
            OpCode::Nil => self.handle_literal(Value::Nil),
            OpCode::True => self.handle_literal(Value::Bool(true)),
            OpCode::False => self.handle_literal(Value::Bool(false)),

            // ===== stack =====
            OpCode::Pop => self.handle_pop(),

            // ===== variables =====
            OpCode::GetLocal => self.handle_get_local(),
            OpCode::SetLocal => self.handle_set_local(),
            OpCode::GetGlobal => self.handle_get_global(),
            OpCode::DefineGlobal => self.handle_define_global(),
            OpCode::SetGlobal => self.handle_set_global(),

            // ===== comparison =====
            OpCode::Equal => self.handle_equal(),
            OpCode::Greater => self.binary_number_op(|a, b| Value::Bool(a > b)),
            OpCode::Less => self.binary_number_op(|a, b| Value::Bool(a < b)),

            // ===== arithmetic =====
            OpCode::Add => self.handle_add(),
            OpCode::Subtract => self.binary_number_op(|a, b| Value::Number(a - b)),
            OpCode::Multiply => self.binary_number_op(|a, b| Value::Number(a * b)),
            OpCode::Divide => self.binary_number_op(|a, b| Value::Number(a / b)),
            OpCode::Not => self.handle_not(),
            OpCode::Negate => self.handle_negate(),

            // ===== output / control =====
            OpCode::Print => self.handle_print(io),
            OpCode::Return => Ok(ExecutionFlow::Return),
        }
    }

    // ===== constants =====

    fn handle_constant(&mut self) -> VmResult<ExecutionFlow> {
        let value = self.read_constant()?;
        self.push(value)?;
        Ok(ExecutionFlow::Continue)
    }

    fn handle_literal(&mut self, value: Value) -> VmResult<ExecutionFlow> {
        self.push(value)?;
        Ok(ExecutionFlow::Continue)
    }

    fn handle_pop(&mut self) -> VmResult<ExecutionFlow> {
        self.pop()?;
        Ok(ExecutionFlow::Continue)
    }

    // ===== variables =====

    // The script's locals start at the bottom of the stack.
    fn local_slot(&mut self) -> VmResult<usize> {
        let slot = self.read_byte()? as usize;
        if slot >= self.stack.len() {
            return Err(err(
                VmErrorKind::InvalidBytecode,
                format!("Local slot {} is outside the stack.", slot),
            ));
        }
        Ok(slot)
    }

    fn handle_get_local(&mut self) -> VmResult<ExecutionFlow> {
        let slot = self.local_slot()?;
        let value = self.stack[slot].clone();
        self.push(value)?;
        Ok(ExecutionFlow::Continue)
    }

    fn handle_set_local(&mut self) -> VmResult<ExecutionFlow> {
        let slot = self.local_slot()?;
        // assignment is an expression: the value stays on the stack
        let value = self.peek(0)?.clone();
        self.stack[slot] = value;
        Ok(ExecutionFlow::Continue)
    }

    fn handle_get_global(&mut self) -> VmResult<ExecutionFlow> {
        let name = self.read_string()?;
        let value = self.globals.get(&name).ok_or_else(|| {
            err(
                VmErrorKind::UndefinedVariable(name.as_str().to_string()),
                format!("Undefined variable '{}'.", name),
            )
        })?;
        self.push(value)?;
        Ok(ExecutionFlow::Continue)
    }

    fn handle_define_global(&mut self) -> VmResult<ExecutionFlow> {
        let name = self.read_string()?;
        let value = self.peek(0)?.clone();
        self.globals.set(name, value);
        self.pop()?;
        Ok(ExecutionFlow::Continue)
    }

    fn handle_set_global(&mut self) -> VmResult<ExecutionFlow> {
        let name = self.read_string()?;
        let value = self.peek(0)?.clone();
        if self.globals.set(name.clone(), value) {
            // assigning never creates a binding
            self.globals.delete(&name);
            return Err(err(
                VmErrorKind::UndefinedVariable(name.as_str().to_string()),
                format!("Undefined variable '{}'.", name),
            ));
        }
        Ok(ExecutionFlow::Continue)
    }

    // ===== operators =====

    fn handle_equal(&mut self) -> VmResult<ExecutionFlow> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(Value::Bool(a == b))?;
        Ok(ExecutionFlow::Continue)
    }

    fn binary_number_op(&mut self, op: impl FnOnce(f64, f64) -> Value) -> VmResult<ExecutionFlow> {
        let (Some(b), Some(a)) = (self.peek(0)?.as_number(), self.peek(1)?.as_number()) else {
            return Err(err(VmErrorKind::TypeError, "Operands must be numbers."));
        };
        self.pop()?;
        self.pop()?;
        self.push(op(a, b))?;
        Ok(ExecutionFlow::Continue)
    }

    fn handle_add(&mut self) -> VmResult<ExecutionFlow> {
        let (a, b) = (self.peek(1)?.clone(), self.peek(0)?.clone());
        let result = match (a, b) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::Str(a), Value::Str(b)) => {
                let mut joined = String::with_capacity(a.len() + b.len());
                joined.push_str(a.as_str());
                joined.push_str(b.as_str());
                Value::Str(self.heap.take_string(joined))
            }
            _ => {
                return Err(err(
                    VmErrorKind::TypeError,
                    "Operands must be two numbers or two strings.",
                ));
            }
        };
        self.pop()?;
        self.pop()?;
        self.push(result)?;
        Ok(ExecutionFlow::Continue)
    }

    fn handle_not(&mut self) -> VmResult<ExecutionFlow> {
        let value = self.pop()?;
        self.push(Value::Bool(value.is_falsey()))?;
        Ok(ExecutionFlow::Continue)
    }

    fn handle_negate(&mut self) -> VmResult<ExecutionFlow> {
        let Some(n) = self.peek(0)?.as_number() else {
            return Err(err(VmErrorKind::TypeError, "Operand must be a number."));
        };
        self.pop()?;
        self.push(Value::Number(-n))?;
        Ok(ExecutionFlow::Continue)
    }

    fn handle_print<IO: RuntimeIo>(&mut self, io: &mut IO) -> VmResult<ExecutionFlow> {
        let value = self.pop()?;
        io.write_line(&value.to_string());
        Ok(ExecutionFlow::Continue)
    }
}
