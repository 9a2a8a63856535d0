//! Stack virtual machine
//!
//! The stack is a fixed-size slab of [`STACK_SIZE`] slots. `pop` only moves
//! the stack pointer; the popped slot keeps its value until the next push,
//! which is what [`Vm::last_popped`] reads after a run.

pub mod code;

use thiserror::Error;

use crate::{
    eval::object::Value,
    vm::code::{Chunk, Op, UnknownOpcode},
};

pub const STACK_SIZE: usize = 2048;

pub type Result<T, E = VmError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum VmError {
    #[error("stack overflow")]
    StackOverflow,
    /// The compiler never emits a pop for an empty stack, so hitting this
    /// means the chunk was corrupted or hand-built wrong.
    #[error("stack underflow")]
    StackUnderflow,
    #[error(transparent)]
    UnknownOpcode(#[from] UnknownOpcode),
    #[error("truncated operand for {op} at {at}")]
    TruncatedOperand { op: Op, at: usize },
    #[error("no constant at index {index}")]
    BadConstant { index: usize },
    #[error("unsupported types for binary operation: {left} {right}")]
    UnsupportedTypes {
        left: &'static str,
        right: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    IntegerOverflow,
}

#[derive(Debug)]
pub struct Vm {
    chunk: Chunk,
    stack: Vec<Value>,
    /// Next free slot; `stack[sp - 1]` is the top
    sp: usize,
}

impl Vm {
    pub fn new(chunk: Chunk) -> Self {
        Self {
            chunk,
            stack: vec![Value::Null; STACK_SIZE],
            sp: 0,
        }
    }

    pub fn stack_top(&self) -> Option<&Value> {
        self.sp.checked_sub(1).map(|top| &self.stack[top])
    }

    /// Value most recently popped. The REPL prints this after running a
    /// chunk, since every expression statement ends in a pop.
    pub fn last_popped(&self) -> &Value {
        &self.stack[self.sp]
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn run(&mut self) -> Result<()> {
        let mut ip = 0;
        while ip < self.chunk.code().len() {
            let op = Op::try_from(self.chunk.code()[ip])?;
            log::trace!("{:04} {}", ip, op);
            ip += 1;

            match op {
                Op::Constant => {
                    let index = self.read_u16_operand(op, &mut ip)? as usize;
                    let value = self
                        .chunk
                        .constants()
                        .get(index)
                        .cloned()
                        .ok_or(VmError::BadConstant { index })?;
                    self.push(value)?;
                }
                Op::True => self.push(Value::Bool(true))?,
                Op::False => self.push(Value::Bool(false))?,
                Op::Add | Op::Sub | Op::Mul | Op::Div => self.binary_op(op)?,
                Op::Pop => {
                    self.pop()?;
                }
            }
        }
        Ok(())
    }

    fn read_u16_operand(&self, op: Op, ip: &mut usize) -> Result<u16> {
        let bytes = self
            .chunk
            .code()
            .get(*ip..*ip + 2)
            .ok_or(VmError::TruncatedOperand { op, at: *ip })?;
        *ip += 2;
        Ok(code::read_u16(bytes))
    }

    fn binary_op(&mut self, op: Op) -> Result<()> {
        let right = self.pop()?;
        let left = self.pop()?;
        match (left, right) {
            (Value::Int(left), Value::Int(right)) => {
                // checked arithmetic: `i64::MIN / -1` and friends must fail
                // as VM errors, not host panics
                let out = match op {
                    Op::Add => left.checked_add(right),
                    Op::Sub => left.checked_sub(right),
                    Op::Mul => left.checked_mul(right),
                    Op::Div => {
                        if right == 0 {
                            return Err(VmError::DivisionByZero);
                        }
                        left.checked_div(right)
                    }
                    _ => unreachable!("not a binary opcode: {}", op),
                };
                let out = out.ok_or(VmError::IntegerOverflow)?;
                self.push(Value::Int(out))
            }
            (left, right) => Err(VmError::UnsupportedTypes {
                left: left.type_name(),
                right: right.type_name(),
            }),
        }
    }

    fn push(&mut self, value: Value) -> Result<()> {
        if self.sp >= STACK_SIZE {
            return Err(VmError::StackOverflow);
        }
        self.stack[self.sp] = value;
        self.sp += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<Value> {
        if self.sp == 0 {
            return Err(VmError::StackUnderflow);
        }
        self.sp -= 1;
        // the slot is left as-is for `last_popped`
        Ok(self.stack[self.sp].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_beyond_capacity_overflows() {
        let mut vm = Vm::new(Chunk::default());
        for i in 0..STACK_SIZE {
            vm.push(Value::Int(i as i64)).unwrap();
        }
        assert_eq!(vm.push(Value::Int(0)), Err(VmError::StackOverflow));
    }

    #[test]
    fn pop_on_empty_stack_underflows() {
        let mut vm = Vm::new(Chunk::default());
        assert_eq!(vm.pop(), Err(VmError::StackUnderflow));
    }

    #[test]
    fn last_popped_survives_the_pop() {
        let mut vm = Vm::new(Chunk::default());
        vm.push(Value::Int(7)).unwrap();
        vm.pop().unwrap();
        assert_eq!(vm.sp(), 0);
        assert_eq!(vm.stack_top(), None);
        assert_eq!(vm.last_popped(), &Value::Int(7));
    }

    #[test]
    fn truncated_operand_is_an_error() {
        let mut chunk = Chunk::default();
        chunk.emit(Op::Constant, &[]);
        let mut vm = Vm::new(chunk);
        assert_eq!(
            vm.run(),
            Err(VmError::TruncatedOperand {
                op: Op::Constant,
                at: 1
            })
        );
    }
}
