//! Bytecode: opcodes, instruction encoding and the compiled chunk

use std::fmt::{self, Write};

use smallvec::SmallVec;
use thiserror::Error;

use crate::eval::object::Value;

/// One-byte opcodes. Operands follow inline in the instruction stream,
/// big-endian; [`Op::operand_widths`] is the single source of truth for
/// their layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    /// Push `constants[u16 operand]`
    Constant,
    True,
    False,
    Add,
    Sub,
    Mul,
    Div,
    /// Discard the top of the stack. Emitted after every expression
    /// statement.
    Pop,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("opcode {0} undefined")]
pub struct UnknownOpcode(pub u8);

impl TryFrom<u8> for Op {
    type Error = UnknownOpcode;

    fn try_from(byte: u8) -> Result<Self, UnknownOpcode> {
        Ok(match byte {
            x if x == Op::Constant as u8 => Op::Constant,
            x if x == Op::True as u8 => Op::True,
            x if x == Op::False as u8 => Op::False,
            x if x == Op::Add as u8 => Op::Add,
            x if x == Op::Sub as u8 => Op::Sub,
            x if x == Op::Mul as u8 => Op::Mul,
            x if x == Op::Div as u8 => Op::Div,
            x if x == Op::Pop as u8 => Op::Pop,
            _ => return Err(UnknownOpcode(byte)),
        })
    }
}

impl Op {
    /// Byte widths of the operands, in order
    pub fn operand_widths(self) -> &'static [usize] {
        match self {
            Op::Constant => &[2],
            Op::True
            | Op::False
            | Op::Add
            | Op::Sub
            | Op::Mul
            | Op::Div
            | Op::Pop => &[],
        }
    }

    /// Mnemonic used by the disassembler
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Constant => "OpConstant",
            Op::True => "OpTrue",
            Op::False => "OpFalse",
            Op::Add => "OpAdd",
            Op::Sub => "OpSub",
            Op::Mul => "OpMul",
            Op::Div => "OpDiv",
            Op::Pop => "OpPop",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encodes one instruction. Operands beyond what the opcode declares are
/// ignored; too-few is a caller bug and encodes short.
pub fn make(op: Op, operands: &[usize]) -> SmallVec<[u8; 4]> {
    let mut ins = SmallVec::new();
    ins.push(op as u8);
    for (operand, width) in operands.iter().zip(op.operand_widths()) {
        match width {
            2 => ins.extend_from_slice(&(*operand as u16).to_be_bytes()),
            _ => unreachable!("undeclared operand width: {}", width),
        }
    }
    ins
}

/// Decodes the operands that follow an opcode byte. Returns the operands
/// and how many bytes they occupied.
pub fn read_operands(op: Op, ins: &[u8]) -> (SmallVec<[usize; 2]>, usize) {
    let mut operands = SmallVec::new();
    let mut offset = 0;
    for width in op.operand_widths() {
        match width {
            2 => operands.push(read_u16(&ins[offset..]) as usize),
            _ => unreachable!("undeclared operand width: {}", width),
        }
        offset += width;
    }
    (operands, offset)
}

pub fn read_u16(bytes: &[u8]) -> u16 {
    ((bytes[0] as u16) << 8) | bytes[1] as u16
}

/// Compiled unit: flat instruction stream plus its constant pool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    code: Vec<u8>,
    constants: Vec<Value>,
}

impl Chunk {
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn constants(&self) -> &[Value] {
        &self.constants
    }

    /// Returns the new constant's pool index, the operand for `OpConstant`
    pub fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Appends one instruction and returns its byte offset
    pub fn emit(&mut self, op: Op, operands: &[usize]) -> usize {
        let pos = self.code.len();
        self.code.extend_from_slice(&make(op, operands));
        pos
    }

    /// One instruction per line: zero-padded byte offset, mnemonic, decoded
    /// operands. An undecodable byte renders as an ERROR line.
    pub fn disassemble(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        let mut pos = 0;
        while pos < self.code.len() {
            match Op::try_from(self.code[pos]) {
                Ok(op) => {
                    let (operands, read) = read_operands(op, &self.code[pos + 1..]);
                    write!(out, "{:04} {}", pos, op)?;
                    for operand in operands {
                        write!(out, " {}", operand)?;
                    }
                    out.push('\n');
                    pos += 1 + read;
                }
                Err(err) => {
                    writeln!(out, "{:04} ERROR: {}", pos, err)?;
                    pos += 1;
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_encodes_big_endian_operands() {
        let ins = make(Op::Constant, &[65534]);
        assert_eq!(&ins[..], &[Op::Constant as u8, 255, 254]);

        let ins = make(Op::Add, &[]);
        assert_eq!(&ins[..], &[Op::Add as u8]);
    }

    #[test]
    fn read_operands_round_trips() {
        let ins = make(Op::Constant, &[65535]);
        let op = Op::try_from(ins[0]).unwrap();
        let (operands, read) = read_operands(op, &ins[1..]);
        assert_eq!(read, 2);
        assert_eq!(&operands[..], &[65535]);
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        assert_eq!(Op::try_from(Op::Pop as u8), Ok(Op::Pop));
        assert_eq!(Op::try_from(255), Err(UnknownOpcode(255)));
    }

    #[test]
    fn disassembly_format() {
        let mut chunk = Chunk::default();
        chunk.emit(Op::Add, &[]);
        chunk.emit(Op::Constant, &[2]);
        chunk.emit(Op::Constant, &[65535]);

        let expected = "0000 OpAdd\n\
                        0001 OpConstant 2\n\
                        0004 OpConstant 65535\n";
        assert_eq!(chunk.disassemble().unwrap(), expected);
    }
}
