//! Compiler: AST → bytecode chunk

use thiserror::Error;

use crate::{
    eval::object::Value,
    syntax::ast::{Expr, InfixOp, Program, Stmt},
    vm::code::{Chunk, Op},
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("unknown operator {op}")]
    UnknownOperator { op: InfixOp },
    /// Node kinds the bytecode backend does not cover yet. The evaluator
    /// handles them; compilation fails loudly instead of miscompiling.
    #[error("unexpected expr: {expr:?}")]
    UnexpectedExpr { expr: Expr },
    #[error("unexpected stmt: {stmt:?}")]
    UnexpectedStmt { stmt: Stmt },
}

pub fn compile(program: &Program) -> Result<Chunk, CompileError> {
    let mut compiler = Compiler::default();
    for stmt in &program.stmts {
        compiler.compile_stmt(stmt)?;
    }

    log::debug!(
        "compiled {} bytes, {} constants",
        compiler.chunk.code().len(),
        compiler.chunk.constants().len()
    );
    Ok(compiler.chunk)
}

#[derive(Default)]
struct Compiler {
    chunk: Chunk,
}

impl Compiler {
    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Expr { value } => {
                self.compile_expr(value)?;
                // every expression statement leaves one value; drop it so
                // the next statement starts from a clean stack
                self.chunk.emit(Op::Pop, &[]);
                Ok(())
            }
            stmt => Err(CompileError::UnexpectedStmt { stmt: stmt.clone() }),
        }
    }

    fn compile_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Int(value) => {
                let index = self.chunk.add_constant(Value::Int(*value));
                self.chunk.emit(Op::Constant, &[index]);
                Ok(())
            }
            Expr::Str(value) => {
                let index = self.chunk.add_constant(Value::Str(value.clone()));
                self.chunk.emit(Op::Constant, &[index]);
                Ok(())
            }
            Expr::Bool(value) => {
                self.chunk.emit(if *value { Op::True } else { Op::False }, &[]);
                Ok(())
            }
            Expr::Infix { op, left, right } => {
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                let op = match op {
                    InfixOp::Add => Op::Add,
                    InfixOp::Sub => Op::Sub,
                    InfixOp::Mul => Op::Mul,
                    InfixOp::Div => Op::Div,
                    op => return Err(CompileError::UnknownOperator { op: *op }),
                };
                self.chunk.emit(op, &[]);
                Ok(())
            }
            expr => Err(CompileError::UnexpectedExpr { expr: expr.clone() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn compile_src(src: &str) -> Chunk {
        let (program, errors) = parse::parse(src);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        compile(&program).unwrap()
    }

    #[test]
    fn integer_arithmetic_layout() {
        let chunk = compile_src("1 + 2");

        assert_eq!(chunk.constants(), &[Value::Int(1), Value::Int(2)]);
        let expected = "0000 OpConstant 0\n\
                        0003 OpConstant 1\n\
                        0006 OpAdd\n\
                        0007 OpPop\n";
        assert_eq!(chunk.disassemble().unwrap(), expected);
    }

    #[test]
    fn each_expression_statement_pops() {
        let chunk = compile_src("1; 2;");

        let expected = "0000 OpConstant 0\n\
                        0003 OpPop\n\
                        0004 OpConstant 1\n\
                        0007 OpPop\n";
        assert_eq!(chunk.disassemble().unwrap(), expected);
    }

    #[test]
    fn booleans_have_dedicated_opcodes() {
        let chunk = compile_src("true; false");

        assert!(chunk.constants().is_empty());
        let expected = "0000 OpTrue\n\
                        0001 OpPop\n\
                        0002 OpFalse\n\
                        0003 OpPop\n";
        assert_eq!(chunk.disassemble().unwrap(), expected);
    }

    #[test]
    fn comparison_operators_are_not_compilable_yet() {
        let (program, _) = parse::parse("1 < 2");
        assert_eq!(
            compile(&program),
            Err(CompileError::UnknownOperator { op: InfixOp::Lt })
        );
    }

    #[test]
    fn let_statements_are_not_compilable_yet() {
        let (program, _) = parse::parse("let x = 1;");
        assert!(matches!(
            compile(&program),
            Err(CompileError::UnexpectedStmt { .. })
        ));
    }
}
