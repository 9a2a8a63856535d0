//! AST node types, their text rendering, and the generic tree rewrite

use std::fmt;

use itertools::Itertools;

/// Root of the AST
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `let <name> = <value>;`
    Let { name: String, value: Expr },
    /// `return <value>;`
    Return { value: Expr },
    /// A bare expression in statement position
    Expr { value: Expr },
}

/// Statement list between `{` and `}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(String),
    Int(i64),
    Str(String),
    Bool(bool),
    Prefix {
        op: PrefixOp,
        right: Box<Expr>,
    },
    Infix {
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then: Block,
        alt: Option<Block>,
    },
    Func {
        params: Vec<String>,
        body: Block,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Array(Vec<Expr>),
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
    /// Key/value pairs in source order
    Hash(Vec<(Expr, Expr)>),
    Macro {
        params: Vec<String>,
        body: Block,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Bang,
    Minus,
}

impl PrefixOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefixOp::Bang => "!",
            PrefixOp::Minus => "-",
        }
    }
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Eq,
    NotEq,
}

impl InfixOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
        }
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.stmts {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let { name, value } => write!(f, "let {} = {};", name, value),
            Stmt::Return { value } => write!(f, "return {};", value),
            Stmt::Expr { value } => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.stmts {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => f.write_str(name),
            Expr::Int(value) => write!(f, "{}", value),
            Expr::Str(value) => f.write_str(value),
            Expr::Bool(value) => write!(f, "{}", value),
            Expr::Prefix { op, right } => write!(f, "({}{})", op, right),
            Expr::Infix { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::If { cond, then, alt } => {
                write!(f, "if{} {}", cond, then)?;
                if let Some(alt) = alt {
                    write!(f, " else {}", alt)?;
                }
                Ok(())
            }
            Expr::Func { params, body } => {
                write!(f, "fn({}) {}", params.iter().join(", "), body)
            }
            Expr::Call { func, args } => {
                write!(f, "{}({})", func, args.iter().join(", "))
            }
            Expr::Array(elems) => write!(f, "[{}]", elems.iter().join(", ")),
            Expr::Index { left, index } => write!(f, "({}[{}])", left, index),
            Expr::Hash(pairs) => {
                let pairs = pairs.iter().map(|(k, v)| format!("{}:{}", k, v)).join(", ");
                write!(f, "{{{}}}", pairs)
            }
            Expr::Macro { params, body } => {
                write!(f, "macro({}) {}", params.iter().join(", "), body)
            }
        }
    }
}

/// Rewrites a program bottom-up: every expression is replaced by
/// `f(expression)` after its own children have already been rewritten.
///
/// Both the macro expander and the `unquote` substitution are built on this;
/// the bottom-up order is what lets a transform see fully rewritten children.
pub fn modify_program<F>(program: Program, f: &mut F) -> Program
where
    F: FnMut(Expr) -> Expr,
{
    Program {
        stmts: program
            .stmts
            .into_iter()
            .map(|stmt| modify_stmt(stmt, f))
            .collect(),
    }
}

pub fn modify_expr<F>(expr: Expr, f: &mut F) -> Expr
where
    F: FnMut(Expr) -> Expr,
{
    let expr = match expr {
        Expr::Prefix { op, right } => Expr::Prefix {
            op,
            right: Box::new(modify_expr(*right, f)),
        },
        Expr::Infix { op, left, right } => Expr::Infix {
            op,
            left: Box::new(modify_expr(*left, f)),
            right: Box::new(modify_expr(*right, f)),
        },
        Expr::If { cond, then, alt } => Expr::If {
            cond: Box::new(modify_expr(*cond, f)),
            then: modify_block(then, f),
            alt: alt.map(|alt| modify_block(alt, f)),
        },
        Expr::Func { params, body } => Expr::Func {
            params,
            body: modify_block(body, f),
        },
        Expr::Call { func, args } => Expr::Call {
            func: Box::new(modify_expr(*func, f)),
            args: args.into_iter().map(|arg| modify_expr(arg, f)).collect(),
        },
        Expr::Array(elems) => {
            Expr::Array(elems.into_iter().map(|e| modify_expr(e, f)).collect())
        }
        Expr::Index { left, index } => Expr::Index {
            left: Box::new(modify_expr(*left, f)),
            index: Box::new(modify_expr(*index, f)),
        },
        Expr::Hash(pairs) => Expr::Hash(
            pairs
                .into_iter()
                .map(|(k, v)| (modify_expr(k, f), modify_expr(v, f)))
                .collect(),
        ),
        // leaves, and macro literals whose bodies stay untouched until expansion
        expr => expr,
    };

    f(expr)
}

fn modify_stmt<F>(stmt: Stmt, f: &mut F) -> Stmt
where
    F: FnMut(Expr) -> Expr,
{
    match stmt {
        Stmt::Let { name, value } => Stmt::Let {
            name,
            value: modify_expr(value, f),
        },
        Stmt::Return { value } => Stmt::Return {
            value: modify_expr(value, f),
        },
        Stmt::Expr { value } => Stmt::Expr {
            value: modify_expr(value, f),
        },
    }
}

fn modify_block<F>(block: Block, f: &mut F) -> Block
where
    F: FnMut(Expr) -> Expr,
{
    Block {
        stmts: block
            .stmts
            .into_iter()
            .map(|stmt| modify_stmt(stmt, f))
            .collect(),
    }
}
