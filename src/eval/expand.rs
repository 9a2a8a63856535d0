//! Compile-time macros: `quote`/`unquote` and the two expansion passes
//!
//! Expansion is unhygienic. Macro arguments are bound unevaluated, as
//! [`Value::Quote`] fragments, and whatever AST the macro body returns is
//! spliced into the program verbatim.

use thiserror::Error;

use crate::{
    eval::{
        env::{Environment, SharedEnv},
        object::Value,
    },
    syntax::ast::{self, Expr, Program},
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpandError {
    #[error("we only support returning AST nodes from macros")]
    NonQuoteResult,
}

/// First pass: removes every top-level `let <name> = macro(..) {..};` from
/// the program and registers the macro in `env`. Macro literals anywhere
/// else are left alone (and will fail at evaluation time).
pub fn define_macros(program: &mut Program, env: &SharedEnv) {
    program.stmts.retain(|stmt| {
        let ast::Stmt::Let {
            name,
            value: Expr::Macro { params, body },
        } = stmt
        else {
            return true;
        };

        log::debug!("registering macro `{}`", name);
        env.borrow_mut().set(
            name.clone(),
            Value::Macro {
                params: params.clone(),
                body: body.clone(),
                env: std::rc::Rc::clone(env),
            },
        );
        false
    });
}

/// Second pass: rewrites every call to a registered macro into the AST its
/// body returns. The rewrite is bottom-up, so arguments that are themselves
/// macro calls are expanded before the outer macro sees them.
pub fn expand_macros(program: Program, env: &SharedEnv) -> Result<Program, ExpandError> {
    let mut failure = None;

    let program = ast::modify_program(program, &mut |expr| {
        if failure.is_some() {
            return expr;
        }

        let found = match &expr {
            Expr::Call { func, args } => match func.as_ref() {
                Expr::Ident(name) => match env.borrow().get(name) {
                    Some(Value::Macro { params, body, env }) => {
                        log::debug!("expanding macro call `{}`", name);
                        Some((params, body, env, args.clone()))
                    }
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        };
        let Some((params, body, macro_env, args)) = found else {
            return expr;
        };

        let call_env = Environment::enclosed(&macro_env);
        for (param, arg) in params.iter().zip(args) {
            call_env.borrow_mut().set(param.clone(), Value::Quote(arg));
        }

        match super::eval_block(&body, &call_env) {
            Value::Quote(node) => node,
            _ => {
                failure = Some(ExpandError::NonQuoteResult);
                expr
            }
        }
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(program),
    }
}

/// Implements the `quote(..)` special form: captures the argument as an AST
/// fragment after splicing in every `unquote(..)` found inside it.
pub(super) fn quote(expr: Expr, env: &SharedEnv) -> Value {
    Value::Quote(eval_unquote_calls(expr, env))
}

fn eval_unquote_calls(expr: Expr, env: &SharedEnv) -> Expr {
    ast::modify_expr(expr, &mut |expr| match expr {
        Expr::Call { func, args } if is_unquote(&func, &args) => {
            match value_to_expr(super::eval_expr(&args[0], env)) {
                Some(node) => node,
                // result has no AST form; leave the call in place
                None => Expr::Call { func, args },
            }
        }
        expr => expr,
    })
}

fn is_unquote(func: &Expr, args: &[Expr]) -> bool {
    matches!(func, Expr::Ident(name) if name == "unquote") && args.len() == 1
}

/// Converts an evaluation result back into syntax. Only values with an
/// obvious literal form make the trip; a quoted fragment splices as-is.
fn value_to_expr(value: Value) -> Option<Expr> {
    match value {
        Value::Int(v) => Some(Expr::Int(v)),
        Value::Bool(v) => Some(Expr::Bool(v)),
        Value::Str(v) => Some(Expr::Str(v)),
        Value::Quote(node) => Some(node),
        _ => None,
    }
}
