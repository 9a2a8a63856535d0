//! Tree-walking evaluator
//!
//! Runtime errors are first-class [`Value::Error`] values. Every evaluation
//! step that could have produced one checks its operand with
//! [`Value::is_error`] before going on, which is how errors short-circuit
//! without an exception mechanism.

pub mod builtins;
pub mod env;
pub mod expand;
pub mod object;

use rustc_hash::FxHashMap;

use crate::{
    eval::{
        env::{Environment, SharedEnv},
        object::Value,
    },
    syntax::ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt},
};

/// Evaluates a program top to bottom. A `return` unwraps to its inner value
/// here; an error aborts the rest of the program.
pub fn eval_program(program: &Program, env: &SharedEnv) -> Value {
    let mut result = Value::Null;
    for stmt in &program.stmts {
        match eval_stmt(stmt, env) {
            Value::Return(value) => return *value,
            err @ Value::Error(_) => return err,
            value => result = value,
        }
    }
    result
}

/// Unlike [`eval_program`] this keeps `Return` wrapped, so that a `return`
/// nested in an inner block still unwinds the enclosing function.
fn eval_block(block: &Block, env: &SharedEnv) -> Value {
    let mut result = Value::Null;
    for stmt in &block.stmts {
        match eval_stmt(stmt, env) {
            out @ (Value::Return(_) | Value::Error(_)) => return out,
            value => result = value,
        }
    }
    result
}

fn eval_stmt(stmt: &Stmt, env: &SharedEnv) -> Value {
    match stmt {
        Stmt::Let { name, value } => {
            let value = eval_expr(value, env);
            if value.is_error() {
                return value;
            }
            env.borrow_mut().set(name.clone(), value);
            Value::Null
        }
        Stmt::Return { value } => {
            let value = eval_expr(value, env);
            if value.is_error() {
                return value;
            }
            Value::Return(Box::new(value))
        }
        Stmt::Expr { value } => eval_expr(value, env),
    }
}

fn eval_expr(expr: &Expr, env: &SharedEnv) -> Value {
    match expr {
        Expr::Ident(name) => eval_ident(name, env),
        Expr::Int(value) => Value::Int(*value),
        Expr::Str(value) => Value::Str(value.clone()),
        Expr::Bool(value) => Value::Bool(*value),
        Expr::Prefix { op, right } => {
            let right = eval_expr(right, env);
            if right.is_error() {
                return right;
            }
            eval_prefix(*op, right)
        }
        Expr::Infix { op, left, right } => {
            let left = eval_expr(left, env);
            if left.is_error() {
                return left;
            }
            let right = eval_expr(right, env);
            if right.is_error() {
                return right;
            }
            eval_infix(*op, left, right)
        }
        Expr::If { cond, then, alt } => {
            let cond = eval_expr(cond, env);
            if cond.is_error() {
                return cond;
            }
            if cond.is_truthy() {
                eval_block(then, env)
            } else if let Some(alt) = alt {
                eval_block(alt, env)
            } else {
                Value::Null
            }
        }
        Expr::Func { params, body } => Value::Func {
            params: params.clone(),
            body: body.clone(),
            env: std::rc::Rc::clone(env),
        },
        Expr::Call { func, args } => {
            // `quote` suppresses evaluation of its argument, so it has to be
            // intercepted before the arguments are evaluated
            if let Expr::Ident(name) = func.as_ref() {
                if name == "quote" {
                    if args.len() != 1 {
                        return Value::Error(format!(
                            "wrong number of arguments. got={}, want=1",
                            args.len()
                        ));
                    }
                    return expand::quote(args[0].clone(), env);
                }
            }

            let func = eval_expr(func, env);
            if func.is_error() {
                return func;
            }
            let args = match eval_exprs(args, env) {
                Ok(args) => args,
                Err(err) => return err,
            };
            apply_function(func, args)
        }
        Expr::Array(elems) => match eval_exprs(elems, env) {
            Ok(elems) => Value::Array(elems),
            Err(err) => err,
        },
        Expr::Index { left, index } => {
            let left = eval_expr(left, env);
            if left.is_error() {
                return left;
            }
            let index = eval_expr(index, env);
            if index.is_error() {
                return index;
            }
            eval_index(left, index)
        }
        Expr::Hash(pairs) => eval_hash(pairs, env),
        Expr::Macro { .. } => {
            Value::Error("macro literals are only allowed in let statements".to_string())
        }
    }
}

fn eval_ident(name: &str, env: &SharedEnv) -> Value {
    if let Some(value) = env.borrow().get(name) {
        return value;
    }
    if let Some(builtin) = builtins::lookup(name) {
        return builtin;
    }
    Value::Error(format!("identifier not found: {}", name))
}

/// Left to right; the first error aborts the rest of the list.
fn eval_exprs(exprs: &[Expr], env: &SharedEnv) -> Result<Vec<Value>, Value> {
    let mut values = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let value = eval_expr(expr, env);
        if value.is_error() {
            return Err(value);
        }
        values.push(value);
    }
    Ok(values)
}

fn apply_function(func: Value, args: Vec<Value>) -> Value {
    match func {
        Value::Func { params, body, env } => {
            let call_env = Environment::enclosed(&env);
            for (param, arg) in params.iter().zip(args) {
                call_env.borrow_mut().set(param.clone(), arg);
            }
            match eval_block(&body, &call_env) {
                Value::Return(value) => *value,
                value => value,
            }
        }
        Value::Builtin(f) => f(args),
        other => Value::Error(format!("not a function: {}", other.type_name())),
    }
}

fn eval_prefix(op: PrefixOp, right: Value) -> Value {
    match op {
        PrefixOp::Bang => Value::Bool(!right.is_truthy()),
        PrefixOp::Minus => match right {
            Value::Int(value) => int_result(value.checked_neg()),
            other => Value::Error(format!("unknown operator: -{}", other.type_name())),
        },
    }
}

fn eval_infix(op: InfixOp, left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => eval_int_infix(op, l, r),
        (Value::Str(l), Value::Str(r)) => eval_str_infix(op, l, r),
        (l, r) if l.type_name() != r.type_name() => Value::Error(format!(
            "type mismatch: {} {} {}",
            l.type_name(),
            op,
            r.type_name()
        )),
        (l, r) => match op {
            InfixOp::Eq => Value::Bool(identity_eq(&l, &r)),
            InfixOp::NotEq => Value::Bool(!identity_eq(&l, &r)),
            _ => Value::Error(format!(
                "unknown operator: {} {} {}",
                l.type_name(),
                op,
                r.type_name()
            )),
        },
    }
}

/// Same-type comparison for everything that is not an integer or a string.
/// Booleans and nulls are singletons; any two other values are distinct.
fn identity_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

/// Arithmetic is checked; overflow (including `i64::MIN / -1`) is an error
/// value like every other evaluation failure, never a host panic.
fn eval_int_infix(op: InfixOp, left: i64, right: i64) -> Value {
    match op {
        InfixOp::Add => int_result(left.checked_add(right)),
        InfixOp::Sub => int_result(left.checked_sub(right)),
        InfixOp::Mul => int_result(left.checked_mul(right)),
        InfixOp::Div => {
            if right == 0 {
                Value::Error("division by zero".to_string())
            } else {
                int_result(left.checked_div(right))
            }
        }
        InfixOp::Lt => Value::Bool(left < right),
        InfixOp::Gt => Value::Bool(left > right),
        InfixOp::Eq => Value::Bool(left == right),
        InfixOp::NotEq => Value::Bool(left != right),
    }
}

fn int_result(value: Option<i64>) -> Value {
    match value {
        Some(value) => Value::Int(value),
        None => Value::Error("integer overflow".to_string()),
    }
}

/// Concatenation only. Comparison operators on strings are not part of the
/// language.
fn eval_str_infix(op: InfixOp, left: String, right: String) -> Value {
    match op {
        InfixOp::Add => Value::Str(left + &right),
        _ => Value::Error(format!("unknown operator: STRING {} STRING", op)),
    }
}

fn eval_index(left: Value, index: Value) -> Value {
    match (left, index) {
        (Value::Array(elems), Value::Int(i)) => {
            if i < 0 || i as usize >= elems.len() {
                Value::Null
            } else {
                elems[i as usize].clone()
            }
        }
        (Value::Hash(pairs), key) => {
            let Some(key) = key.hash_key() else {
                return Value::Error(format!("unusable as hash key: {}", key.type_name()));
            };
            match pairs.get(&key) {
                Some((_, value)) => value.clone(),
                None => Value::Null,
            }
        }
        (left, _) => Value::Error(format!(
            "index operator not supported: {}",
            left.type_name()
        )),
    }
}

fn eval_hash(pairs: &[(Expr, Expr)], env: &SharedEnv) -> Value {
    let mut out = FxHashMap::default();
    for (key_expr, value_expr) in pairs {
        let key = eval_expr(key_expr, env);
        if key.is_error() {
            return key;
        }
        let Some(hash_key) = key.hash_key() else {
            return Value::Error(format!("unusable as hash key: {}", key.type_name()));
        };
        let value = eval_expr(value_expr, env);
        if value.is_error() {
            return value;
        }
        // a duplicate key overwrites the earlier pair
        out.insert(hash_key, (key, value));
    }
    Value::Hash(out)
}
