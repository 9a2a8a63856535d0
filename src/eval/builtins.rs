//! Built-in functions

use crate::eval::object::{BuiltinFn, Value};

/// Built-ins resolve after environment lookup, so a `let len = ..` shadows
/// the built-in `len`.
pub fn lookup(name: &str) -> Option<Value> {
    let f: BuiltinFn = match name {
        "len" => len,
        "first" => first,
        "last" => last,
        "rest" => rest,
        "push" => push,
        "puts" => puts,
        _ => return None,
    };
    Some(Value::Builtin(f))
}

fn wrong_args(got: usize, want: usize) -> Value {
    Value::Error(format!(
        "wrong number of arguments. got={}, want={}",
        got, want
    ))
}

fn len(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_args(args.len(), 1);
    }
    match &args[0] {
        Value::Str(s) => Value::Int(s.len() as i64),
        Value::Array(elems) => Value::Int(elems.len() as i64),
        arg => Value::Error(format!(
            "argument to `len` not supported, got {}",
            arg.type_name()
        )),
    }
}

fn first(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_args(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elems) => elems.first().cloned().unwrap_or(Value::Null),
        arg => Value::Error(format!(
            "argument to `first` must be ARRAY, got {}",
            arg.type_name()
        )),
    }
}

fn last(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_args(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elems) => elems.last().cloned().unwrap_or(Value::Null),
        arg => Value::Error(format!(
            "argument to `last` must be ARRAY, got {}",
            arg.type_name()
        )),
    }
}

/// All but the first element, as a fresh array. `rest([])` is `null`.
fn rest(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_args(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elems) => {
            if elems.is_empty() {
                Value::Null
            } else {
                Value::Array(elems[1..].to_vec())
            }
        }
        arg => Value::Error(format!(
            "argument to `rest` must be ARRAY, got {}",
            arg.type_name()
        )),
    }
}

/// Returns a new array; the argument is left untouched.
fn push(args: Vec<Value>) -> Value {
    if args.len() != 2 {
        return wrong_args(args.len(), 2);
    }
    match &args[0] {
        Value::Array(elems) => {
            let mut elems = elems.clone();
            elems.push(args[1].clone());
            Value::Array(elems)
        }
        arg => Value::Error(format!(
            "argument to `push` must be ARRAY, got {}",
            arg.type_name()
        )),
    }
}

fn puts(args: Vec<Value>) -> Value {
    for arg in &args {
        println!("{}", arg);
    }
    Value::Null
}
