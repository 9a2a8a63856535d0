//! VM execution, and its agreement with the evaluator

use monkey::{
    compile,
    eval::{self, env::Environment, object::Value},
    syntax::parse,
    vm::{
        code::{Chunk, Op},
        Vm, VmError,
    },
};

fn run_vm(src: &str) -> Result<Vm, VmError> {
    let (program, errors) = parse::parse(src);
    assert!(errors.is_empty(), "parse errors for {:?}: {:?}", src, errors);
    let chunk = compile::compile(&program).unwrap();

    let mut vm = Vm::new(chunk);
    vm.run()?;
    Ok(vm)
}

fn assert_last_popped(src: &str, expected: Value) {
    let vm = run_vm(src).unwrap();
    assert_eq!(vm.last_popped(), &expected, "in {:?}", src);
    // a well-formed chunk leaves the stack balanced
    assert_eq!(vm.sp(), 0, "in {:?}", src);
}

#[test]
fn integer_arithmetic() {
    let cases = [
        ("1", 1),
        ("2", 2),
        ("1 + 2", 3),
        ("1 - 2", -1),
        ("1 * 2", 2),
        ("4 / 2", 2),
        ("50 / 2 * 2 + 10 - 5", 55),
        ("5 + 5 + 5 + 5 - 10", 10),
        ("2 * 2 * 2 * 2 * 2", 32),
        ("5 * 2 + 10", 20),
        ("5 + 2 * 10", 25),
        ("5 * (2 + 10)", 60),
        ("7 / 2", 3),
    ];
    for (src, expected) in cases {
        assert_last_popped(src, Value::Int(expected));
    }
}

#[test]
fn booleans() {
    assert_last_popped("true", Value::Bool(true));
    assert_last_popped("false", Value::Bool(false));
}

#[test]
fn strings() {
    assert_last_popped(r#""monkey""#, Value::Str("monkey".to_string()));
}

#[test]
fn last_popped_is_the_final_statement() {
    assert_last_popped("1; 2;", Value::Int(2));
    assert_last_popped("1; 2; 3", Value::Int(3));
}

#[test]
fn type_errors_surface_as_vm_errors() {
    assert_eq!(
        run_vm("true + false").unwrap_err(),
        VmError::UnsupportedTypes {
            left: "BOOLEAN",
            right: "BOOLEAN",
        }
    );
    assert_eq!(
        run_vm("1 + true").unwrap_err(),
        VmError::UnsupportedTypes {
            left: "INTEGER",
            right: "BOOLEAN",
        }
    );
    assert_eq!(run_vm("1 / 0").unwrap_err(), VmError::DivisionByZero);
}

#[test]
fn arithmetic_overflow_is_a_vm_error() {
    assert_eq!(
        run_vm("9223372036854775807 + 1").unwrap_err(),
        VmError::IntegerOverflow
    );
    assert_eq!(
        run_vm("9223372036854775807 * 2").unwrap_err(),
        VmError::IntegerOverflow
    );

    // i64::MIN is not expressible as a literal; build the chunk directly
    let mut chunk = Chunk::default();
    let min = chunk.add_constant(Value::Int(i64::MIN));
    let minus_one = chunk.add_constant(Value::Int(-1));
    chunk.emit(Op::Constant, &[min]);
    chunk.emit(Op::Constant, &[minus_one]);
    chunk.emit(Op::Div, &[]);
    chunk.emit(Op::Pop, &[]);

    let mut vm = Vm::new(chunk);
    assert_eq!(vm.run(), Err(VmError::IntegerOverflow));
}

/// The driver expands macros before compiling; a macro call that expands to
/// arithmetic must be compilable.
#[test]
fn macros_expand_before_compilation() {
    let (mut program, errors) = parse::parse(
        "let plus = macro(a, b) { quote(unquote(a) + unquote(b)); };
         plus(1, 2 * 3);",
    );
    assert!(errors.is_empty(), "parse errors: {:?}", errors);

    let macro_env = Environment::shared();
    monkey::eval::expand::define_macros(&mut program, &macro_env);
    let program = monkey::eval::expand::expand_macros(program, &macro_env).unwrap();

    let chunk = compile::compile(&program).unwrap();
    let mut vm = Vm::new(chunk);
    vm.run().unwrap();
    assert_eq!(vm.last_popped(), &Value::Int(7));
}

/// Both engines must produce the same value for everything both can run.
#[test]
fn vm_agrees_with_evaluator() {
    let sources = [
        "1 + 2 * 3",
        "(1 + 2) * 3",
        "50 / 2 * 2 + 10 - 5",
        "7 - 0",
        "true",
        "false",
        r#""monkey""#,
        "1; 2; 3 * 4",
    ];

    for src in sources {
        let vm = run_vm(src).unwrap();

        let (program, _) = parse::parse(src);
        let evaluated = eval::eval_program(&program, &Environment::shared());

        assert_eq!(vm.last_popped(), &evaluated, "in {:?}", src);
    }
}
