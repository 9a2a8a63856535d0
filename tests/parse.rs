//! Parser structure and precedence tests, checked through AST rendering

use monkey::syntax::{
    ast::{Expr, Program, Stmt},
    parse::{self, ParseErrorKind},
};

fn parse_ok(src: &str) -> Program {
    let (program, errors) = parse::parse(src);
    assert!(errors.is_empty(), "parse errors for {:?}: {:?}", src, errors);
    program
}

fn parse_single_expr(src: &str) -> Expr {
    let mut program = parse_ok(src);
    assert_eq!(program.stmts.len(), 1, "in {:?}", src);
    match program.stmts.remove(0) {
        Stmt::Expr { value } => value,
        stmt => panic!("not an expression statement: {:?}", stmt),
    }
}

#[test]
fn operator_precedence_rendering() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("3 + 4; -5 * 5", "(3 + 4)((-5) * 5)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
        (
            "3 + 4 * 5 == 3 * 1 + 4 * 5",
            "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))",
        ),
        ("true", "true"),
        ("3 > 5 == false", "((3 > 5) == false)"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("2 / (5 + 5)", "(2 / (5 + 5))"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
        (
            "a * [1, 2, 3, 4][b * c] * d",
            "((a * ([1, 2, 3, 4][(b * c)])) * d)",
        ),
        (
            "add(a * b[2], b[1], 2 * [1, 2][1])",
            "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))",
        ),
    ];

    for (src, expected) in cases {
        assert_eq!(parse_ok(src).to_string(), expected, "in {:?}", src);
    }
}

#[test]
fn let_statements() {
    let program = parse_ok("let x = 5; let y = true; let foobar = y;");
    assert_eq!(
        program.stmts,
        vec![
            Stmt::Let {
                name: "x".to_string(),
                value: Expr::Int(5),
            },
            Stmt::Let {
                name: "y".to_string(),
                value: Expr::Bool(true),
            },
            Stmt::Let {
                name: "foobar".to_string(),
                value: Expr::Ident("y".to_string()),
            },
        ]
    );
}

#[test]
fn return_statements() {
    let program = parse_ok("return 5; return foobar;");
    assert_eq!(
        program.stmts,
        vec![
            Stmt::Return { value: Expr::Int(5) },
            Stmt::Return {
                value: Expr::Ident("foobar".to_string()),
            },
        ]
    );
}

#[test]
fn semicolons_are_optional_after_expressions() {
    let program = parse_ok("x\ny;");
    assert_eq!(program.stmts.len(), 2);
}

#[test]
fn if_expression() {
    let expr = parse_single_expr("if (x < y) { x } else { y }");
    assert_eq!(expr.to_string(), "if(x < y) x else y");

    let Expr::If { alt, .. } = parse_single_expr("if (x < y) { x }") else {
        panic!("not an if");
    };
    assert!(alt.is_none());
}

#[test]
fn function_literal() {
    let expr = parse_single_expr("fn(x, y) { x + y; }");
    let Expr::Func { params, body } = expr else {
        panic!("not a function literal");
    };
    assert_eq!(params, vec!["x".to_string(), "y".to_string()]);
    assert_eq!(body.to_string(), "(x + y)");

    let Expr::Func { params, .. } = parse_single_expr("fn() {}") else {
        panic!("not a function literal");
    };
    assert!(params.is_empty());
}

#[test]
fn macro_literal() {
    let expr = parse_single_expr("macro(x, y) { x + y; }");
    let Expr::Macro { params, body } = expr else {
        panic!("not a macro literal");
    };
    assert_eq!(params, vec!["x".to_string(), "y".to_string()]);
    assert_eq!(body.to_string(), "(x + y)");
}

#[test]
fn string_literal() {
    assert_eq!(
        parse_single_expr(r#""hello world""#),
        Expr::Str("hello world".to_string())
    );
}

#[test]
fn array_and_index() {
    let expr = parse_single_expr("[1, 2 * 2, 3 + 3]");
    assert_eq!(expr.to_string(), "[1, (2 * 2), (3 + 3)]");

    let expr = parse_single_expr("myArray[1 + 1]");
    assert_eq!(expr.to_string(), "(myArray[(1 + 1)])");

    assert_eq!(parse_single_expr("[]"), Expr::Array(vec![]));
}

#[test]
fn hash_literals() {
    let expr = parse_single_expr(r#"{"one": 1, "two": 2, "three": 3}"#);
    let Expr::Hash(pairs) = expr else {
        panic!("not a hash literal");
    };
    assert_eq!(
        pairs,
        vec![
            (Expr::Str("one".to_string()), Expr::Int(1)),
            (Expr::Str("two".to_string()), Expr::Int(2)),
            (Expr::Str("three".to_string()), Expr::Int(3)),
        ]
    );

    assert_eq!(parse_single_expr("{}"), Expr::Hash(vec![]));

    // keys and values can be arbitrary expressions
    let expr = parse_single_expr(r#"{"one": 0 + 1, "two": 10 - 8}"#);
    assert_eq!(expr.to_string(), "{one:(0 + 1), two:(10 - 8)}");
}

#[test]
fn error_messages_and_recovery() {
    let (_, errors) = parse::parse("let x 5; let = 10; let 838383;");
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "expected next token to be ASSIGN, got INT instead",
            "expected next token to be IDENT, got ASSIGN instead",
            // after the bad `let =` the parser resynchronizes on `=` itself
            "no prefix parse function for ASSIGN found",
            "expected next token to be IDENT, got INT instead",
        ]
    );
}

#[test]
fn missing_prefix_parse_fn() {
    let (_, errors) = parse::parse("+ 5");
    assert!(matches!(
        errors[0].kind,
        ParseErrorKind::NoPrefixParseFn { .. }
    ));
}

#[test]
fn integer_overflow_is_a_diagnostic() {
    let (_, errors) = parse::parse("99999999999999999999999");
    assert!(matches!(
        errors[0].kind,
        ParseErrorKind::BadIntLiteral { .. }
    ));
}

/// Rendering a program and parsing the result is a fixed point.
#[test]
fn render_parse_render_is_stable() {
    let sources = [
        "let x = 1 + 2 * 3;",
        "return -a * b;",
        "add(a, b * c)[d]",
        "[1, 2, true][0]",
        "{1: 2 * 3}",
    ];

    for src in sources {
        let first = parse_ok(src).to_string();
        let second = parse_ok(&first).to_string();
        assert_eq!(first, second, "in {:?}", src);
    }
}
