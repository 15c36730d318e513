use pretty_assertions::assert_eq;

use super::{parse, ParseError};
use crate::ast::{base_name, BinOp, CmpOp, ExprKind, FunctionDef, StmtKind};

#[test]
fn test_parse_assignment() {
    let program = parse("x = 1\n").unwrap();
    assert_eq!(program.body.len(), 1);
    match &program.body[0].kind {
        StmtKind::Assign { target, value } => {
            assert!(matches!(&target.kind, ExprKind::Name(n) if n == "x"));
            assert!(matches!(value.kind, ExprKind::Int(1)));
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_parse_precedence() {
    let program = parse("y = x * x + x\n").unwrap();
    let StmtKind::Assign { value, .. } = &program.body[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Binary { op, left, .. } = &value.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(*op, BinOp::Add);
    assert!(matches!(
        left.kind,
        ExprKind::Binary { op: BinOp::Mul, .. }
    ));
}

#[test]
fn test_parse_comparison() {
    let program = parse("b = x + 1 < y\n").unwrap();
    let StmtKind::Assign { value, .. } = &program.body[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Compare { op, left, .. } = &value.kind else {
        panic!("expected comparison");
    };
    assert_eq!(*op, CmpOp::Lt);
    assert!(matches!(
        left.kind,
        ExprKind::Binary { op: BinOp::Add, .. }
    ));
}

#[test]
fn test_parse_function_with_decorators() {
    let source = "@audit\n@optimize\nfn f(x, y)\n    return x + y\nendfn\n";
    let program = parse(source).unwrap();
    let StmtKind::FunctionDef(FunctionDef {
        name,
        params,
        decorators,
        body,
        ..
    }) = &program.body[0].kind
    else {
        panic!("expected function definition");
    };
    assert_eq!(name, "f");
    assert_eq!(params, &["x".to_string(), "y".to_string()]);
    assert_eq!(decorators.len(), 2);
    assert_eq!(base_name(&decorators[0]), Some("audit"));
    assert_eq!(base_name(&decorators[1]), Some("optimize"));
    assert_eq!(body.len(), 1);
    assert!(matches!(body[0].kind, StmtKind::Return { .. }));
}

#[test]
fn test_parse_dotted_and_call_decorators() {
    let source = "@tools.audit\n@memo(3)\nfn f(x)\n    return x\nendfn\n";
    let program = parse(source).unwrap();
    let StmtKind::FunctionDef(def) = &program.body[0].kind else {
        panic!("expected function definition");
    };
    assert_eq!(base_name(&def.decorators[0]), Some("audit"));
    assert_eq!(base_name(&def.decorators[1]), Some("memo"));
}

#[test]
fn test_parse_augmented_assignment() {
    let program = parse("x += 2\nx *= 3\n").unwrap();
    assert!(matches!(
        program.body[0].kind,
        StmtKind::AugAssign { op: BinOp::Add, .. }
    ));
    assert!(matches!(
        program.body[1].kind,
        StmtKind::AugAssign { op: BinOp::Mul, .. }
    ));
}

#[test]
fn test_parse_if_else() {
    let source = "if x > 0\n    y = 1\nelse\n    y = 2\nendif\n";
    let program = parse(source).unwrap();
    let StmtKind::If {
        then_body,
        else_body,
        ..
    } = &program.body[0].kind
    else {
        panic!("expected if statement");
    };
    assert_eq!(then_body.len(), 1);
    assert_eq!(else_body.as_ref().map(Vec::len), Some(1));
}

#[test]
fn test_parse_while() {
    let source = "while i < 10\n    i += 1\nendwhile\n";
    let program = parse(source).unwrap();
    let StmtKind::While { body, .. } = &program.body[0].kind else {
        panic!("expected while statement");
    };
    assert_eq!(body.len(), 1);
}

#[test]
fn test_parse_postfix_chain() {
    let program = parse("v = data[0].len\n").unwrap();
    let StmtKind::Assign { value, .. } = &program.body[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Property { object, name } = &value.kind else {
        panic!("expected property access");
    };
    assert_eq!(name, "len");
    assert!(matches!(object.kind, ExprKind::Index { .. }));
}

#[test]
fn test_parse_list_and_call() {
    let program = parse("v = array([1, 2, 3])\n").unwrap();
    let StmtKind::Assign { value, .. } = &program.body[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Call { callee, args } = &value.kind else {
        panic!("expected call");
    };
    assert!(matches!(&callee.kind, ExprKind::Name(n) if n == "array"));
    assert!(matches!(&args[0].kind, ExprKind::List(elements) if elements.len() == 3));
}

#[test]
fn test_parse_lvalue_forms() {
    let program = parse("a = 1\nb.c = 1\nd[0] = 1\n").unwrap();
    for stmt in &program.body {
        let StmtKind::Assign { target, .. } = &stmt.kind else {
            panic!("expected assignment");
        };
        assert!(target.is_lvalue());
    }
}

#[test]
fn test_parse_rejects_assignment_to_literal() {
    let err = parse("1 = 2\n").unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
}

#[test]
fn test_parse_rejects_unterminated_block() {
    let err = parse("fn f(x)\n    return x\n").unwrap_err();
    let ParseError::Syntax { message, .. } = err;
    assert!(message.contains("end of input"), "message: {message}");
}

#[test]
fn test_parse_comments_and_blank_lines() {
    let source = "# header\n\nx = 1  # trailing\n\n\ny = 2\n";
    let program = parse(source).unwrap();
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_spans_are_recorded() {
    let source = "x = 1\n\nfn f(a)\n    return a\nendfn\n";
    let program = parse(source).unwrap();
    assert_eq!(program.body[0].span.line, 1);
    assert_eq!(program.body[1].span.line, 3);
    let StmtKind::FunctionDef(def) = &program.body[1].kind else {
        panic!("expected function definition");
    };
    assert_eq!(def.body[0].span.line, 4);
}

#[test]
fn test_span_of_decorated_function_starts_at_decorator() {
    let source = "\n@optimize\nfn f(a)\n    return a\nendfn\n";
    let program = parse(source).unwrap();
    assert_eq!(program.body[0].span.line, 2);
}

#[test]
fn test_parse_float_and_string_literals() {
    let program = parse("a = 2.5\nb = \"hi\\n\"\n").unwrap();
    let StmtKind::Assign { value, .. } = &program.body[0].kind else {
        panic!("expected assignment");
    };
    assert!(matches!(value.kind, ExprKind::Float(x) if x == 2.5));
    let StmtKind::Assign { value, .. } = &program.body[1].kind else {
        panic!("expected assignment");
    };
    assert!(matches!(&value.kind, ExprKind::Str(s) if s == "hi\n"));
}
