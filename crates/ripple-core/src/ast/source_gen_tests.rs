// Tests for source regeneration

use pretty_assertions::assert_eq;

use super::{StmtKind, ToSource};
use crate::parser;

#[test]
fn test_function_to_source() {
    let source = "@optimize\nfn scale(x, k)\n    v = array(x)\n    return v * k\nendfn\n";
    let program = parser::parse(source).unwrap();
    let StmtKind::FunctionDef(def) = &program.body[0].kind else {
        panic!("expected function definition");
    };
    let out = def.to_source();
    assert!(out.starts_with("@optimize\nfn scale(x, k)\n"));
    assert!(out.contains("    v = array(x)\n"));
    assert!(out.ends_with("endfn\n"));
}

#[test]
fn test_compound_operands_are_parenthesized() {
    let program = parser::parse("y = x * x + x\n").unwrap();
    assert_eq!(program.to_source(), "y = (x * x) + x\n");
}

#[test]
fn test_control_flow_to_source() {
    let source = "\
if n > 0
    total += n
else
    total = 0 - n
endif
while total > 10
    total /= 2
endwhile
";
    let program = parser::parse(source).unwrap();
    let out = program.to_source();
    assert!(out.contains("if n > 0\n    total += n\nelse\n"));
    assert!(out.contains("while total > 10\n    total /= 2\nendwhile\n"));
}

#[test]
fn test_literals_round_trip_distinctly() {
    let program = parser::parse("a = 2.0\nb = 2\nc = \"x\\ny\"\nd = null\n").unwrap();
    let out = program.to_source();
    assert_eq!(out, "a = 2.0\nb = 2\nc = \"x\\ny\"\nd = null\n");
}

#[test]
fn test_regenerated_source_reparses_to_fixed_point() {
    let source = "\
@optimize
fn f(x)
    if x.len > 2
        x[0] = 1.5
    endif
    return x * x + (x - 1)
endfn
f(array([1, 2, 3]))
";
    let program = parser::parse(source).unwrap();
    let once = program.to_source();
    let reparsed = parser::parse(&once).unwrap();
    assert_eq!(reparsed.to_source(), once);
}
