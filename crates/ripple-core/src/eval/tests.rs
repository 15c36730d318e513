use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::{EvalError, Interpreter, Value};

fn interp() -> Interpreter {
    Interpreter::new()
}

fn captured(interp: &mut Interpreter) -> Rc<RefCell<Vec<String>>> {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = lines.clone();
    interp.set_print_hook(move |line| sink.borrow_mut().push(line.to_string()));
    lines
}

#[test]
fn test_arithmetic_with_promotion() {
    let mut interp = interp();
    assert_eq!(interp.run("1 + 2 * 3\n", "<test>").unwrap(), Value::Int(7));
    assert_eq!(
        interp.run("1 + 2.5\n", "<test>").unwrap(),
        Value::Float(3.5)
    );
    assert_eq!(
        interp.run("(1 + 2) * 3\n", "<test>").unwrap(),
        Value::Int(9)
    );
}

#[test]
fn test_division_by_zero() {
    let mut interp = interp();
    let err = interp.run("1 / 0\n", "<test>").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::DivisionByZero)
    ));
}

#[test]
fn test_string_concat() {
    let mut interp = interp();
    assert_eq!(
        interp.run("\"ab\" + \"cd\"\n", "<test>").unwrap(),
        Value::Str("abcd".to_string())
    );
}

#[test]
fn test_array_elementwise_and_broadcast() {
    let mut interp = interp();
    assert_eq!(
        interp.run("array([1, 2, 3]) + array([10, 20, 30])\n", "<test>").unwrap(),
        Value::array(vec![11.0, 22.0, 33.0])
    );
    assert_eq!(
        interp.run("array([1, 2, 3]) * 2\n", "<test>").unwrap(),
        Value::array(vec![2.0, 4.0, 6.0])
    );
    assert_eq!(
        interp.run("10 - array([1, 2])\n", "<test>").unwrap(),
        Value::array(vec![9.0, 8.0])
    );
}

#[test]
fn test_array_length_mismatch() {
    let mut interp = interp();
    let err = interp
        .run("array([1, 2]) + array([1, 2, 3])\n", "<test>")
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::LengthMismatch { left: 2, right: 3 })
    ));
}

#[test]
fn test_assignment_aliases_arrays() {
    let mut interp = interp();
    let source = "a = array([1, 2, 3])\nb = a\nb += 1\na\n";
    let result = interp.run(source, "<test>").unwrap();
    // b aliases a's storage, so the in-place update shows through a.
    assert_eq!(result, Value::array(vec![2.0, 3.0, 4.0]));
}

#[test]
fn test_copy_breaks_aliasing() {
    let mut interp = interp();
    let source = "a = array([1, 2, 3])\nb = copy(a)\nb += 1\na\n";
    let result = interp.run(source, "<test>").unwrap();
    assert_eq!(result, Value::array(vec![1.0, 2.0, 3.0]));
}

#[test]
fn test_aug_assign_with_self_on_both_sides() {
    let mut interp = interp();
    let source = "a = array([1, 2, 3])\na += a\na\n";
    let result = interp.run(source, "<test>").unwrap();
    assert_eq!(result, Value::array(vec![2.0, 4.0, 6.0]));
}

#[test]
fn test_scalar_aug_assign_rebinds() {
    let mut interp = interp();
    assert_eq!(
        interp.run("x = 4\nx *= 3\nx\n", "<test>").unwrap(),
        Value::Int(12)
    );
}

#[test]
fn test_index_read_and_write() {
    let mut interp = interp();
    let source = "a = array([1, 2, 3])\na[1] = 9\na[1] + a[2]\n";
    assert_eq!(interp.run(source, "<test>").unwrap(), Value::Float(12.0));
}

#[test]
fn test_index_out_of_range() {
    let mut interp = interp();
    let err = interp
        .run("a = array([1])\na[5]\n", "<test>")
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::IndexOutOfRange { index: 5, len: 1 })
    ));
}

#[test]
fn test_len_property_and_builtin() {
    let mut interp = interp();
    assert_eq!(
        interp.run("a = array([1, 2, 3])\na.len\n", "<test>").unwrap(),
        Value::Int(3)
    );
    assert_eq!(
        interp.run("len(\"hello\")\n", "<test>").unwrap(),
        Value::Int(5)
    );
}

#[test]
fn test_function_definition_and_call() {
    let mut interp = interp();
    let source = "fn add(a, b)\n    return a + b\nendfn\nadd(2, 3)\n";
    assert_eq!(interp.run(source, "<test>").unwrap(), Value::Int(5));
}

#[test]
fn test_function_without_return_yields_null() {
    let mut interp = interp();
    let source = "fn noop(x)\n    x = x + 1\nendfn\nnoop(1)\n";
    assert_eq!(interp.run(source, "<test>").unwrap(), Value::Null);
}

#[test]
fn test_while_loop_and_if() {
    let mut interp = interp();
    let source = "\
fn sum_to(n)
    total = 0
    i = 1
    while i <= n
        total += i
        i += 1
    endwhile
    if total > 100
        return total
    else
        return 0 - total
    endif
endfn
sum_to(5)
";
    assert_eq!(interp.run(source, "<test>").unwrap(), Value::Int(-15));
}

#[test]
fn test_function_sees_globals() {
    let mut interp = interp();
    let source = "base = 10\nfn bump(x)\n    return base + x\nendfn\nbump(5)\n";
    assert_eq!(interp.run(source, "<test>").unwrap(), Value::Int(15));
}

#[test]
fn test_assignment_in_function_stays_local() {
    let mut interp = interp();
    let source = "y = 1\nfn shadow(x)\n    y = x\n    return y\nendfn\nshadow(9)\ny\n";
    assert_eq!(interp.run(source, "<test>").unwrap(), Value::Int(1));
}

#[test]
fn test_return_outside_function() {
    let mut interp = interp();
    let err = interp.run("return 1\n", "<test>").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::ReturnOutsideFunction)
    ));
}

#[test]
fn test_unknown_variable() {
    let mut interp = interp();
    let err = interp.run("missing + 1\n", "<test>").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::VariableNotFound { name }) if name == "missing"
    ));
}

#[test]
fn test_print_goes_through_hook() {
    let mut interp = interp();
    let lines = captured(&mut interp);
    interp
        .run("print(\"hello\", 1 + 1)\n", "<test>")
        .unwrap();
    assert_eq!(*lines.borrow(), vec!["hello 2".to_string()]);
}

#[test]
fn test_decorator_application_order() {
    let mut interp = interp();
    let order = Rc::new(RefCell::new(Vec::new()));

    let seen = order.clone();
    interp.register_decorator("first", move |_, value| {
        seen.borrow_mut().push("first");
        Ok(value)
    });
    let seen = order.clone();
    interp.register_decorator("second", move |_, value| {
        seen.borrow_mut().push("second");
        Ok(value)
    });

    let source = "@first\n@second\nfn f(x)\n    return x\nendfn\n";
    interp.run(source, "<test>").unwrap();
    // Bottom-up: the decorator nearest the definition applies first.
    assert_eq!(*order.borrow(), vec!["second", "first"]);
}

#[test]
fn test_unknown_decorator() {
    let mut interp = interp();
    let err = interp
        .run("@nope\nfn f(x)\n    return x\nendfn\n", "<test>")
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::UnknownDecorator { name }) if name == "nope"
    ));
}

#[test]
fn test_function_value_introspection() {
    let mut interp = interp();
    interp
        .run("fn twice(x)\n    return x * 2\nendfn\n", "lib.rpl")
        .unwrap();
    let Some(Value::Function(func)) = interp.get_global("twice") else {
        panic!("expected function binding");
    };
    assert_eq!(func.name(), "twice");
    assert_eq!(func.file, "lib.rpl");
    assert_eq!(func.line(), 1);
    let source = func.source();
    assert!(source.starts_with("fn twice(x)"));
    assert!(source.contains("return x * 2"));
}

#[test]
fn test_arity_mismatch() {
    let mut interp = interp();
    let err = interp
        .run("fn f(a, b)\n    return a\nendfn\nf(1)\n", "<test>")
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::ArityMismatch {
            expected: 2,
            got: 1,
            ..
        })
    ));
}

#[test]
fn test_value_equality_across_kinds() {
    assert_eq!(Value::Int(2), Value::Float(2.0));
    assert_eq!(
        Value::List(vec![Value::Int(1), Value::Int(2)]),
        Value::List(vec![Value::Int(1), Value::Int(2)])
    );
    assert_ne!(Value::array(vec![1.0]), Value::array(vec![2.0]));
}
