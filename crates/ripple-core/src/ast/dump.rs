// Structural rendering of expressions
// Every node renders as a constructor-like form, e.g. `Name("x")` or
// `Binary(Mul, Name("x"), Name("x"))`. This is the text embedded in the
// trace statements the rewriting engine synthesizes.

use super::{Expr, ExprKind};

/// Trait for nodes that can render their structural form.
pub trait Dump {
    fn dump(&self) -> String;
}

impl Dump for Expr {
    fn dump(&self) -> String {
        match &self.kind {
            ExprKind::Int(n) => format!("Int({n})"),
            ExprKind::Float(x) => format!("Float({x:?})"),
            ExprKind::Str(s) => format!("Str({s:?})"),
            ExprKind::Bool(b) => format!("Bool({b})"),
            ExprKind::Null => "Null".to_string(),
            ExprKind::Name(name) => format!("Name({name:?})"),
            ExprKind::Binary { op, left, right } => {
                format!("Binary({op:?}, {}, {})", left.dump(), right.dump())
            }
            ExprKind::Compare { op, left, right } => {
                format!("Compare({op:?}, {}, {})", left.dump(), right.dump())
            }
            ExprKind::Unary { op, operand } => format!("Unary({op:?}, {})", operand.dump()),
            ExprKind::Call { callee, args } => {
                format!("Call({}, [{}])", callee.dump(), dump_list(args))
            }
            ExprKind::Property { object, name } => {
                format!("Property({}, {name:?})", object.dump())
            }
            ExprKind::Index { object, index } => {
                format!("Index({}, {})", object.dump(), index.dump())
            }
            ExprKind::List(elements) => format!("List([{}])", dump_list(elements)),
        }
    }
}

fn dump_list(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(|e| e.dump())
        .collect::<Vec<_>>()
        .join(", ")
}
