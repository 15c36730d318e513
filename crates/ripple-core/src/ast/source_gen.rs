// Source code generation from the syntax tree
// Regenerates runnable Ripple source from any node. This is both the
// unparser and the introspection surface for function values: a function's
// reported source is the regenerated text of its stored definition.

use super::{Expr, ExprKind, FunctionDef, Program, Stmt, StmtKind};

const INDENT: &str = "    ";

/// Trait for nodes that can regenerate their source representation.
///
/// Regenerated source parses back to a structurally equal tree (spans
/// aside); compound operands are parenthesized conservatively to keep that
/// guarantee without tracking precedence.
pub trait ToSource {
    fn to_source(&self) -> String;
}

impl ToSource for Program {
    fn to_source(&self) -> String {
        let mut out = String::new();
        for stmt in &self.body {
            write_stmt(&mut out, stmt, 0);
        }
        out
    }
}

impl ToSource for FunctionDef {
    fn to_source(&self) -> String {
        let mut out = String::new();
        write_function(&mut out, self, 0);
        out
    }
}

impl ToSource for Stmt {
    fn to_source(&self) -> String {
        let mut out = String::new();
        write_stmt(&mut out, self, 0);
        out
    }
}

impl ToSource for Expr {
    fn to_source(&self) -> String {
        match &self.kind {
            ExprKind::Int(n) => n.to_string(),
            ExprKind::Float(x) => format!("{x:?}"),
            ExprKind::Str(s) => format!("{s:?}"),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Null => "null".to_string(),
            ExprKind::Name(name) => name.clone(),
            ExprKind::Binary { op, left, right } => {
                format!("{} {} {}", operand(left), op.symbol(), operand(right))
            }
            ExprKind::Compare { op, left, right } => {
                format!("{} {} {}", operand(left), op.symbol(), operand(right))
            }
            ExprKind::Unary { op, operand: inner } => {
                format!("{}{}", op.symbol(), operand(inner))
            }
            ExprKind::Call { callee, args } => {
                format!("{}({})", operand(callee), comma_list(args))
            }
            ExprKind::Property { object, name } => format!("{}.{}", operand(object), name),
            ExprKind::Index { object, index } => {
                format!("{}[{}]", operand(object), index.to_source())
            }
            ExprKind::List(elements) => format!("[{}]", comma_list(elements)),
        }
    }
}

/// Renders an operand position, parenthesizing compound expressions.
fn operand(expr: &Expr) -> String {
    match expr.kind {
        ExprKind::Binary { .. } | ExprKind::Compare { .. } | ExprKind::Unary { .. } => {
            format!("({})", expr.to_source())
        }
        _ => expr.to_source(),
    }
}

fn comma_list(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(|e| e.to_source())
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_stmt(out: &mut String, stmt: &Stmt, indent: usize) {
    let pad = INDENT.repeat(indent);
    match &stmt.kind {
        StmtKind::FunctionDef(def) => write_function(out, def, indent),
        StmtKind::Assign { target, value } => {
            out.push_str(&format!(
                "{pad}{} = {}\n",
                target.to_source(),
                value.to_source()
            ));
        }
        StmtKind::AugAssign { target, op, value } => {
            out.push_str(&format!(
                "{pad}{} {}= {}\n",
                target.to_source(),
                op.symbol(),
                value.to_source()
            ));
        }
        StmtKind::Return { value } => match value {
            Some(v) => out.push_str(&format!("{pad}return {}\n", v.to_source())),
            None => out.push_str(&format!("{pad}return\n")),
        },
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => {
            out.push_str(&format!("{pad}if {}\n", cond.to_source()));
            for s in then_body {
                write_stmt(out, s, indent + 1);
            }
            if let Some(else_body) = else_body {
                out.push_str(&format!("{pad}else\n"));
                for s in else_body {
                    write_stmt(out, s, indent + 1);
                }
            }
            out.push_str(&format!("{pad}endif\n"));
        }
        StmtKind::While { cond, body } => {
            out.push_str(&format!("{pad}while {}\n", cond.to_source()));
            for s in body {
                write_stmt(out, s, indent + 1);
            }
            out.push_str(&format!("{pad}endwhile\n"));
        }
        StmtKind::Expr { value } => {
            out.push_str(&format!("{pad}{}\n", value.to_source()));
        }
    }
}

fn write_function(out: &mut String, def: &FunctionDef, indent: usize) {
    let pad = INDENT.repeat(indent);
    for decorator in &def.decorators {
        out.push_str(&format!("{pad}@{}\n", decorator.to_source()));
    }
    out.push_str(&format!("{pad}fn {}({})\n", def.name, def.params.join(", ")));
    for stmt in &def.body {
        write_stmt(out, stmt, indent + 1);
    }
    out.push_str(&format!("{pad}endfn\n"));
}
