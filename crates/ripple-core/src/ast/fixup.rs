// Location metadata maintenance
// `offset_lines` shifts every span so a reparsed definition lines up with
// its position in the original file; `fix_missing_spans` fills any dummy
// spans left behind by synthesis with the nearest ancestor's span.

use super::{Expr, ExprKind, Program, Span, Stmt, StmtKind};

/// Shifts the line number of every span in the program by `delta`.
pub fn offset_lines(program: &mut Program, delta: u32) {
    if delta == 0 {
        return;
    }
    for stmt in &mut program.body {
        offset_stmt(stmt, delta);
    }
}

/// Replaces every dummy span with the span of the nearest enclosing node.
pub fn fix_missing_spans(program: &mut Program) {
    for stmt in &mut program.body {
        fix_stmt(stmt, Span::new(1, 1));
    }
}

fn offset_span(span: &mut Span, delta: u32) {
    if !span.is_dummy() {
        span.line += delta;
    }
}

fn offset_stmt(stmt: &mut Stmt, delta: u32) {
    offset_span(&mut stmt.span, delta);
    match &mut stmt.kind {
        StmtKind::FunctionDef(def) => {
            offset_span(&mut def.span, delta);
            for decorator in &mut def.decorators {
                offset_expr(decorator, delta);
            }
            for s in &mut def.body {
                offset_stmt(s, delta);
            }
        }
        StmtKind::Assign { target, value } => {
            offset_expr(target, delta);
            offset_expr(value, delta);
        }
        StmtKind::AugAssign { target, value, .. } => {
            offset_expr(target, delta);
            offset_expr(value, delta);
        }
        StmtKind::Return { value } => {
            if let Some(value) = value {
                offset_expr(value, delta);
            }
        }
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => {
            offset_expr(cond, delta);
            for s in then_body {
                offset_stmt(s, delta);
            }
            if let Some(else_body) = else_body {
                for s in else_body {
                    offset_stmt(s, delta);
                }
            }
        }
        StmtKind::While { cond, body } => {
            offset_expr(cond, delta);
            for s in body {
                offset_stmt(s, delta);
            }
        }
        StmtKind::Expr { value } => offset_expr(value, delta),
    }
}

fn offset_expr(expr: &mut Expr, delta: u32) {
    offset_span(&mut expr.span, delta);
    match &mut expr.kind {
        ExprKind::Binary { left, right, .. } | ExprKind::Compare { left, right, .. } => {
            offset_expr(left, delta);
            offset_expr(right, delta);
        }
        ExprKind::Unary { operand, .. } => offset_expr(operand, delta),
        ExprKind::Call { callee, args } => {
            offset_expr(callee, delta);
            for arg in args {
                offset_expr(arg, delta);
            }
        }
        ExprKind::Property { object, .. } => offset_expr(object, delta),
        ExprKind::Index { object, index } => {
            offset_expr(object, delta);
            offset_expr(index, delta);
        }
        ExprKind::List(elements) => {
            for e in elements {
                offset_expr(e, delta);
            }
        }
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Name(_) => {}
    }
}

fn fill(span: &mut Span, parent: Span) -> Span {
    if span.is_dummy() {
        *span = parent;
    }
    *span
}

fn fix_stmt(stmt: &mut Stmt, parent: Span) {
    let here = fill(&mut stmt.span, parent);
    match &mut stmt.kind {
        StmtKind::FunctionDef(def) => {
            let here = fill(&mut def.span, here);
            for decorator in &mut def.decorators {
                fix_expr(decorator, here);
            }
            for s in &mut def.body {
                fix_stmt(s, here);
            }
        }
        StmtKind::Assign { target, value } => {
            fix_expr(target, here);
            fix_expr(value, here);
        }
        StmtKind::AugAssign { target, value, .. } => {
            fix_expr(target, here);
            fix_expr(value, here);
        }
        StmtKind::Return { value } => {
            if let Some(value) = value {
                fix_expr(value, here);
            }
        }
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => {
            fix_expr(cond, here);
            for s in then_body {
                fix_stmt(s, here);
            }
            if let Some(else_body) = else_body {
                for s in else_body {
                    fix_stmt(s, here);
                }
            }
        }
        StmtKind::While { cond, body } => {
            fix_expr(cond, here);
            for s in body {
                fix_stmt(s, here);
            }
        }
        StmtKind::Expr { value } => fix_expr(value, here),
    }
}

fn fix_expr(expr: &mut Expr, parent: Span) {
    let here = fill(&mut expr.span, parent);
    match &mut expr.kind {
        ExprKind::Binary { left, right, .. } | ExprKind::Compare { left, right, .. } => {
            fix_expr(left, here);
            fix_expr(right, here);
        }
        ExprKind::Unary { operand, .. } => fix_expr(operand, here),
        ExprKind::Call { callee, args } => {
            fix_expr(callee, here);
            for arg in args {
                fix_expr(arg, here);
            }
        }
        ExprKind::Property { object, .. } => fix_expr(object, here),
        ExprKind::Index { object, index } => {
            fix_expr(object, here);
            fix_expr(index, here);
        }
        ExprKind::List(elements) => {
            for e in elements {
                fix_expr(e, here);
            }
        }
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Name(_) => {}
    }
}
