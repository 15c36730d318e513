/*!
# Structural rewriting engine

A depth-first tree rewriter that lets a rule replace any node while the
engine transparently handles statement-list splicing: statements synthesized
during the rewrite of a nested expression are hoisted into the nearest
enclosing statement list, immediately before the statement that contained
the expression.

## Architecture

- `RewriteRule`: trait for rewrite rules; default hooks are
  identity-with-recursive-descent
- `RewriteCx`: per-pass scope builder holding the append-destination stack
  (statement sinks) and the node-path stack (source-location donors)
- `walk_expr` / `walk_stmt`: generic recursion, reusable from rule hooks
- `rewrite_program`: pass driver

One pass owns one `RewriteCx` and one rule instance; nothing is shared
across passes.
*/

pub mod activate;
pub mod commute;

pub use activate::{optimize, register_optimize, MARKER};
pub use commute::CommuteLowering;

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use crate::ast::{Expr, ExprKind, Program, Span, Stmt, StmtKind};

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("cannot extract source from a {kind} value")]
    UnsupportedInput { kind: String },

    #[error("expected exactly one top-level function definition, found {found}")]
    ShapeMismatch { found: String },

    #[error("no decorator matching `{marker}` on function `{function}`")]
    DecoratorNotFound { marker: String, function: String },
}

/// Outcome of rewriting one statement: dropped, replaced in place, or
/// spliced as a sequence.
pub enum Rewritten {
    Removed,
    Single(Stmt),
    Spliced(Vec<Stmt>),
}

/// Per-pass rewrite context.
///
/// The sink stack has one entry per statement-list field currently being
/// rebuilt; `emit` appends to the innermost one. The span stack tracks the
/// path of visited nodes so synthesized statements inherit the location of
/// the node being rewritten.
pub struct RewriteCx {
    sinks: Vec<Vec<Stmt>>,
    spans: Vec<Span>,
}

impl RewriteCx {
    fn new() -> Self {
        Self {
            sinks: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Span of the node currently being rewritten.
    pub fn donor_span(&self) -> Span {
        self.spans.last().copied().unwrap_or(Span::DUMMY)
    }

    /// Appends a synthesized statement, tagged with the donor span, to the
    /// nearest enclosing statement list.
    pub fn emit(&mut self, kind: StmtKind) {
        let span = self.donor_span();
        let sink = self
            .sinks
            .last_mut()
            .expect("statement synthesized outside of any statement list");
        sink.push(Stmt::new(kind, span));
    }

    /// Appends a `print("text")` trace statement.
    pub fn emit_trace(&mut self, text: impl Into<String>) {
        let span = self.donor_span();
        let callee = Expr::new(ExprKind::Name("print".to_string()), span);
        let message = Expr::new(ExprKind::Str(text.into()), span);
        self.emit(StmtKind::Expr {
            value: Expr::new(
                ExprKind::Call {
                    callee: Box::new(callee),
                    args: vec![message],
                },
                span,
            ),
        });
    }
}

/// A rewrite rule. Override the hooks for the nodes of interest and call
/// `walk_expr` / `walk_stmt` (or `visit_expr` on children) to continue the
/// default recursion.
pub trait RewriteRule {
    /// Human-readable name for this rule
    fn name(&self) -> &'static str;

    fn rewrite_expr(&mut self, expr: Expr, cx: &mut RewriteCx) -> Result<Expr> {
        walk_expr(self, expr, cx)
    }

    fn rewrite_stmt(&mut self, stmt: Stmt, cx: &mut RewriteCx) -> Result<Rewritten> {
        Ok(Rewritten::Single(walk_stmt(self, stmt, cx)?))
    }
}

/// Runs one rewrite pass over a whole program.
pub fn rewrite_program<R: RewriteRule + ?Sized>(
    rule: &mut R,
    program: Program,
) -> Result<Program> {
    debug!(rule = rule.name(), "rewriting program");
    let mut cx = RewriteCx::new();
    let body = rewrite_block(rule, program.body, &mut cx)?;
    Ok(Program { body })
}

/// Rebuilds one statement-list field: pushes a fresh sink, rewrites each
/// statement into it (hoisted statements land first), and installs the sink
/// as the field's new contents.
pub fn rewrite_block<R: RewriteRule + ?Sized>(
    rule: &mut R,
    stmts: Vec<Stmt>,
    cx: &mut RewriteCx,
) -> Result<Vec<Stmt>> {
    cx.sinks.push(Vec::new());
    for stmt in stmts {
        cx.spans.push(stmt.span);
        let outcome = rule.rewrite_stmt(stmt, cx)?;
        cx.spans.pop();
        let sink = cx
            .sinks
            .last_mut()
            .expect("sink stack emptied during block rewrite");
        match outcome {
            Rewritten::Removed => {}
            Rewritten::Single(stmt) => sink.push(stmt),
            Rewritten::Spliced(stmts) => sink.extend(stmts),
        }
    }
    Ok(cx
        .sinks
        .pop()
        .expect("sink stack emptied during block rewrite"))
}

/// Rewrites one expression, tracking it on the node-path stack.
pub fn visit_expr<R: RewriteRule + ?Sized>(
    rule: &mut R,
    expr: Expr,
    cx: &mut RewriteCx,
) -> Result<Expr> {
    cx.spans.push(expr.span);
    let result = rule.rewrite_expr(expr, cx);
    cx.spans.pop();
    result
}

/// Default recursion over an expression's children.
pub fn walk_expr<R: RewriteRule + ?Sized>(
    rule: &mut R,
    expr: Expr,
    cx: &mut RewriteCx,
) -> Result<Expr> {
    let Expr { kind, span } = expr;
    let kind = match kind {
        leaf @ (ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Name(_)) => leaf,
        ExprKind::Binary { op, left, right } => ExprKind::Binary {
            op,
            left: Box::new(visit_expr(rule, *left, cx)?),
            right: Box::new(visit_expr(rule, *right, cx)?),
        },
        ExprKind::Compare { op, left, right } => ExprKind::Compare {
            op,
            left: Box::new(visit_expr(rule, *left, cx)?),
            right: Box::new(visit_expr(rule, *right, cx)?),
        },
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op,
            operand: Box::new(visit_expr(rule, *operand, cx)?),
        },
        ExprKind::Call { callee, args } => ExprKind::Call {
            callee: Box::new(visit_expr(rule, *callee, cx)?),
            args: args
                .into_iter()
                .map(|arg| visit_expr(rule, arg, cx))
                .collect::<Result<_>>()?,
        },
        ExprKind::Property { object, name } => ExprKind::Property {
            object: Box::new(visit_expr(rule, *object, cx)?),
            name,
        },
        ExprKind::Index { object, index } => ExprKind::Index {
            object: Box::new(visit_expr(rule, *object, cx)?),
            index: Box::new(visit_expr(rule, *index, cx)?),
        },
        ExprKind::List(elements) => ExprKind::List(
            elements
                .into_iter()
                .map(|element| visit_expr(rule, element, cx))
                .collect::<Result<_>>()?,
        ),
    };
    Ok(Expr { kind, span })
}

/// Default recursion over a statement's children. Statement-list fields go
/// through `rewrite_block`, which is what scopes the hoisting sinks.
pub fn walk_stmt<R: RewriteRule + ?Sized>(
    rule: &mut R,
    stmt: Stmt,
    cx: &mut RewriteCx,
) -> Result<Stmt> {
    let Stmt { kind, span } = stmt;
    let kind = match kind {
        StmtKind::FunctionDef(mut def) => {
            def.decorators = def
                .decorators
                .into_iter()
                .map(|decorator| visit_expr(rule, decorator, cx))
                .collect::<Result<_>>()?;
            def.body = rewrite_block(rule, def.body, cx)?;
            StmtKind::FunctionDef(def)
        }
        StmtKind::Assign { target, value } => StmtKind::Assign {
            target: visit_expr(rule, target, cx)?,
            value: visit_expr(rule, value, cx)?,
        },
        StmtKind::AugAssign { target, op, value } => StmtKind::AugAssign {
            target: visit_expr(rule, target, cx)?,
            op,
            value: visit_expr(rule, value, cx)?,
        },
        StmtKind::Return { value } => StmtKind::Return {
            value: value.map(|v| visit_expr(rule, v, cx)).transpose()?,
        },
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => StmtKind::If {
            cond: visit_expr(rule, cond, cx)?,
            then_body: rewrite_block(rule, then_body, cx)?,
            else_body: else_body
                .map(|body| rewrite_block(rule, body, cx))
                .transpose()?,
        },
        StmtKind::While { cond, body } => StmtKind::While {
            cond: visit_expr(rule, cond, cx)?,
            body: rewrite_block(rule, body, cx)?,
        },
        StmtKind::Expr { value } => StmtKind::Expr {
            value: visit_expr(rule, value, cx)?,
        },
    };
    Ok(Stmt { kind, span })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FunctionDef, ToSource};
    use crate::parser;

    /// Hoists every integer literal >= 100 into a named constant.
    struct LiftBigInts {
        count: u32,
    }

    impl RewriteRule for LiftBigInts {
        fn name(&self) -> &'static str {
            "lift-big-ints"
        }

        fn rewrite_expr(&mut self, expr: Expr, cx: &mut RewriteCx) -> Result<Expr> {
            match expr.kind {
                ExprKind::Int(n) if n >= 100 => {
                    self.count += 1;
                    let name = format!("k{}", self.count);
                    let span = cx.donor_span();
                    cx.emit(StmtKind::Assign {
                        target: Expr::new(ExprKind::Name(name.clone()), span),
                        value: Expr::new(ExprKind::Int(n), span),
                    });
                    Ok(Expr::new(ExprKind::Name(name), expr.span))
                }
                _ => walk_expr(self, expr, cx),
            }
        }
    }

    /// Drops bare `null` expression statements.
    struct DropNullStmts;

    impl RewriteRule for DropNullStmts {
        fn name(&self) -> &'static str {
            "drop-null-stmts"
        }

        fn rewrite_stmt(&mut self, stmt: Stmt, cx: &mut RewriteCx) -> Result<Rewritten> {
            if let StmtKind::Expr {
                value: Expr {
                    kind: ExprKind::Null,
                    ..
                },
            } = &stmt.kind
            {
                return Ok(Rewritten::Removed);
            }
            Ok(Rewritten::Single(walk_stmt(self, stmt, cx)?))
        }
    }

    /// Splices a trace print in front of every return statement.
    struct TraceReturns;

    impl RewriteRule for TraceReturns {
        fn name(&self) -> &'static str {
            "trace-returns"
        }

        fn rewrite_stmt(&mut self, stmt: Stmt, cx: &mut RewriteCx) -> Result<Rewritten> {
            if matches!(stmt.kind, StmtKind::Return { .. }) {
                let span = stmt.span;
                let callee = Expr::new(ExprKind::Name("print".to_string()), span);
                let message = Expr::new(ExprKind::Str("returning".to_string()), span);
                let trace = Stmt::new(
                    StmtKind::Expr {
                        value: Expr::new(
                            ExprKind::Call {
                                callee: Box::new(callee),
                                args: vec![message],
                            },
                            span,
                        ),
                    },
                    span,
                );
                let stmt = walk_stmt(self, stmt, cx)?;
                return Ok(Rewritten::Spliced(vec![trace, stmt]));
            }
            Ok(Rewritten::Single(walk_stmt(self, stmt, cx)?))
        }
    }

    fn function_body(program: &Program) -> &[Stmt] {
        match &program.body[0].kind {
            StmtKind::FunctionDef(FunctionDef { body, .. }) => body,
            other => panic!("expected function definition, got {other:?}"),
        }
    }

    #[test]
    fn test_hoisted_statement_lands_in_nearest_block() {
        let source = "fn f(x)\n    if x > 0\n        return x + 200\n    endif\n    return 100\nendfn\n";
        let program = parser::parse(source).unwrap();
        let mut rule = LiftBigInts { count: 0 };
        let program = rewrite_program(&mut rule, program).unwrap();

        let body = function_body(&program);
        // The outer literal hoists into the function body, right before its
        // return; the nested literal hoists into the if branch.
        match &body[0].kind {
            StmtKind::If { then_body, .. } => {
                assert!(matches!(then_body[0].kind, StmtKind::Assign { .. }));
                assert!(matches!(then_body[1].kind, StmtKind::Return { .. }));
            }
            other => panic!("expected if statement, got {other:?}"),
        }
        assert!(matches!(body[1].kind, StmtKind::Assign { .. }));
        assert!(matches!(body[2].kind, StmtKind::Return { .. }));
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn test_hoisted_statement_inherits_donor_span() {
        let source = "fn f(x)\n    return x + 500\nendfn\n";
        let program = parser::parse(source).unwrap();
        let mut rule = LiftBigInts { count: 0 };
        let program = rewrite_program(&mut rule, program).unwrap();

        let body = function_body(&program);
        // The synthesized assignment carries the literal's line.
        assert_eq!(body[0].span.line, 2);
    }

    #[test]
    fn test_removed_statement_is_dropped() {
        let source = "fn f(x)\n    null\n    return x\nendfn\n";
        let program = parser::parse(source).unwrap();
        let program = rewrite_program(&mut DropNullStmts, program).unwrap();

        let body = function_body(&program);
        assert_eq!(body.len(), 1);
        assert!(matches!(body[0].kind, StmtKind::Return { .. }));
    }

    #[test]
    fn test_spliced_statements_replace_in_place() {
        let source = "fn f(x)\n    x = x + 1\n    return x\nendfn\n";
        let program = parser::parse(source).unwrap();
        let program = rewrite_program(&mut TraceReturns, program).unwrap();

        let body = function_body(&program);
        assert_eq!(body.len(), 3);
        assert!(matches!(body[0].kind, StmtKind::Assign { .. }));
        assert!(matches!(body[1].kind, StmtKind::Expr { .. }));
        assert!(matches!(body[2].kind, StmtKind::Return { .. }));
    }

    #[test]
    fn test_identity_rule_preserves_program() {
        struct Identity;
        impl RewriteRule for Identity {
            fn name(&self) -> &'static str {
                "identity"
            }
        }

        let source = "fn f(x)\n    while x < 10\n        x += 1\n    endwhile\n    return x\nendfn\n";
        let program = parser::parse(source).unwrap();
        let before = program.to_source();
        let program = rewrite_program(&mut Identity, program).unwrap();
        assert_eq!(program.to_source(), before);
    }
}
