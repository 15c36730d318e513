// Commutative-operation lowering
// Lowers `+` and `*` expressions into an explicit statement sequence: an
// optional defensive copy, an initial assignment, and an in-place combine,
// each announced by a trace print. The original expression is replaced by a
// read of the fresh temporary.

use anyhow::Result;

use crate::ast::{BinOp, Dump, Expr, ExprKind, Span, StmtKind};

use super::{visit_expr, walk_expr, RewriteCx, RewriteRule};

/// The commutative-lowering rule. One instance per pass: it owns the
/// fresh-variable counter.
pub struct CommuteLowering {
    nonce: u32,
}

impl CommuteLowering {
    pub fn new() -> Self {
        Self { nonce: 0 }
    }

    fn fresh_var(&mut self) -> String {
        self.nonce += 1;
        format!("t{:03}", self.nonce)
    }

    fn emit_assign(&self, name: &str, value: Expr, cx: &mut RewriteCx) {
        let span = cx.donor_span();
        cx.emit(StmtKind::Assign {
            target: Expr::new(ExprKind::Name(name.to_string()), span),
            value,
        });
    }

    /// Traced assignment of the temporary.
    fn assign(&self, name: &str, value: Expr, cx: &mut RewriteCx) {
        cx.emit_trace(format!("{name} = {}", value.dump()));
        self.emit_assign(name, value, cx);
    }

    /// Assignment of the temporary as a defensive copy. The caller emits
    /// the `Copy` trace, which stands in for the assignment trace here.
    fn assign_copy(&self, name: &str, value: Expr, cx: &mut RewriteCx) {
        let span = cx.donor_span();
        let callee = Expr::new(ExprKind::Name("copy".to_string()), span);
        let call = Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args: vec![value],
            },
            span,
        );
        self.emit_assign(name, call, cx);
    }

    /// Lowers one commutative binary operation.
    ///
    /// The copy-vs-reorder strategy is decided on the *original* operands:
    /// an operand that denotes pre-existing storage (an lvalue) must not be
    /// combined into in place, while a freshly computed value may serve as
    /// the accumulator basis directly. When only the left side is an
    /// lvalue, the sides swap roles — valid because the operation is
    /// commutative — which avoids the copy entirely.
    fn lower(
        &mut self,
        op: BinOp,
        left: Expr,
        right: Expr,
        span: Span,
        cx: &mut RewriteCx,
    ) -> Result<Expr> {
        let name = self.fresh_var();
        let operand = if left.is_lvalue() {
            if right.is_lvalue() {
                cx.emit_trace(format!("Copy {}", left.dump()));
                let left = visit_expr(self, left, cx)?;
                self.assign_copy(&name, left, cx);
                visit_expr(self, right, cx)?
            } else {
                let right = visit_expr(self, right, cx)?;
                self.assign(&name, right, cx);
                visit_expr(self, left, cx)?
            }
        } else {
            let left = visit_expr(self, left, cx)?;
            self.assign(&name, left, cx);
            visit_expr(self, right, cx)?
        };
        cx.emit_trace(format!("{} {} to {name}", op.verb(), operand.dump()));
        let target = Expr::new(ExprKind::Name(name.clone()), cx.donor_span());
        cx.emit(StmtKind::AugAssign {
            target,
            op,
            value: operand,
        });
        Ok(Expr::new(ExprKind::Name(name), span))
    }
}

impl Default for CommuteLowering {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteRule for CommuteLowering {
    fn name(&self) -> &'static str {
        "commute-lowering"
    }

    fn rewrite_expr(&mut self, expr: Expr, cx: &mut RewriteCx) -> Result<Expr> {
        match expr.kind {
            ExprKind::Binary {
                op: op @ (BinOp::Add | BinOp::Mul),
                left,
                right,
            } => self.lower(op, *left, *right, expr.span, cx),
            kind => walk_expr(self, Expr::new(kind, expr.span), cx),
        }
    }
}
