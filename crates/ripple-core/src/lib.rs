//! # Ripple Core
//!
//! Core implementation of the Ripple language, including:
//! - Syntax tree definitions with structural and source rendering
//! - Language lexer and parser
//! - Tree-walking evaluator with aliasable array values
//! - Structural rewriting engine with statement hoisting
//! - The commutative-operation lowering pass (`@optimize`)
//!
//! The rewriting engine is the centerpiece: given a function marked with
//! `@optimize`, it lowers `+` and `*` expressions into explicit, traced,
//! steppable statement sequences and rebuilds an equivalent callable.

#![warn(clippy::all)]

pub mod ast;
pub mod eval;
pub mod parser;
pub mod rewrite;
pub mod source;

// Re-export commonly used types
pub use ast::{
    base_name, BinOp, CmpOp, Dump, Expr, ExprKind, FunctionDef, Program, Span, Stmt, StmtKind,
    ToSource, UnaryOp,
};
pub use eval::{EvalError, Interpreter, Namespace, Value};
pub use parser::{parse, ParseError};
pub use rewrite::{
    optimize, register_optimize, CommuteLowering, RewriteCx, RewriteError, RewriteRule,
    Rewritten, MARKER,
};
pub use source::{dedent, extract, SourceInfo, SourceInput};

/// Ripple language version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for Ripple core components
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ripple_core=info".parse().expect("valid directive")),
        )
        .init();
}
