// Rebuild & activate
// Drives one full rewrite pass: extract source, parse, strip the marker
// decorator (the re-entrancy guard), realign line numbers, run the
// commutative lowering, and evaluate the rebuilt unit in a fresh namespace.
// The rewritten function is the sole binding that namespace gains.

use anyhow::Result;
use tracing::debug;

use crate::ast::{self, fixup, FunctionDef, Program, StmtKind};
use crate::eval::{Interpreter, Value};
use crate::parser;
use crate::source::{self, SourceInput};

use super::{rewrite_program, CommuteLowering, RewriteError};

/// Name of the marker decorator that triggers a rewrite.
pub const MARKER: &str = "optimize";

/// Rewrites the function behind `input` and returns the new callable.
///
/// The input must parse as exactly one function definition carrying the
/// marker decorator. The returned function has the same name and signature
/// and shares no tree with the original; running it additionally prints one
/// trace line per synthesized assignment and combine step.
pub fn optimize(interp: &mut Interpreter, input: SourceInput<'_>) -> Result<Value> {
    let src = source::extract(input)?;
    let mut program = parser::parse(&src.text)?;
    let def = single_function_def(&mut program)?;
    strip_marker(def, MARKER)?;
    fixup::offset_lines(&mut program, src.line.saturating_sub(1));

    let mut rule = CommuteLowering::new();
    let mut program = rewrite_program(&mut rule, program)?;
    fixup::fix_missing_spans(&mut program);

    debug!(file = %src.file, line = src.line, "activating rewritten unit");
    let bindings = interp.eval_unit(&program, &src.file)?;
    let bindings = bindings.borrow();
    let mut values = bindings.values();
    match (values.next(), values.next()) {
        (Some(value), None) => Ok(value.clone()),
        _ => Err(RewriteError::ShapeMismatch {
            found: format!("{} new bindings after activation", bindings.len()),
        }
        .into()),
    }
}

/// Registers [`optimize`] as the native `@optimize` decorator, so marked
/// definitions rewrite themselves on evaluation.
pub fn register_optimize(interp: &mut Interpreter) {
    interp.register_decorator(MARKER, |interp, value| {
        optimize(interp, SourceInput::Callable(&value))
    });
}

/// Asserts the unit is exactly one top-level function definition.
fn single_function_def(program: &mut Program) -> Result<&mut FunctionDef, RewriteError> {
    if program.body.len() != 1 {
        return Err(RewriteError::ShapeMismatch {
            found: format!("{} top-level statements", program.body.len()),
        });
    }
    match &mut program.body[0].kind {
        StmtKind::FunctionDef(def) => Ok(def),
        other => Err(RewriteError::ShapeMismatch {
            found: describe_stmt(other),
        }),
    }
}

fn describe_stmt(kind: &StmtKind) -> String {
    match kind {
        StmtKind::FunctionDef(_) => "a function definition",
        StmtKind::Assign { .. } => "an assignment",
        StmtKind::AugAssign { .. } => "an augmented assignment",
        StmtKind::Return { .. } => "a return statement",
        StmtKind::If { .. } => "an if statement",
        StmtKind::While { .. } => "a while statement",
        StmtKind::Expr { .. } => "an expression statement",
    }
    .to_string()
}

/// Removes every decorator up to and including the first one whose base
/// name matches `marker`, so compiling the rebuilt unit cannot re-trigger
/// the rewrite.
fn strip_marker(def: &mut FunctionDef, marker: &str) -> Result<(), RewriteError> {
    let index = def
        .decorators
        .iter()
        .position(|decorator| ast::base_name(decorator) == Some(marker))
        .ok_or_else(|| RewriteError::DecoratorNotFound {
            marker: marker.to_string(),
            function: def.name.clone(),
        })?;
    def.decorators.drain(..=index);
    Ok(())
}
