// Builtin functions
// Available wherever no user binding shadows them: print, copy, array, len.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use super::{EvalError, Interpreter, Value};

pub(crate) fn is_builtin(name: &str) -> bool {
    matches!(name, "print" | "copy" | "array" | "len")
}

pub(crate) fn call(interp: &mut Interpreter, name: &str, args: Vec<Value>) -> Result<Value> {
    match name {
        "print" => {
            let line = args
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            interp.emit_output(&line);
            Ok(Value::Null)
        }
        "copy" => {
            let [value] = take_args::<1>(name, args)?;
            Ok(value.deep_copy())
        }
        "array" => {
            let [value] = take_args::<1>(name, args)?;
            match value {
                // Already an array: shares storage, like asarray
                Value::Array(cells) => Ok(Value::Array(cells)),
                Value::List(elements) => {
                    let mut data = Vec::with_capacity(elements.len());
                    for element in &elements {
                        match element.as_f64() {
                            Some(x) => data.push(x),
                            None => {
                                return Err(EvalError::type_error(
                                    "array",
                                    "a list of numbers",
                                    element.type_name(),
                                )
                                .into())
                            }
                        }
                    }
                    Ok(Value::Array(Rc::new(RefCell::new(data))))
                }
                other => Err(EvalError::type_error(
                    "array",
                    "a list or array",
                    other.type_name(),
                )
                .into()),
            }
        }
        "len" => {
            let [value] = take_args::<1>(name, args)?;
            let len = match &value {
                Value::Str(s) => s.chars().count(),
                Value::List(elements) => elements.len(),
                Value::Array(cells) => cells.borrow().len(),
                other => {
                    return Err(EvalError::type_error(
                        "len",
                        "a string, list, or array",
                        other.type_name(),
                    )
                    .into())
                }
            };
            Ok(Value::Int(len as i64))
        }
        _ => Err(EvalError::VariableNotFound {
            name: name.to_string(),
        }
        .into()),
    }
}

fn take_args<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N]> {
    let got = args.len();
    args.try_into().map_err(|_| {
        EvalError::ArityMismatch {
            name: name.to_string(),
            expected: N,
            got,
        }
        .into()
    })
}
