use thiserror::Error;

/// Evaluator-specific error types for better error handling
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Type error: {operation} requires {expected}, got {actual}")]
    TypeError {
        operation: String,
        expected: String,
        actual: String,
    },

    #[error("Type error: cannot {operation} {left_type} and {right_type}")]
    BinaryTypeError {
        operation: String,
        left_type: String,
        right_type: String,
    },

    #[error("Variable '{name}' not found")]
    VariableNotFound { name: String },

    #[error("Property '{property}' not found on {type_name}")]
    PropertyNotFound {
        property: String,
        type_name: String,
    },

    #[error("Value of type {type_name} is not callable")]
    NotCallable { type_name: String },

    #[error("Function '{name}' expects {expected} arguments, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Unknown decorator '{name}'")]
    UnknownDecorator { name: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Array length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("`return` outside of a function")]
    ReturnOutsideFunction,

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },
}

impl EvalError {
    /// Create a type error for binary operations
    pub fn binary_type_error(operation: &str, left_type: &str, right_type: &str) -> Self {
        Self::BinaryTypeError {
            operation: operation.to_string(),
            left_type: left_type.to_string(),
            right_type: right_type.to_string(),
        }
    }

    /// Create a type error for a builtin or operator argument
    pub fn type_error(operation: &str, expected: &str, actual: &str) -> Self {
        Self::TypeError {
            operation: operation.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
