use std::fmt;

use thiserror::Error;

use crate::token::Span;

/// User-visible family of a runtime fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Runtime,
    Type,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Runtime => write!(f, "RuntimeError"),
            ErrorCategory::Type => write!(f, "TypeError"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Value of type {type_name} is not callable")]
    NotCallable { type_name: String },
    #[error("'{name}' expected {expected} arguments but got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Index must be a non-negative integer, got {found}")]
    InvalidIndex { found: String },
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("Value of type {type_name} cannot be indexed")]
    NotIndexable { type_name: String },
    #[error("Key {key} not found in dict")]
    MissingKey { key: String },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Modulo by zero")]
    ModuloByZero,
    #[error("{type_name} has no field or method '{name}'")]
    UnknownMember { type_name: String, name: String },
    #[error("Cannot pop from an empty list")]
    EmptyList,
    #[error("Cannot convert {value} to {target}")]
    InvalidConversion { value: String, target: &'static str },
    #[error("Function '{name}' must return a value of type {expected}")]
    MissingReturn { name: String, expected: String },
    #[error("Maximum call depth of {limit} exceeded")]
    CallDepthExceeded { limit: usize },
    #[error("Execution cancelled")]
    Cancelled,
    #[error("'{signal}' escaped its enclosing {boundary}")]
    ControlFlowEscape {
        signal: &'static str,
        boundary: &'static str,
    },

    #[error("Cannot assign value of type {found} to '{name}' of type {expected}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },
    #[error("Cannot assign to constant '{name}'")]
    ConstReassignment { name: String },
    #[error("Cannot redefine constant '{name}'")]
    ConstRedefinition { name: String },
    #[error("Argument '{param}' of '{function}' expects {expected}, got {found}")]
    ArgumentType {
        function: String,
        param: String,
        expected: String,
        found: String,
    },
    #[error("Function '{function}' must return {expected}, got {found}")]
    ReturnType {
        function: String,
        expected: String,
        found: String,
    },
    #[error("Function '{function}' is void and cannot return a value")]
    VoidReturnValue { function: String },
    #[error("Operator '{op}' expects {expected} operands, got {found}")]
    OperandType {
        op: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("Condition must be boolean, got {found}")]
    ConditionType { found: String },
    #[error("Field '{field}' of {class} expects {expected}, got {found}")]
    FieldType {
        class: String,
        field: String,
        expected: String,
        found: String,
    },
    #[error("Value of type {type_name} does not support assignment to '{target}'")]
    NotAssignable { type_name: String, target: String },
}

impl RuntimeErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RuntimeErrorKind::TypeMismatch { .. }
            | RuntimeErrorKind::ConstReassignment { .. }
            | RuntimeErrorKind::ConstRedefinition { .. }
            | RuntimeErrorKind::ArgumentType { .. }
            | RuntimeErrorKind::ReturnType { .. }
            | RuntimeErrorKind::VoidReturnValue { .. }
            | RuntimeErrorKind::OperandType { .. }
            | RuntimeErrorKind::ConditionType { .. }
            | RuntimeErrorKind::FieldType { .. }
            | RuntimeErrorKind::NotAssignable { .. } => ErrorCategory::Type,
            _ => ErrorCategory::Runtime,
        }
    }

    pub fn at(self, span: Span) -> RuntimeError {
        RuntimeError { kind: self, span }
    }

    pub(crate) fn expect_arity(name: &str, expected: usize, found: usize) -> Result<(), Self> {
        if expected == found {
            Ok(())
        } else {
            Err(RuntimeErrorKind::ArityMismatch {
                name: name.to_string(),
                expected,
                found,
            })
        }
    }
}

/// A runtime fault tagged with the source region that raised it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}: {}", .kind.category(), .kind)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_category() {
        let error = RuntimeErrorKind::DivisionByZero.at(Span::default());
        assert_eq!(error.to_string(), "RuntimeError: Division by zero");

        let error = RuntimeErrorKind::ConstReassignment {
            name: "x".to_string(),
        }
        .at(Span::default());
        assert_eq!(error.category(), ErrorCategory::Type);
        assert_eq!(error.to_string(), "TypeError: Cannot assign to constant 'x'");
    }
}
