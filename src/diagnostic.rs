//! Positioned diagnostics handed to editors and the output sink.

use std::fmt;

use crate::analyzer::SemanticError;
use crate::ast::Program;
use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::runtime::error::RuntimeError;
use crate::token::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl CompilationError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            line: span.line,
            column: span.column,
            length: span.len(),
        }
    }
}

/// Wire format: `[Line {line}:{column}] {message}`.
impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Line {}:{}] {}", self.line, self.column, self.message)
    }
}

impl From<LexError> for CompilationError {
    fn from(error: LexError) -> Self {
        CompilationError::new(error.to_string(), error.span())
    }
}

impl From<ParseError> for CompilationError {
    fn from(error: ParseError) -> Self {
        CompilationError::new(error.message, error.span)
    }
}

impl From<SemanticError> for CompilationError {
    fn from(error: SemanticError) -> Self {
        CompilationError::new(error.kind.to_string(), error.span)
    }
}

impl From<RuntimeError> for CompilationError {
    fn from(error: RuntimeError) -> Self {
        CompilationError::new(error.to_string(), error.span)
    }
}

/// Output of `compile`: the (possibly partial) program plus every diagnostic.
#[derive(Debug, Clone, Default)]
pub struct CompilationResult {
    pub program: Program,
    pub errors: Vec<CompilationError>,
}

impl CompilationResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_in_wire_format() {
        let error = CompilationError::new("Undefined variable 'x'", Span::new(4, 5, 2, 7));
        assert_eq!(error.to_string(), "[Line 2:7] Undefined variable 'x'");
        assert_eq!(error.length, 1);
    }
}
