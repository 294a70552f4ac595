use thiserror::Error;

use crate::token::Span;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character '{character}'")]
    UnexpectedCharacter { character: char, span: Span },
    #[error("Unterminated string literal")]
    UnterminatedString { span: Span },
    #[error("Unterminated comment")]
    UnterminatedComment { span: Span },
    #[error("Invalid number literal '{literal}'")]
    InvalidNumberLiteral { literal: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedComment { span }
            | LexError::InvalidNumberLiteral { span, .. } => *span,
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;
