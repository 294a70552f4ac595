//! Interpreter for a small, statically tagged teaching language.
//!
//! Source text flows through [`lexer`], [`parser`] and [`analyzer`] into the
//! tree-walking [`interpreter`]. Most hosts only need [`compile`] and [`run`].
pub mod analyzer;
pub mod ast;
pub mod cancel;
pub mod config;
pub mod diagnostic;
pub mod interpreter;
pub mod io;
pub mod lexer;
pub mod parser;
pub mod runner;
pub mod runtime;
pub mod token;

#[cfg(test)]
mod harness;

pub use cancel::CancellationToken;
pub use config::Config;
pub use diagnostic::{CompilationError, CompilationResult};
pub use runner::{RunOptions, RunReport, RunStatus, compile, run, run_with_options};
