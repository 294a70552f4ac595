//! Entry points tying the pipeline together.
//!
//! `compile` stops at the first lexical or syntax error but collects every
//! semantic error. `run` prints diagnostics through the output provider in
//! the `[Line L:C] message` format and never executes a program that failed
//! to compile.

use tracing::{debug, info};

use crate::analyzer;
use crate::ast::Program;
use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::diagnostic::{CompilationError, CompilationResult};
use crate::interpreter::Interpreter;
use crate::io::{InputProvider, OutputProvider};
use crate::lexer;
use crate::parser;
use crate::runtime::error::RuntimeErrorKind;

pub fn compile(source: &str) -> CompilationResult {
    let tokens = match lexer::tokenize(source) {
        Ok(tokens) => tokens,
        Err(error) => {
            debug!(%error, "lexing failed");
            return CompilationResult {
                program: Program::default(),
                errors: vec![error.into()],
            };
        }
    };
    debug!(tokens = tokens.len(), "lexed source");

    let (program, error) = parser::parse_partial(tokens);
    if let Some(error) = error {
        debug!(%error, "parsing failed");
        return CompilationResult {
            program,
            errors: vec![error.into()],
        };
    }

    let errors: Vec<CompilationError> = analyzer::analyze(&program)
        .into_iter()
        .map(CompilationError::from)
        .collect();
    debug!(errors = errors.len(), "analysis finished");
    CompilationResult { program, errors }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Config,
    pub cancellation: Option<CancellationToken>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    CompileFailed,
    RuntimeFailed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub status: RunStatus,
    pub errors: Vec<CompilationError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

pub fn run(
    source: &str,
    input: &mut dyn InputProvider,
    output: &mut dyn OutputProvider,
) -> RunReport {
    run_with_options(source, input, output, &RunOptions::default())
}

pub fn run_with_options(
    source: &str,
    input: &mut dyn InputProvider,
    output: &mut dyn OutputProvider,
    options: &RunOptions,
) -> RunReport {
    let compiled = compile(source);
    if !compiled.is_success() {
        for error in &compiled.errors {
            output.print(&format!("{error}\n"));
        }
        return RunReport {
            status: RunStatus::CompileFailed,
            errors: compiled.errors,
        };
    }

    let result = {
        let mut interpreter = Interpreter::with_config(input, output, options.config.clone());
        if let Some(token) = &options.cancellation {
            interpreter.set_cancellation(token.clone());
        }
        interpreter.interpret(&compiled.program)
    };

    match result {
        Ok(()) => {
            info!("run completed");
            RunReport {
                status: RunStatus::Completed,
                errors: Vec::new(),
            }
        }
        Err(error) => {
            let status = if error.kind == RuntimeErrorKind::Cancelled {
                RunStatus::Cancelled
            } else {
                RunStatus::RuntimeFailed
            };
            info!(%error, ?status, "run stopped");
            let diagnostic = CompilationError::from(error);
            output.print(&format!("{diagnostic}\n"));
            RunReport {
                status,
                errors: vec![diagnostic],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::io::{CapturedOutput, ScriptedInput};

    fn run_source(source: &str) -> (String, RunReport) {
        let mut input = ScriptedInput::default();
        let mut output = CapturedOutput::new();
        let report = run(source, &mut input, &mut output);
        (output.into_text(), report)
    }

    #[test]
    fn compile_reports_lex_error_with_position() {
        let result = compile("set number x = 1;\nprint @;");
        assert!(!result.is_success());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 2);
        assert_eq!(result.errors[0].column, 7);
        assert!(result.program.statements.is_empty());
    }

    #[test]
    fn compile_keeps_statements_parsed_before_a_syntax_error() {
        let result = compile("print 1;\nprint 2;\nprint (3;");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 3);
        assert_eq!(result.program.statements.len(), 2);
    }

    #[test]
    fn compile_collects_every_semantic_error() {
        let result = compile(indoc! {"
            print a;
            break;
            print b;
        "});
        let messages: Vec<_> = result.errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "[Line 1:7] Undefined variable 'a'",
                "[Line 2:1] 'break' used outside of loop",
                "[Line 3:7] Undefined variable 'b'",
            ]
        );
    }

    #[test]
    fn bare_break_never_runs() {
        let (output, report) = run_source("print 1;\nbreak;");
        assert_eq!(report.status, RunStatus::CompileFailed);
        assert_eq!(output, "[Line 2:1] 'break' used outside of loop\n");
    }

    #[test]
    fn runtime_error_is_printed_after_earlier_output() {
        let (output, report) = run_source("print 1;\nprint 5 / 0;\nprint 2;");
        assert_eq!(report.status, RunStatus::RuntimeFailed);
        assert_eq!(output, "1\n[Line 2:7] RuntimeError: Division by zero\n");
    }

    #[test]
    fn type_errors_carry_their_category() {
        let (output, report) = run_source("print true and \"x\";");
        assert_eq!(report.status, RunStatus::RuntimeFailed);
        assert!(output.contains("TypeError:"), "{output}");
    }

    #[test]
    fn successful_run_reports_no_errors() {
        let (output, report) = run_source("set number x = 5;\nprint x;");
        assert!(report.is_success());
        assert!(report.errors.is_empty());
        assert_eq!(output, "5\n");
    }

    #[test]
    fn cancelled_run_reports_cancelled_status() {
        let mut input = ScriptedInput::default();
        let mut output = CapturedOutput::new();
        let token = CancellationToken::new();
        token.cancel();
        let options = RunOptions {
            cancellation: Some(token),
            ..RunOptions::default()
        };
        let report = run_with_options("while true do endwhile", &mut input, &mut output, &options);
        assert_eq!(report.status, RunStatus::Cancelled);
        assert_eq!(report.errors[0].message, "RuntimeError: Execution cancelled");
    }
}
