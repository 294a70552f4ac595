//! Tree-walking interpreter.
//!
//! Execution pipeline:
//! interpret -> exec_statement -> evaluate -> call_value -> exec_block_in
//! (function body) -> exec_statement ...
//!
//! Control flow (`break`, `skip`, `return`) travels upward as an
//! [`ExecResult`] rather than as an error; only genuine faults use `Err`.

use tracing::{debug, trace};

use crate::ast::{Program, TypeTag};
use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::io::{InputProvider, OutputProvider};
use crate::runtime::builtins::NATIVE_FUNCTIONS;
use crate::runtime::callable::Callable;
use crate::runtime::environment::{EnvRef, Environment, Variable};
use crate::runtime::error::{RuntimeError, RuntimeErrorKind};
use crate::runtime::value::Value;
use crate::token::Span;

mod call;
mod eval;
mod exec;
mod operators;

pub(crate) use exec::ExecResult;

pub struct Interpreter<'io> {
    globals: EnvRef,
    environment: EnvRef,
    input: &'io mut dyn InputProvider,
    output: &'io mut dyn OutputProvider,
    config: Config,
    cancellation: Option<CancellationToken>,
    call_depth: usize,
}

impl<'io> Interpreter<'io> {
    pub fn new(input: &'io mut dyn InputProvider, output: &'io mut dyn OutputProvider) -> Self {
        Self::with_config(input, output, Config::default())
    }

    pub fn with_config(
        input: &'io mut dyn InputProvider,
        output: &'io mut dyn OutputProvider,
        config: Config,
    ) -> Self {
        let globals = Environment::global();
        {
            let mut scope = globals.borrow_mut();
            for native in NATIVE_FUNCTIONS {
                scope.bind(
                    native.name,
                    Variable {
                        value: Value::Callable(Callable::Native(native)),
                        type_tag: TypeTag::Function,
                        is_const: true,
                    },
                );
            }
        }
        Self {
            environment: globals.clone(),
            globals,
            input,
            output,
            config,
            cancellation: None,
            call_depth: 0,
        }
    }

    pub fn set_cancellation(&mut self, token: CancellationToken) {
        self.cancellation = Some(token);
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    /// Runs every top-level statement in order, stopping at the first fault.
    pub fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        debug!(statements = program.statements.len(), "interpreting program");
        for statement in &program.statements {
            self.check_cancelled(statement.span)?;
            match self.exec_statement(statement)? {
                ExecResult::Normal => {}
                ExecResult::Break => return Err(escape("break", statement.span)),
                ExecResult::Skip => return Err(escape("skip", statement.span)),
                ExecResult::Return(_) => return Err(escape("return", statement.span)),
            }
        }
        Ok(())
    }

    pub(crate) fn read_input(&mut self, prompt: &str) -> String {
        trace!(prompt, "reading input");
        self.input.read(prompt)
    }

    fn write_line(&mut self, text: &str) {
        self.output.print(&format!("{text}\n"));
    }

    fn check_cancelled(&self, span: Span) -> Result<(), RuntimeError> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(RuntimeErrorKind::Cancelled.at(span)),
            _ => Ok(()),
        }
    }
}

fn escape(signal: &'static str, span: Span) -> RuntimeError {
    RuntimeErrorKind::ControlFlowEscape {
        signal,
        boundary: "program",
    }
    .at(span)
}
