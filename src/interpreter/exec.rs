use std::rc::Rc;

use crate::ast::{AssignTarget, Expression, Statement, StatementKind, TypeTag};
use crate::runtime::callable::{Callable, UserFunction};
use crate::runtime::class::{ClassObject, InstanceObject};
use crate::runtime::environment::{EnvRef, Environment};
use crate::runtime::error::{RuntimeError, RuntimeErrorKind};
use crate::runtime::value::Value;
use crate::runtime::{dict, list};

use super::Interpreter;

/// Control-flow marker for statement execution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ExecResult {
    Normal,
    Break,
    Skip,
    Return(Option<Value>),
}

type ExecOutcome = Result<ExecResult, RuntimeError>;

impl Interpreter<'_> {
    /// Runs `statements` with `environment` as the current scope, restoring
    /// the previous scope afterwards.
    pub(super) fn exec_block_in(
        &mut self,
        statements: &[Statement],
        environment: EnvRef,
    ) -> ExecOutcome {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = self.exec_statements(statements);
        self.environment = previous;
        result
    }

    fn exec_block(&mut self, statements: &[Statement]) -> ExecOutcome {
        let scope = Environment::child(&self.environment);
        self.exec_block_in(statements, scope)
    }

    fn exec_statements(&mut self, statements: &[Statement]) -> ExecOutcome {
        for statement in statements {
            match self.exec_statement(statement)? {
                ExecResult::Normal => {}
                signal => return Ok(signal),
            }
        }
        Ok(ExecResult::Normal)
    }

    pub(super) fn exec_statement(&mut self, statement: &Statement) -> ExecOutcome {
        let span = statement.span;
        match &statement.kind {
            StatementKind::VariableDeclaration {
                is_const,
                type_tag,
                name,
                initializer,
            } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Null,
                };
                self.environment
                    .borrow_mut()
                    .define(name, value, type_tag.clone(), *is_const)
                    .map_err(|kind| kind.at(span))?;
                Ok(ExecResult::Normal)
            }
            StatementKind::Assign { target, value } => {
                self.exec_assign(target, value)?;
                Ok(ExecResult::Normal)
            }
            StatementKind::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.write_line(&value.to_string());
                Ok(ExecResult::Normal)
            }
            StatementKind::If {
                condition,
                then_body,
                elif_branches,
                else_body,
            } => {
                if self.condition(condition)? {
                    return self.exec_block(then_body);
                }
                for branch in elif_branches {
                    if self.condition(&branch.condition)? {
                        return self.exec_block(&branch.body);
                    }
                }
                match else_body {
                    Some(body) => self.exec_block(body),
                    None => Ok(ExecResult::Normal),
                }
            }
            StatementKind::While { condition, body } => {
                loop {
                    self.check_cancelled(span)?;
                    if !self.condition(condition)? {
                        break;
                    }
                    match self.exec_block(body)? {
                        ExecResult::Normal | ExecResult::Skip => {}
                        ExecResult::Break => break,
                        ExecResult::Return(value) => return Ok(ExecResult::Return(value)),
                    }
                }
                Ok(ExecResult::Normal)
            }
            StatementKind::For {
                init,
                condition,
                increment,
                body,
            } => {
                let loop_scope = Environment::child(&self.environment);
                let previous = std::mem::replace(&mut self.environment, loop_scope);
                let result = self.exec_for(
                    statement,
                    init.as_deref(),
                    condition.as_ref(),
                    increment.as_deref(),
                    body,
                );
                self.environment = previous;
                result
            }
            StatementKind::Break => Ok(ExecResult::Break),
            StatementKind::Skip => Ok(ExecResult::Skip),
            StatementKind::Return(value) => {
                let value = match value {
                    Some(expr) => Some(self.evaluate(expr)?),
                    None => None,
                };
                Ok(ExecResult::Return(value))
            }
            StatementKind::FunctionDef(decl) => {
                let function = UserFunction {
                    decl: Rc::clone(decl),
                    closure: Rc::clone(&self.environment),
                };
                self.environment
                    .borrow_mut()
                    .define(
                        &decl.name,
                        Value::Callable(Callable::User(Rc::new(function))),
                        TypeTag::Function,
                        false,
                    )
                    .map_err(|kind| kind.at(span))?;
                Ok(ExecResult::Normal)
            }
            StatementKind::ClassDef(decl) => {
                let class = ClassObject::new(Rc::clone(decl), Rc::clone(&self.environment));
                self.environment
                    .borrow_mut()
                    .define(
                        &decl.name,
                        Value::Callable(Callable::Class(Rc::new(class))),
                        TypeTag::Function,
                        false,
                    )
                    .map_err(|kind| kind.at(span))?;
                Ok(ExecResult::Normal)
            }
            StatementKind::Expr(expr) => {
                self.evaluate(expr)?;
                Ok(ExecResult::Normal)
            }
        }
    }

    /// Body of a `for` loop; the caller has already pushed the loop scope
    /// that holds the init declaration.
    fn exec_for(
        &mut self,
        statement: &Statement,
        init: Option<&Statement>,
        condition: Option<&Expression>,
        increment: Option<&Statement>,
        body: &[Statement],
    ) -> ExecOutcome {
        if let Some(init) = init {
            self.exec_statement(init)?;
        }
        loop {
            self.check_cancelled(statement.span)?;
            if let Some(condition) = condition
                && !self.condition(condition)?
            {
                break;
            }
            match self.exec_block(body)? {
                ExecResult::Normal | ExecResult::Skip => {}
                ExecResult::Break => break,
                ExecResult::Return(value) => return Ok(ExecResult::Return(value)),
            }
            if let Some(increment) = increment {
                self.exec_statement(increment)?;
            }
        }
        Ok(ExecResult::Normal)
    }

    fn exec_assign(
        &mut self,
        target: &AssignTarget,
        value: &Expression,
    ) -> Result<(), RuntimeError> {
        match target {
            AssignTarget::Name { name, span } => {
                let value = self.evaluate(value)?;
                self.environment.borrow_mut().assign(name, value, *span)
            }
            AssignTarget::Index { target, index } => {
                let container = self.evaluate(target)?;
                let index_value = self.evaluate(index)?;
                let value = self.evaluate(value)?;
                let span = target.span.to(index.span);
                match &container {
                    Value::List(items) => {
                        list::set_item(items, &index_value, value).map_err(|kind| kind.at(span))
                    }
                    Value::Dict(entries) => {
                        dict::insert(entries, index_value, value);
                        Ok(())
                    }
                    other => Err(RuntimeErrorKind::NotAssignable {
                        type_name: other.type_name(),
                        target: "index".to_string(),
                    }
                    .at(span)),
                }
            }
            AssignTarget::Field { object, name } => {
                let receiver = self.evaluate(object)?;
                let value = self.evaluate(value)?;
                match &receiver {
                    Value::Instance(instance) => {
                        InstanceObject::set_field(instance, name, value)
                            .map_err(|kind| kind.at(object.span))
                    }
                    other => Err(RuntimeErrorKind::NotAssignable {
                        type_name: other.type_name(),
                        target: format!("field '{name}'"),
                    }
                    .at(object.span)),
                }
            }
        }
    }

    pub(super) fn condition(&mut self, expr: &Expression) -> Result<bool, RuntimeError> {
        match self.evaluate(expr)? {
            Value::Boolean(value) => Ok(value),
            other => Err(RuntimeErrorKind::ConditionType {
                found: other.type_name(),
            }
            .at(expr.span)),
        }
    }
}
