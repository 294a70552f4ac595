use std::rc::Rc;

use crate::ast::{Expression, ExpressionKind, LogicalOperator};
use crate::runtime::builtins;
use crate::runtime::callable::{BoundMethod, BuiltinMethod, Callable};
use crate::runtime::dict::DictObject;
use crate::runtime::error::{RuntimeError, RuntimeErrorKind};
use crate::runtime::value::Value;
use crate::runtime::{list, string};
use crate::token::Span;

use super::{Interpreter, operators};

/// Remaining stack below which evaluation continues on a freshly allocated
/// segment.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

impl Interpreter<'_> {
    /// Evaluation recurses once per nested expression and per call, so the
    /// native stack is extended on the heap when it runs low.
    pub(super) fn evaluate(&mut self, expr: &Expression) -> Result<Value, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_inner(expr))
    }

    fn evaluate_inner(&mut self, expr: &Expression) -> Result<Value, RuntimeError> {
        let span = expr.span;
        match &expr.kind {
            ExpressionKind::Number(value) => Ok(Value::Number(*value)),
            ExpressionKind::String(value) => Ok(Value::String(value.clone())),
            ExpressionKind::Boolean(value) => Ok(Value::Boolean(*value)),
            ExpressionKind::Identifier(name) => self.environment.borrow().get(name, span),
            ExpressionKind::This => self.environment.borrow().get("this", span),
            ExpressionKind::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::list(values))
            }
            ExpressionKind::Dict(entries) => {
                let mut dict = DictObject::default();
                for (key, value) in entries {
                    let key = self.evaluate(key)?;
                    let value = self.evaluate(value)?;
                    dict.insert(key, value);
                }
                Ok(Value::dict(dict))
            }
            ExpressionKind::Binary { left, op, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                operators::binary(*op, &left, &right).map_err(|kind| kind.at(span))
            }
            ExpressionKind::Logical { left, op, right } => self.eval_logical(*op, left, right),
            ExpressionKind::Unary { op, operand } => {
                let operand = self.evaluate(operand)?;
                operators::unary(*op, &operand).map_err(|kind| kind.at(span))
            }
            ExpressionKind::Call { callee, args } => {
                let callee = self.evaluate(callee)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg)?);
                }
                self.call_value(callee, values, span)
            }
            ExpressionKind::FieldAccess { object, name } => {
                let receiver = self.evaluate(object)?;
                member(receiver, name).map_err(|kind| kind.at(span))
            }
            ExpressionKind::Index { target, index } => {
                let container = self.evaluate(target)?;
                let index = self.evaluate(index)?;
                index_value(&container, &index).map_err(|kind| kind.at(span))
            }
        }
    }

    /// `and`/`or` evaluate the right operand only when the left does not
    /// decide the result. Both operands must be booleans.
    fn eval_logical(
        &mut self,
        op: LogicalOperator,
        left: &Expression,
        right: &Expression,
    ) -> Result<Value, RuntimeError> {
        let left_value = self.logical_operand(op, left)?;
        match (op, left_value) {
            (LogicalOperator::And, false) => Ok(Value::Boolean(false)),
            (LogicalOperator::Or, true) => Ok(Value::Boolean(true)),
            _ => Ok(Value::Boolean(self.logical_operand(op, right)?)),
        }
    }

    fn logical_operand(
        &mut self,
        op: LogicalOperator,
        expr: &Expression,
    ) -> Result<bool, RuntimeError> {
        match self.evaluate(expr)? {
            Value::Boolean(value) => Ok(value),
            other => Err(operand_error(op, &other, expr.span)),
        }
    }
}

fn operand_error(op: LogicalOperator, value: &Value, span: Span) -> RuntimeError {
    RuntimeErrorKind::OperandType {
        op: op.symbol(),
        expected: "boolean",
        found: value.type_name(),
    }
    .at(span)
}

/// Reads `name` from an instance, or binds a built-in method of a list,
/// string or dict.
fn member(receiver: Value, name: &str) -> Result<Value, RuntimeErrorKind> {
    if let Value::Instance(instance) = &receiver {
        let object = instance.borrow();
        if let Some(value) = object.field(name) {
            return Ok(value.clone());
        }
        if let Some(method) = object.class.method(name) {
            return Ok(Value::Callable(Callable::Method(Rc::new(BoundMethod {
                receiver: Rc::clone(instance),
                class: Rc::clone(&object.class),
                method: Rc::clone(method),
            }))));
        }
    } else if let Some(method) = builtins::lookup_method(&receiver, name) {
        return Ok(Value::Callable(Callable::Builtin(Rc::new(BuiltinMethod {
            receiver,
            method,
        }))));
    }
    Err(RuntimeErrorKind::UnknownMember {
        type_name: receiver.type_name(),
        name: name.to_string(),
    })
}

fn index_value(container: &Value, index: &Value) -> Result<Value, RuntimeErrorKind> {
    match container {
        Value::List(items) => list::get_item(items, index),
        Value::String(text) => string::get_char(text, index),
        Value::Dict(entries) => entries.borrow().get_item(index),
        other => Err(RuntimeErrorKind::NotIndexable {
            type_name: other.type_name(),
        }),
    }
}
