//! Lexical scopes.
//!
//! Each block, loop body and call gets a child environment linked to the one
//! it was created in. Lookup walks outward; declarations always land in the
//! innermost scope, so inner declarations shadow outer ones.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::TypeTag;
use crate::runtime::error::{RuntimeError, RuntimeErrorKind};
use crate::runtime::value::Value;
use crate::token::Span;

pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Clone)]
pub struct Variable {
    pub value: Value,
    pub type_tag: TypeTag,
    pub is_const: bool,
}

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Variable>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn global() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub fn child(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            enclosing: Some(Rc::clone(enclosing)),
        }))
    }

    /// Declares `name` in this scope.
    ///
    /// Redeclaring a non-const name replaces it; redeclaring a const in the
    /// same scope is an error.
    pub fn define(
        &mut self,
        name: &str,
        value: Value,
        type_tag: TypeTag,
        is_const: bool,
    ) -> Result<(), RuntimeErrorKind> {
        if self.values.get(name).is_some_and(|existing| existing.is_const) {
            return Err(RuntimeErrorKind::ConstRedefinition {
                name: name.to_string(),
            });
        }
        if !value.conforms_to(&type_tag) {
            return Err(RuntimeErrorKind::TypeMismatch {
                name: name.to_string(),
                expected: type_tag.to_string(),
                found: value.type_name(),
            });
        }
        self.values.insert(
            name.to_string(),
            Variable {
                value,
                type_tag,
                is_const,
            },
        );
        Ok(())
    }

    /// Binds `name` without the const-redefinition check. Used to seed a
    /// fresh global scope.
    pub(crate) fn bind(&mut self, name: &str, variable: Variable) {
        self.values.insert(name.to_string(), variable);
    }

    pub fn lookup(&self, name: &str) -> Option<Variable> {
        match self.values.get(name) {
            Some(variable) => Some(variable.clone()),
            None => self
                .enclosing
                .as_ref()
                .and_then(|enclosing| enclosing.borrow().lookup(name)),
        }
    }

    pub fn get(&self, name: &str, span: Span) -> Result<Value, RuntimeError> {
        self.lookup(name)
            .map(|variable| variable.value)
            .ok_or_else(|| {
                RuntimeErrorKind::UndefinedVariable {
                    name: name.to_string(),
                }
                .at(span)
            })
    }

    /// Updates the nearest binding of `name`, honouring const and type tags.
    pub fn assign(&mut self, name: &str, value: Value, span: Span) -> Result<(), RuntimeError> {
        if let Some(variable) = self.values.get_mut(name) {
            if variable.is_const {
                return Err(RuntimeErrorKind::ConstReassignment {
                    name: name.to_string(),
                }
                .at(span));
            }
            if !value.conforms_to(&variable.type_tag) {
                return Err(RuntimeErrorKind::TypeMismatch {
                    name: name.to_string(),
                    expected: variable.type_tag.to_string(),
                    found: value.type_name(),
                }
                .at(span));
            }
            variable.value = value;
            return Ok(());
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value, span),
            None => Err(RuntimeErrorKind::UndefinedVariable {
                name: name.to_string(),
            }
            .at(span)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scopes_see_and_shadow_outer_names() {
        let globals = Environment::global();
        globals
            .borrow_mut()
            .define("x", Value::Number(1.0), TypeTag::Number, false)
            .unwrap();
        let inner = Environment::child(&globals);
        assert_eq!(inner.borrow().get("x", Span::default()).unwrap(), Value::Number(1.0));

        inner
            .borrow_mut()
            .define("x", Value::String("s".to_string()), TypeTag::String, false)
            .unwrap();
        assert_eq!(
            inner.borrow().get("x", Span::default()).unwrap(),
            Value::String("s".to_string())
        );
        assert_eq!(globals.borrow().get("x", Span::default()).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn assignment_updates_nearest_binding() {
        let globals = Environment::global();
        globals
            .borrow_mut()
            .define("n", Value::Number(1.0), TypeTag::Number, false)
            .unwrap();
        let inner = Environment::child(&globals);
        inner
            .borrow_mut()
            .assign("n", Value::Number(2.0), Span::default())
            .unwrap();
        assert_eq!(globals.borrow().get("n", Span::default()).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn constants_reject_assignment_and_redefinition() {
        let env = Environment::global();
        env.borrow_mut()
            .define("x", Value::Number(1.0), TypeTag::Number, true)
            .unwrap();
        let error = env
            .borrow_mut()
            .assign("x", Value::Number(2.0), Span::default())
            .unwrap_err();
        assert_eq!(
            error.kind,
            RuntimeErrorKind::ConstReassignment {
                name: "x".to_string()
            }
        );
        assert!(matches!(
            env.borrow_mut()
                .define("x", Value::Number(3.0), TypeTag::Number, false),
            Err(RuntimeErrorKind::ConstRedefinition { .. })
        ));
    }

    #[test]
    fn type_tags_are_enforced() {
        let env = Environment::global();
        assert!(matches!(
            env.borrow_mut()
                .define("x", Value::String("a".to_string()), TypeTag::Number, false),
            Err(RuntimeErrorKind::TypeMismatch { .. })
        ));
        env.borrow_mut()
            .define("x", Value::Null, TypeTag::Number, false)
            .unwrap();
        let error = env
            .borrow_mut()
            .assign("x", Value::Boolean(true), Span::default())
            .unwrap_err();
        assert_eq!(error.category(), crate::runtime::error::ErrorCategory::Type);
    }

    #[test]
    fn unknown_names_are_runtime_errors() {
        let env = Environment::global();
        let error = env.borrow().get("missing", Span::default()).unwrap_err();
        assert_eq!(error.to_string(), "RuntimeError: Undefined variable 'missing'");
    }
}
