use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::runtime::builtins::{NativeFunction, NativeMethod};
use crate::runtime::class::{ClassObject, InstanceRef};
use crate::runtime::environment::EnvRef;
use crate::runtime::value::Value;

/// Anything a call expression can invoke.
#[derive(Debug, Clone)]
pub enum Callable {
    Native(&'static NativeFunction),
    User(Rc<UserFunction>),
    Class(Rc<ClassObject>),
    Method(Rc<BoundMethod>),
    Builtin(Rc<BuiltinMethod>),
}

impl Callable {
    pub fn name(&self) -> String {
        match self {
            Callable::Native(native) => native.name.to_string(),
            Callable::User(function) => function.decl.name.clone(),
            Callable::Class(class) => class.name().to_string(),
            Callable::Method(method) => method.method.name.clone(),
            Callable::Builtin(builtin) => builtin.method.name.to_string(),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::User(function) => function.decl.params.len(),
            Callable::Class(class) => class.init().map_or(0, |init| init.params.len()),
            Callable::Method(method) => method.method.params.len(),
            Callable::Builtin(builtin) => builtin.method.arity,
        }
    }

    /// Callables compare by identity.
    pub(crate) fn same_as(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => std::ptr::eq(*a, *b),
            (Callable::User(a), Callable::User(b)) => Rc::ptr_eq(a, b),
            (Callable::Class(a), Callable::Class(b)) => Rc::ptr_eq(a, b),
            (Callable::Method(a), Callable::Method(b)) => {
                Rc::ptr_eq(&a.receiver, &b.receiver) && Rc::ptr_eq(&a.method, &b.method)
            }
            (Callable::Builtin(a), Callable::Builtin(b)) => {
                std::ptr::eq(a.method, b.method) && a.receiver == b.receiver
            }
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => write!(f, "<native function {}>", native.name),
            Callable::User(function) => write!(f, "<function {}>", function.decl.name),
            Callable::Class(class) => write!(f, "<class {}>", class.name()),
            Callable::Method(method) => {
                write!(f, "<method {}.{}>", method.class.name(), method.method.name)
            }
            Callable::Builtin(builtin) => write!(
                f,
                "<method {}.{}>",
                builtin.receiver.type_name(),
                builtin.method.name
            ),
        }
    }
}

/// A declared function together with the scope it closes over.
pub struct UserFunction {
    pub decl: Rc<FunctionDecl>,
    pub closure: EnvRef,
}

impl fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserFunction")
            .field("name", &self.decl.name)
            .finish_non_exhaustive()
    }
}

/// A class method bound to the instance it was read from.
pub struct BoundMethod {
    pub receiver: InstanceRef,
    pub class: Rc<ClassObject>,
    pub method: Rc<FunctionDecl>,
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("class", &self.class.name())
            .field("method", &self.method.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct BuiltinMethod {
    pub receiver: Value,
    pub method: &'static NativeMethod,
}
