//! Native functions installed in the global scope and the method tables of
//! the built-in value kinds.

use std::fmt;

use crate::interpreter::Interpreter;
use crate::runtime::dict::DICT_METHODS;
use crate::runtime::error::RuntimeErrorKind;
use crate::runtime::list::LIST_METHODS;
use crate::runtime::string::STRING_METHODS;
use crate::runtime::value::Value;

pub type NativeFn = fn(&mut Interpreter<'_>, Vec<Value>) -> Result<Value, RuntimeErrorKind>;
pub type MethodFn = fn(&Value, Vec<Value>) -> Result<Value, RuntimeErrorKind>;

pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub call: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// A method of a built-in kind; `call` receives the receiver first.
pub struct NativeMethod {
    pub name: &'static str,
    pub arity: usize,
    pub call: MethodFn,
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeMethod")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

pub static NATIVE_FUNCTIONS: &[NativeFunction] = &[NativeFunction {
    name: "input",
    arity: 1,
    call: native_input,
}];

fn native_input(
    interpreter: &mut Interpreter<'_>,
    args: Vec<Value>,
) -> Result<Value, RuntimeErrorKind> {
    let prompt = args
        .into_iter()
        .next()
        .map(|prompt| prompt.to_string())
        .unwrap_or_default();
    Ok(Value::String(interpreter.read_input(&prompt)))
}

pub(crate) fn lookup_method(receiver: &Value, name: &str) -> Option<&'static NativeMethod> {
    let table: &'static [NativeMethod] = match receiver {
        Value::List(_) => LIST_METHODS,
        Value::String(_) => STRING_METHODS,
        Value::Dict(_) => DICT_METHODS,
        _ => &[],
    };
    table.iter().find(|method| method.name == name)
}
