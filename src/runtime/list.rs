use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::builtins::NativeMethod;
use crate::runtime::error::RuntimeErrorKind;
use crate::runtime::value::Value;

pub type ListRef = Rc<RefCell<Vec<Value>>>;

pub(crate) static LIST_METHODS: &[NativeMethod] = &[
    NativeMethod {
        name: "append",
        arity: 1,
        call: list_append,
    },
    NativeMethod {
        name: "pop",
        arity: 0,
        call: list_pop,
    },
    NativeMethod {
        name: "length",
        arity: 0,
        call: list_length,
    },
];

fn receiver_list(receiver: &Value) -> Result<&ListRef, RuntimeErrorKind> {
    match receiver {
        Value::List(list) => Ok(list),
        other => Err(RuntimeErrorKind::NotCallable {
            type_name: other.type_name(),
        }),
    }
}

fn list_append(receiver: &Value, args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    let list = receiver_list(receiver)?;
    list.borrow_mut().extend(args);
    Ok(Value::Null)
}

fn list_pop(receiver: &Value, _args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    receiver_list(receiver)?
        .borrow_mut()
        .pop()
        .ok_or(RuntimeErrorKind::EmptyList)
}

fn list_length(receiver: &Value, _args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    Ok(Value::Number(receiver_list(receiver)?.borrow().len() as f64))
}

/// Converts an index operand into a position within `len` elements.
pub(crate) fn checked_index(index: &Value, len: usize) -> Result<usize, RuntimeErrorKind> {
    let Value::Number(number) = index else {
        return Err(RuntimeErrorKind::InvalidIndex {
            found: index.repr(),
        });
    };
    if *number < 0.0 || number.fract() != 0.0 || !number.is_finite() {
        return Err(RuntimeErrorKind::InvalidIndex {
            found: index.repr(),
        });
    }
    let position = *number as usize;
    if position >= len {
        return Err(RuntimeErrorKind::IndexOutOfBounds {
            index: position,
            len,
        });
    }
    Ok(position)
}

pub(crate) fn get_item(list: &ListRef, index: &Value) -> Result<Value, RuntimeErrorKind> {
    let values = list.borrow();
    let position = checked_index(index, values.len())?;
    Ok(values[position].clone())
}

pub(crate) fn set_item(list: &ListRef, index: &Value, value: Value) -> Result<(), RuntimeErrorKind> {
    let mut values = list.borrow_mut();
    let position = checked_index(index, values.len())?;
    values[position] = value;
    Ok(())
}
