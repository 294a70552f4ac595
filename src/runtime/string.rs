use crate::runtime::builtins::NativeMethod;
use crate::runtime::error::RuntimeErrorKind;
use crate::runtime::value::Value;

pub(crate) static STRING_METHODS: &[NativeMethod] = &[
    NativeMethod {
        name: "toNumber",
        arity: 0,
        call: string_to_number,
    },
    NativeMethod {
        name: "toBoolean",
        arity: 0,
        call: string_to_boolean,
    },
    NativeMethod {
        name: "length",
        arity: 0,
        call: string_length,
    },
];

fn receiver_str(receiver: &Value) -> Result<&str, RuntimeErrorKind> {
    match receiver {
        Value::String(value) => Ok(value),
        other => Err(RuntimeErrorKind::NotCallable {
            type_name: other.type_name(),
        }),
    }
}

fn string_to_number(receiver: &Value, _args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    let text = receiver_str(receiver)?;
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .map(Value::Number)
        .ok_or_else(|| RuntimeErrorKind::InvalidConversion {
            value: receiver.repr(),
            target: "number",
        })
}

fn string_to_boolean(receiver: &Value, _args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    match receiver_str(receiver)?.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Value::Boolean(true)),
        "false" => Ok(Value::Boolean(false)),
        _ => Err(RuntimeErrorKind::InvalidConversion {
            value: receiver.repr(),
            target: "boolean",
        }),
    }
}

fn string_length(receiver: &Value, _args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    Ok(Value::Number(receiver_str(receiver)?.chars().count() as f64))
}

/// Indexing a string yields the character at that position as a string.
pub(crate) fn get_char(text: &str, index: &Value) -> Result<Value, RuntimeErrorKind> {
    let len = text.chars().count();
    let position = crate::runtime::list::checked_index(index, len)?;
    Ok(text
        .chars()
        .nth(position)
        .map(|c| Value::String(c.to_string()))
        .unwrap_or(Value::Null))
}
