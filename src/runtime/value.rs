use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::TypeTag;
use crate::runtime::callable::Callable;
use crate::runtime::class::InstanceRef;
use crate::runtime::dict::{DictObject, DictRef};
use crate::runtime::list::ListRef;

/// A runtime value.
///
/// Lists, dicts and instances are shared references: copying the value
/// aliases the same storage. `Null` is the typed-null that an uninitialised
/// declaration or a `void` call produces.
#[derive(Clone)]
pub enum Value {
    Null,
    Number(f64),
    String(String),
    Boolean(bool),
    List(ListRef),
    Dict(DictRef),
    Instance(InstanceRef),
    Callable(Callable),
}

impl Value {
    pub fn list(values: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(values)))
    }

    pub fn dict(dict: DictObject) -> Self {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Number(_) => "number".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Boolean(_) => "boolean".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Dict(_) => "dict".to_string(),
            Value::Instance(instance) => instance.borrow().class.name().to_string(),
            Value::Callable(_) => "function".to_string(),
        }
    }

    /// Whether a slot declared with `tag` may hold this value.
    pub fn conforms_to(&self, tag: &TypeTag) -> bool {
        match (tag, self) {
            (_, Value::Null) => true,
            (TypeTag::Object, _) => true,
            (TypeTag::Number, Value::Number(_))
            | (TypeTag::String, Value::String(_))
            | (TypeTag::Boolean, Value::Boolean(_))
            | (TypeTag::List, Value::List(_))
            | (TypeTag::Dict, Value::Dict(_))
            | (TypeTag::Function, Value::Callable(_)) => true,
            (TypeTag::Class(name), Value::Instance(instance)) => {
                instance.borrow().class.name() == name
            }
            _ => false,
        }
    }

    /// Like `Display`, but quotes strings. Used inside error messages.
    pub fn repr(&self) -> String {
        match self {
            Value::String(value) => format!("{value:?}"),
            other => other.to_string(),
        }
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

const STACK_RED_ZONE: usize = 32 * 1024;
const STACK_GROW_SIZE: usize = 256 * 1024;

/// Identity of a shared list or dict while it is being walked.
pub(crate) type NodeId = *const ();

/// Renders `value`, printing `[...]` or `{...}` for a list or dict that is
/// already being rendered further up, so self-containing values terminate.
pub(crate) fn render(
    value: &Value,
    f: &mut fmt::Formatter<'_>,
    active: &mut Vec<NodeId>,
) -> fmt::Result {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || match value {
        Value::Null => write!(f, "null"),
        Value::Number(value) => write!(f, "{}", format_number(*value)),
        Value::String(value) => write!(f, "{value}"),
        Value::Boolean(value) => write!(f, "{value}"),
        Value::List(list) => {
            let id = Rc::as_ptr(list).cast::<()>();
            if active.contains(&id) {
                return write!(f, "[...]");
            }
            active.push(id);
            write!(f, "[")?;
            for (position, item) in list.borrow().iter().enumerate() {
                if position > 0 {
                    write!(f, ", ")?;
                }
                render(item, f, active)?;
            }
            active.pop();
            write!(f, "]")
        }
        Value::Dict(dict) => {
            let id = Rc::as_ptr(dict).cast::<()>();
            if active.contains(&id) {
                return write!(f, "{{...}}");
            }
            active.push(id);
            dict.borrow().render(f, active)?;
            active.pop();
            Ok(())
        }
        Value::Instance(instance) => {
            write!(f, "<{} instance>", instance.borrow().class.name())
        }
        Value::Callable(callable) => write!(f, "{callable}"),
    })
}

/// Structural equality that treats a pair of lists or dicts already under
/// comparison as equal, so cyclic values compare without looping.
pub(crate) fn equals(left: &Value, right: &Value, active: &mut Vec<(NodeId, NodeId)>) -> bool {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let pair = (Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>());
            if active.contains(&pair) {
                return true;
            }
            active.push(pair);
            let (a, b) = (a.borrow(), b.borrow());
            let same = a.len() == b.len()
                && a.iter().zip(b.iter()).all(|(x, y)| equals(x, y, active));
            active.pop();
            same
        }
        (Value::Dict(a), Value::Dict(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let pair = (Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>());
            if active.contains(&pair) {
                return true;
            }
            active.push(pair);
            let same = a.borrow().entries_equal(&b.borrow(), active);
            active.pop();
            same
        }
        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
        (Value::Callable(a), Value::Callable(b)) => a.same_as(b),
        _ => false,
    })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self, f, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(value) => write!(f, "{value:?}"),
            other => render(other, f, &mut Vec::new()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equals(self, other, &mut Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::Number(-3.0).to_string(), "-3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
    }

    #[test]
    fn collections_render_their_elements() {
        let list = Value::list(vec![
            Value::Number(1.0),
            Value::String("a".to_string()),
            Value::list(vec![Value::Boolean(true)]),
        ]);
        assert_eq!(list.to_string(), "[1, a, [true]]");

        let mut dict = DictObject::default();
        dict.insert(Value::String("a".to_string()), Value::Number(1.0));
        dict.insert(Value::Number(2.0), Value::Null);
        assert_eq!(Value::dict(dict).to_string(), "{a: 1, 2: null}");
    }

    #[test]
    fn lists_compare_structurally_and_alias_on_clone() {
        let a = Value::list(vec![Value::Number(1.0)]);
        let b = Value::list(vec![Value::Number(1.0)]);
        assert_eq!(a, b);

        let alias = a.clone();
        if let Value::List(list) = &alias {
            list.borrow_mut().push(Value::Number(2.0));
        }
        assert_eq!(a.to_string(), "[1, 2]");
        assert_ne!(a, b);
    }

    #[test]
    fn null_conforms_to_every_tag() {
        for tag in [
            TypeTag::Number,
            TypeTag::String,
            TypeTag::List,
            TypeTag::Class("Point".to_string()),
        ] {
            assert!(Value::Null.conforms_to(&tag));
        }
        assert!(Value::Number(1.0).conforms_to(&TypeTag::Object));
        assert!(!Value::Number(1.0).conforms_to(&TypeTag::String));
        assert!(!Value::String("1".to_string()).conforms_to(&TypeTag::Number));
    }

    #[test]
    fn self_containing_list_renders_and_compares() {
        let xs = Value::list(vec![Value::Number(1.0)]);
        if let Value::List(list) = &xs {
            list.borrow_mut().push(xs.clone());
        }
        assert_eq!(xs.to_string(), "[1, [...]]");
        assert_eq!(xs, xs.clone());

        let ys = Value::list(vec![Value::Number(1.0)]);
        if let Value::List(list) = &ys {
            list.borrow_mut().push(ys.clone());
        }
        assert_eq!(xs, ys);

        let zs = Value::list(vec![Value::Number(2.0)]);
        if let Value::List(list) = &zs {
            list.borrow_mut().push(zs.clone());
        }
        assert_ne!(xs, zs);
    }

    #[test]
    fn self_containing_dict_renders() {
        let dict = Value::dict(DictObject::default());
        if let Value::Dict(inner) = &dict {
            inner
                .borrow_mut()
                .insert(Value::String("me".to_string()), dict.clone());
        }
        assert_eq!(dict.to_string(), "{me: {...}}");
        assert_eq!(dict, dict.clone());
    }

    #[test]
    fn mixed_kinds_are_never_equal() {
        assert_ne!(Value::Number(1.0), Value::String("1".to_string()));
        assert_ne!(Value::Boolean(false), Value::Null);
    }
}
