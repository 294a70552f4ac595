//! Insertion-ordered dictionary keyed by any value.
//!
//! Keys are compared with value equality, so lookups are linear in the
//! number of entries.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::runtime::builtins::NativeMethod;
use crate::runtime::error::RuntimeErrorKind;
use crate::runtime::value::{self, NodeId, Value};

pub type DictRef = Rc<RefCell<DictObject>>;

#[derive(Debug, Clone, PartialEq)]
struct DictEntry {
    key: Value,
    value: Value,
}

#[derive(Debug, Clone, Default)]
pub struct DictObject {
    entries: Vec<DictEntry>,
}

impl DictObject {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find_index(&self, key: &Value) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == *key)
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.find_index(key).map(|index| &self.entries[index].value)
    }

    pub fn insert(&mut self, key: Value, value: Value) {
        match self.find_index(&key) {
            Some(index) => self.entries[index].value = value,
            None => self.entries.push(DictEntry { key, value }),
        }
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries.iter().map(|entry| entry.key.clone()).collect()
    }

    pub(crate) fn get_item(&self, key: &Value) -> Result<Value, RuntimeErrorKind> {
        self.get(key)
            .cloned()
            .ok_or_else(|| RuntimeErrorKind::MissingKey { key: key.repr() })
    }

    pub(crate) fn render(
        &self,
        f: &mut fmt::Formatter<'_>,
        active: &mut Vec<NodeId>,
    ) -> fmt::Result {
        write!(f, "{{")?;
        for (position, entry) in self.entries.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            value::render(&entry.key, f, active)?;
            write!(f, ": ")?;
            value::render(&entry.value, f, active)?;
        }
        write!(f, "}}")
    }

    /// Order-insensitive comparison of two dicts' entries.
    pub(crate) fn entries_equal(&self, other: &Self, active: &mut Vec<(NodeId, NodeId)>) -> bool {
        self.len() == other.len()
            && self.entries.iter().all(|entry| {
                other.entries.iter().any(|candidate| {
                    value::equals(&entry.key, &candidate.key, active)
                        && value::equals(&entry.value, &candidate.value, active)
                })
            })
    }
}

/// Inserts or replaces through a shared handle. The key is located under a
/// shared borrow first because comparing keys may read this same dict.
pub(crate) fn insert(dict: &DictRef, key: Value, value: Value) {
    let index = dict.borrow().find_index(&key);
    let mut dict = dict.borrow_mut();
    match index {
        Some(index) => dict.entries[index].value = value,
        None => dict.entries.push(DictEntry { key, value }),
    }
}

pub(crate) fn remove(dict: &DictRef, key: &Value) -> Option<Value> {
    let index = dict.borrow().find_index(key)?;
    Some(dict.borrow_mut().entries.remove(index).value)
}

impl PartialEq for DictObject {
    fn eq(&self, other: &Self) -> bool {
        self.entries_equal(other, &mut Vec::new())
    }
}

impl fmt::Display for DictObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Vec::new())
    }
}

pub(crate) static DICT_METHODS: &[NativeMethod] = &[
    NativeMethod {
        name: "keys",
        arity: 0,
        call: dict_keys,
    },
    NativeMethod {
        name: "remove",
        arity: 1,
        call: dict_remove,
    },
];

fn receiver_dict(receiver: &Value) -> Result<&DictRef, RuntimeErrorKind> {
    match receiver {
        Value::Dict(dict) => Ok(dict),
        other => Err(RuntimeErrorKind::NotCallable {
            type_name: other.type_name(),
        }),
    }
}

fn dict_keys(receiver: &Value, _args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    Ok(Value::list(receiver_dict(receiver)?.borrow().keys()))
}

fn dict_remove(receiver: &Value, args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    let dict = receiver_dict(receiver)?;
    let key = args.into_iter().next().unwrap_or(Value::Null);
    remove(dict, &key).ok_or_else(|| RuntimeErrorKind::MissingKey { key: key.repr() })
}
