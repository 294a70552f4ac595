//! Runtime object model: values, scopes, callables and the method tables of
//! the built-in kinds.
pub mod builtins;
pub mod callable;
pub mod class;
pub mod dict;
pub mod environment;
pub mod error;
pub mod list;
pub mod string;
pub mod value;

pub use environment::{EnvRef, Environment};
pub use error::{ErrorCategory, RuntimeError, RuntimeErrorKind};
pub use value::Value;
