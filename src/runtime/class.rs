use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::{ClassDecl, FunctionDecl, TypeTag};
use crate::runtime::environment::EnvRef;
use crate::runtime::error::RuntimeErrorKind;
use crate::runtime::value::Value;

pub type InstanceRef = Rc<RefCell<InstanceObject>>;

pub const INITIALIZER: &str = "init";

pub struct ClassObject {
    decl: Rc<ClassDecl>,
    methods: HashMap<String, Rc<FunctionDecl>>,
    pub(crate) closure: EnvRef,
}

impl ClassObject {
    pub fn new(decl: Rc<ClassDecl>, closure: EnvRef) -> Self {
        let methods = decl
            .methods
            .iter()
            .map(|method| (method.name.clone(), Rc::clone(method)))
            .collect();
        Self {
            decl,
            methods,
            closure,
        }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn method(&self, name: &str) -> Option<&Rc<FunctionDecl>> {
        self.methods.get(name)
    }

    pub fn init(&self) -> Option<&Rc<FunctionDecl>> {
        self.method(INITIALIZER)
    }

    /// A fresh instance with every declared field set to null.
    pub fn instantiate(self: &Rc<Self>) -> InstanceRef {
        let fields = self
            .decl
            .fields
            .iter()
            .map(|field| {
                (
                    field.name.clone(),
                    Field {
                        type_tag: field.type_tag.clone(),
                        value: Value::Null,
                    },
                )
            })
            .collect();
        Rc::new(RefCell::new(InstanceObject {
            class: Rc::clone(self),
            fields,
        }))
    }
}

impl fmt::Debug for ClassObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassObject")
            .field("name", &self.name())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub type_tag: TypeTag,
    pub value: Value,
}

pub struct InstanceObject {
    pub class: Rc<ClassObject>,
    fields: HashMap<String, Field>,
}

impl InstanceObject {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).map(|field| &field.value)
    }

    /// Writes a declared field, enforcing its type tag.
    ///
    /// The check runs before the instance is borrowed mutably, since `value`
    /// may be the instance itself.
    pub fn set_field(
        instance: &InstanceRef,
        name: &str,
        value: Value,
    ) -> Result<(), RuntimeErrorKind> {
        let (class, type_tag) = {
            let object = instance.borrow();
            let class = object.class.name().to_string();
            match object.fields.get(name) {
                Some(field) => (class, field.type_tag.clone()),
                None => {
                    return Err(RuntimeErrorKind::UnknownMember {
                        type_name: class,
                        name: name.to_string(),
                    });
                }
            }
        };
        if !value.conforms_to(&type_tag) {
            return Err(RuntimeErrorKind::FieldType {
                class,
                field: name.to_string(),
                expected: type_tag.to_string(),
                found: value.type_name(),
            });
        }
        if let Some(field) = instance.borrow_mut().fields.get_mut(name) {
            field.value = value;
        }
        Ok(())
    }
}

impl fmt::Debug for InstanceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceObject")
            .field("class", &self.class.name())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FieldDecl;
    use crate::runtime::environment::Environment;
    use crate::token::Span;

    fn point_class() -> Rc<ClassObject> {
        let decl = ClassDecl {
            name: "Point".to_string(),
            fields: vec![FieldDecl {
                name: "x".to_string(),
                type_tag: TypeTag::Number,
                span: Span::default(),
            }],
            methods: Vec::new(),
            span: Span::default(),
        };
        Rc::new(ClassObject::new(Rc::new(decl), Environment::global()))
    }

    #[test]
    fn new_instance_fields_start_null() {
        let instance = point_class().instantiate();
        assert_eq!(instance.borrow().field("x"), Some(&Value::Null));
        assert!(instance.borrow().field("y").is_none());
    }

    #[test]
    fn field_writes_respect_declared_type() {
        let instance = point_class().instantiate();
        InstanceObject::set_field(&instance, "x", Value::Number(3.0)).unwrap();
        assert_eq!(instance.borrow().field("x"), Some(&Value::Number(3.0)));
        assert!(matches!(
            InstanceObject::set_field(&instance, "x", Value::String("a".to_string())),
            Err(RuntimeErrorKind::FieldType { .. })
        ));
        assert!(matches!(
            InstanceObject::set_field(&instance, "z", Value::Number(1.0)),
            Err(RuntimeErrorKind::UnknownMember { .. })
        ));
    }

    #[test]
    fn instance_may_store_itself_in_a_field() {
        let decl = ClassDecl {
            name: "Node".to_string(),
            fields: vec![FieldDecl {
                name: "next".to_string(),
                type_tag: TypeTag::Class("Node".to_string()),
                span: Span::default(),
            }],
            methods: Vec::new(),
            span: Span::default(),
        };
        let class = Rc::new(ClassObject::new(Rc::new(decl), Environment::global()));
        let node = class.instantiate();
        let this = Value::Instance(Rc::clone(&node));
        InstanceObject::set_field(&node, "next", this.clone()).unwrap();
        assert_eq!(node.borrow().field("next"), Some(&this));

        let error = InstanceObject::set_field(&node, "next", Value::Number(1.0)).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Field 'next' of Node expects Node, got number"
        );
    }
}
