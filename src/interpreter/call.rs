use std::rc::Rc;

use tracing::trace;

use crate::ast::{FunctionDecl, TypeTag};
use crate::runtime::callable::Callable;
use crate::runtime::class::ClassObject;
use crate::runtime::environment::{EnvRef, Environment};
use crate::runtime::error::{RuntimeError, RuntimeErrorKind};
use crate::runtime::value::Value;
use crate::token::Span;

use super::{ExecResult, Interpreter};

impl Interpreter<'_> {
    pub(super) fn call_value(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let Value::Callable(callable) = callee else {
            return Err(RuntimeErrorKind::NotCallable {
                type_name: callee.type_name(),
            }
            .at(span));
        };
        RuntimeErrorKind::expect_arity(&callable.name(), callable.arity(), args.len())
            .map_err(|kind| kind.at(span))?;
        match callable {
            Callable::Native(native) => (native.call)(self, args).map_err(|kind| kind.at(span)),
            Callable::Builtin(bound) => {
                (bound.method.call)(&bound.receiver, args).map_err(|kind| kind.at(span))
            }
            Callable::User(function) => {
                self.call_function(&function.decl, &function.closure, None, args, span)
            }
            Callable::Method(bound) => {
                let this = Value::Instance(Rc::clone(&bound.receiver));
                self.call_function(&bound.method, &bound.class.closure, Some(this), args, span)
            }
            Callable::Class(class) => self.instantiate(&class, args, span),
        }
    }

    /// Binds `args` to the declared parameters in a scope enclosed by
    /// `closure`, runs the body and checks the result against the declared
    /// return type. The argument count has already been checked.
    fn call_function(
        &mut self,
        decl: &FunctionDecl,
        closure: &EnvRef,
        this: Option<Value>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(RuntimeErrorKind::CallDepthExceeded {
                limit: self.config.max_call_depth,
            }
            .at(span));
        }

        let scope = Environment::child(closure);
        {
            let mut frame = scope.borrow_mut();
            if let Some(this) = this {
                frame
                    .define("this", this, TypeTag::Object, true)
                    .map_err(|kind| kind.at(span))?;
            }
            for (param, arg) in decl.params.iter().zip(args) {
                if !arg.conforms_to(&param.type_tag) {
                    return Err(RuntimeErrorKind::ArgumentType {
                        function: decl.name.clone(),
                        param: param.name.clone(),
                        expected: param.type_tag.to_string(),
                        found: arg.type_name(),
                    }
                    .at(span));
                }
                frame
                    .define(&param.name, arg, param.type_tag.clone(), false)
                    .map_err(|kind| kind.at(span))?;
            }
        }

        self.call_depth += 1;
        trace!(function = %decl.name, depth = self.call_depth, "call");
        let result = self.exec_block_in(&decl.body, scope);
        self.call_depth -= 1;

        match result? {
            ExecResult::Return(Some(value)) => {
                if decl.return_type == TypeTag::Void {
                    return Err(RuntimeErrorKind::VoidReturnValue {
                        function: decl.name.clone(),
                    }
                    .at(span));
                }
                if !value.conforms_to(&decl.return_type) {
                    return Err(RuntimeErrorKind::ReturnType {
                        function: decl.name.clone(),
                        expected: decl.return_type.to_string(),
                        found: value.type_name(),
                    }
                    .at(span));
                }
                Ok(value)
            }
            ExecResult::Return(None) | ExecResult::Normal => {
                if decl.return_type == TypeTag::Void {
                    Ok(Value::Null)
                } else {
                    Err(RuntimeErrorKind::MissingReturn {
                        name: decl.name.clone(),
                        expected: decl.return_type.to_string(),
                    }
                    .at(span))
                }
            }
            ExecResult::Break => Err(escape("break", span)),
            ExecResult::Skip => Err(escape("skip", span)),
        }
    }

    /// Creates an instance with null fields, then runs `init` on it if the
    /// class declares one.
    fn instantiate(
        &mut self,
        class: &Rc<ClassObject>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let instance = class.instantiate();
        if let Some(init) = class.init() {
            let init = Rc::clone(init);
            let this = Value::Instance(Rc::clone(&instance));
            self.call_function(&init, &class.closure, Some(this), args, span)?;
        }
        trace!(class = class.name(), "instantiated");
        Ok(Value::Instance(instance))
    }
}

fn escape(signal: &'static str, span: Span) -> RuntimeError {
    RuntimeErrorKind::ControlFlowEscape {
        signal,
        boundary: "function",
    }
    .at(span)
}
