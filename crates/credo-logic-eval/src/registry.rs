//!
//! Named external functions with declared signatures.
//!
//! A registered function is a pair of `FunctionSignature` and callable;
//! dispatch is a map lookup. The core treats registered functions as pure:
//! hosts registering impure functions either use distinct names per
//! side-effecting context or disable caching.

use std::collections::HashMap;

use credo_logic_ast::{LogicError, Tag, Value};
use credo_logic_check::FunctionLookup;

/// Parameter/return tag for registered functions. `Any` admits every
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTy {
    Null,
    Bool,
    Int,
    String,
    List,
    Map,
    Any,
}

impl ValueTy {
    pub fn admits(&self, value: &Value) -> bool {
        matches!(
            (self, value.tag()),
            (ValueTy::Any, _)
                | (ValueTy::Null, Tag::Null)
                | (ValueTy::Bool, Tag::Bool)
                | (ValueTy::Int, Tag::Int)
                | (ValueTy::String, Tag::String)
                | (ValueTy::List, Tag::List)
                | (ValueTy::Map, Tag::Map)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueTy::Null => "null",
            ValueTy::Bool => "bool",
            ValueTy::Int => "int",
            ValueTy::String => "string",
            ValueTy::List => "list",
            ValueTy::Map => "map",
            ValueTy::Any => "any",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub params: Vec<ValueTy>,
    pub ret: ValueTy,
}

impl FunctionSignature {
    pub fn new(params: Vec<ValueTy>, ret: ValueTy) -> Self {
        FunctionSignature { params, ret }
    }

    /// An empty parameter declaration: any arity, tags unchecked.
    pub fn variadic(ret: ValueTy) -> Self {
        FunctionSignature {
            params: Vec::new(),
            ret,
        }
    }
}

type Callable = Box<dyn Fn(&[Value], &FunctionRegistry) -> Result<Value, LogicError>>;

struct Registered {
    signature: FunctionSignature,
    callable: Callable,
}

/// Registry for functions referenced from `Expr::Call`, owned by one
/// engine. Mutated only through `register`, typically during setup.
#[derive(Default)]
pub struct FunctionRegistry {
    funcs: HashMap<String, Registered>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        FunctionRegistry {
            funcs: HashMap::new(),
        }
    }

    /// Registry with the builtin groups preinstalled.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::install(&mut registry);
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, signature: FunctionSignature, callable: F)
    where
        F: Fn(&[Value], &FunctionRegistry) -> Result<Value, LogicError> + 'static,
    {
        self.funcs.insert(
            name.into(),
            Registered {
                signature,
                callable: Box::new(callable),
            },
        );
    }

    pub fn has(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn signature(&self, name: &str) -> Option<&FunctionSignature> {
        self.funcs.get(name).map(|registered| &registered.signature)
    }

    /// Dispatch with arity and per-parameter tag checks. An empty
    /// parameter declaration skips both. The declared return tag is
    /// metadata for hosts, not a runtime assertion.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, LogicError> {
        let registered = self
            .funcs
            .get(name)
            .ok_or_else(|| LogicError::UnknownFunction {
                name: name.to_string(),
            })?;
        let params = &registered.signature.params;
        if !params.is_empty() {
            if params.len() != args.len() {
                return Err(LogicError::Arity {
                    function: name.to_string(),
                    expected: params.len(),
                    actual: args.len(),
                });
            }
            for (position, (param, arg)) in params.iter().zip(args).enumerate() {
                if !param.admits(arg) {
                    return Err(LogicError::type_error(format!(
                        "{name}: argument {position} expects {}, got {}",
                        param.name(),
                        arg.tag()
                    )));
                }
            }
        }
        (registered.callable)(args, self)
    }
}

impl FunctionLookup for FunctionRegistry {
    fn has_function(&self, name: &str) -> bool {
        self.has(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credo_logic_ast::ErrorKind;

    fn registry_with_double() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        registry.register(
            "double",
            FunctionSignature::new(vec![ValueTy::Int], ValueTy::Int),
            |args, _| Ok(Value::Int(args[0].as_int()? * 2)),
        );
        registry
    }

    #[test]
    fn dispatch_checks_arity_then_tags() {
        let registry = registry_with_double();
        assert_eq!(
            registry.call("double", &[Value::Int(21)]).unwrap(),
            Value::Int(42)
        );

        let err = registry.call("double", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Arity);

        let err = registry.call("double", &[Value::Bool(true)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn unknown_function_is_reported() {
        let registry = FunctionRegistry::new();
        let err = registry.call("nope", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownFunction);
    }

    #[test]
    fn empty_declaration_skips_checks() {
        let mut registry = FunctionRegistry::new();
        registry.register(
            "arity",
            FunctionSignature::variadic(ValueTy::Int),
            |args, _| Ok(Value::Int(args.len() as i64)),
        );
        assert_eq!(registry.call("arity", &[]).unwrap(), Value::Int(0));
        assert_eq!(
            registry
                .call("arity", &[Value::Null, Value::Bool(false), Value::Int(1)])
                .unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn signatures_are_observable() {
        let registry = registry_with_double();
        assert!(registry.has("double"));
        let signature = registry.signature("double").unwrap();
        assert_eq!(signature.params, vec![ValueTy::Int]);
        assert_eq!(signature.ret, ValueTy::Int);
        assert!(registry.signature("nope").is_none());
    }
}
