//! Map reflection: `has_field`, `get_field`. An absent key is `null`, not
//! an error; presence is what `has_field` is for.

use credo_logic_ast::{LogicError, Value};

use crate::registry::{FunctionRegistry, FunctionSignature, ValueTy};

fn has_field(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    Ok(Value::Bool(args[0].as_map()?.contains_key(args[1].as_str()?)))
}

fn get_field(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    Ok(args[0]
        .as_map()?
        .get(args[1].as_str()?)
        .cloned()
        .unwrap_or(Value::Null))
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(
        "has_field",
        FunctionSignature::new(vec![ValueTy::Map, ValueTy::String], ValueTy::Bool),
        has_field,
    );
    registry.register(
        "get_field",
        FunctionSignature::new(vec![ValueTy::Map, ValueTy::String], ValueTy::Any),
        get_field,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample() -> Value {
        let mut entries = BTreeMap::new();
        entries.insert("name".to_string(), Value::String("core".into()));
        Value::Map(entries)
    }

    fn registry() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        register(&mut registry);
        registry
    }

    #[test]
    fn presence_and_projection() {
        let registry = registry();
        assert_eq!(
            registry
                .call("has_field", &[sample(), Value::String("name".into())])
                .unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            registry
                .call("get_field", &[sample(), Value::String("name".into())])
                .unwrap(),
            Value::String("core".into())
        );
    }

    #[test]
    fn absent_key_is_null() {
        let registry = registry();
        assert_eq!(
            registry
                .call("get_field", &[sample(), Value::String("missing".into())])
                .unwrap(),
            Value::Null
        );
        assert_eq!(
            registry
                .call("has_field", &[sample(), Value::String("missing".into())])
                .unwrap(),
            Value::Bool(false)
        );
    }
}
