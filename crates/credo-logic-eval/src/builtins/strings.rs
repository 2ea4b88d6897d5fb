//! String builtins: `length`, `concat`, `starts_with`, `string_of_int`,
//! `matches`.

use credo_logic_ast::{LogicError, Value};
use regex::Regex;

use crate::registry::{FunctionRegistry, FunctionSignature, ValueTy};

fn length(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    Ok(Value::Int(args[0].as_str()?.chars().count() as i64))
}

/// Joins any number of strings.
fn concat(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    let mut joined = String::new();
    for (position, arg) in args.iter().enumerate() {
        match arg {
            Value::String(s) => joined.push_str(s),
            other => {
                return Err(LogicError::type_error(format!(
                    "concat: expected string, got {} at argument {position}",
                    other.tag()
                )))
            }
        }
    }
    Ok(Value::String(joined))
}

fn starts_with(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    Ok(Value::Bool(args[0].as_str()?.starts_with(args[1].as_str()?)))
}

fn string_of_int(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    Ok(Value::String(args[0].as_int()?.to_string()))
}

/// Anchored nowhere: a match anywhere in the subject counts.
fn matches(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    let subject = args[0].as_str()?;
    let pattern = Regex::new(args[1].as_str()?)
        .map_err(|err| LogicError::type_error(format!("matches: invalid pattern: {err}")))?;
    Ok(Value::Bool(pattern.is_match(subject)))
}

pub fn register(registry: &mut FunctionRegistry) {
    let string_pair = || FunctionSignature::new(vec![ValueTy::String, ValueTy::String], ValueTy::Bool);
    registry.register(
        "length",
        FunctionSignature::new(vec![ValueTy::String], ValueTy::Int),
        length,
    );
    registry.register("concat", FunctionSignature::variadic(ValueTy::String), concat);
    registry.register("starts_with", string_pair(), starts_with);
    registry.register(
        "string_of_int",
        FunctionSignature::new(vec![ValueTy::Int], ValueTy::String),
        string_of_int,
    );
    registry.register("matches", string_pair(), matches);
}

#[cfg(test)]
mod tests {
    use super::*;
    use credo_logic_ast::ErrorKind;

    fn registry() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        register(&mut registry);
        registry
    }

    #[test]
    fn length_counts_chars() {
        let registry = registry();
        assert_eq!(
            registry
                .call("length", &[Value::String("héllo".into())])
                .unwrap(),
            Value::Int(5)
        );
    }

    #[test]
    fn concat_is_variadic_and_string_only() {
        let registry = registry();
        assert_eq!(
            registry
                .call(
                    "concat",
                    &[
                        Value::String("ok".into()),
                        Value::String(":".into()),
                        Value::String("3".into())
                    ]
                )
                .unwrap(),
            Value::String("ok:3".into())
        );
        assert_eq!(registry.call("concat", &[]).unwrap(), Value::String(String::new()));
        let err = registry
            .call("concat", &[Value::String("n=".into()), Value::Int(3)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn prefix_and_conversion() {
        let registry = registry();
        assert_eq!(
            registry
                .call(
                    "starts_with",
                    &[Value::String("src/lib.rs".into()), Value::String("src/".into())]
                )
                .unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            registry.call("string_of_int", &[Value::Int(-7)]).unwrap(),
            Value::String("-7".into())
        );
    }

    #[test]
    fn regex_matching() {
        let registry = registry();
        assert_eq!(
            registry
                .call(
                    "matches",
                    &[
                        Value::String("tests/engine.rs".into()),
                        Value::String(r"\.rs$".into())
                    ]
                )
                .unwrap(),
            Value::Bool(true)
        );
        let err = registry
            .call(
                "matches",
                &[Value::String("x".into()), Value::String("(".into())],
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }
}
