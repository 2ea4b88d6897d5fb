//! Collection builtins: `count`, `contains`, `list`.

use credo_logic_ast::{LogicError, Value};

use crate::registry::{FunctionRegistry, FunctionSignature, ValueTy};

fn count(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    Ok(Value::Int(args[0].as_list()?.len() as i64))
}

/// List membership, or substring containment when both sides are strings.
fn contains(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    args[0].contains(&args[1]).map(Value::Bool)
}

/// Builds a list from its arguments; the only way to assemble a list out
/// of variable bindings.
fn list(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    Ok(Value::List(args.to_vec()))
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(
        "count",
        FunctionSignature::new(vec![ValueTy::List], ValueTy::Int),
        count,
    );
    registry.register(
        "contains",
        FunctionSignature::new(vec![ValueTy::Any, ValueTy::Any], ValueTy::Bool),
        contains,
    );
    registry.register("list", FunctionSignature::variadic(ValueTy::List), list);
}
