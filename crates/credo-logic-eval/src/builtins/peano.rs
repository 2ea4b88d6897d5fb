//! Peano builtins: `successor`, `predecessor`, `is_zero`. Predecessor
//! saturates at zero, matching the naturals.

use credo_logic_ast::{LogicError, Value};

use crate::registry::{FunctionRegistry, FunctionSignature, ValueTy};

fn successor(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    args[0]
        .as_int()?
        .checked_add(1)
        .map(Value::Int)
        .ok_or_else(|| LogicError::type_error("successor: integer overflow"))
}

fn predecessor(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    let n = args[0].as_int()?;
    Ok(Value::Int(if n > 0 { n - 1 } else { 0 }))
}

fn is_zero(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    Ok(Value::Bool(args[0].as_int()? == 0))
}

pub fn register(registry: &mut FunctionRegistry) {
    let unary_int = || FunctionSignature::new(vec![ValueTy::Int], ValueTy::Int);
    registry.register("successor", unary_int(), successor);
    registry.register("predecessor", unary_int(), predecessor);
    registry.register(
        "is_zero",
        FunctionSignature::new(vec![ValueTy::Int], ValueTy::Bool),
        is_zero,
    );
}
