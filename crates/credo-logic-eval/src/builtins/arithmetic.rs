//! Integer arithmetic: `add`, `subtract`, `multiply`, `divide`, `modulo`,
//! `power`. All checked; overflow surfaces as a type-kind error since the
//! taxonomy carries no overflow kind.

use credo_logic_ast::{LogicError, Value};

use crate::registry::{FunctionRegistry, FunctionSignature, ValueTy};

fn ints(args: &[Value]) -> Result<(i64, i64), LogicError> {
    Ok((args[0].as_int()?, args[1].as_int()?))
}

fn overflow(function: &str) -> LogicError {
    LogicError::type_error(format!("{function}: integer overflow"))
}

fn add(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    let (a, b) = ints(args)?;
    a.checked_add(b).map(Value::Int).ok_or_else(|| overflow("add"))
}

fn subtract(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    let (a, b) = ints(args)?;
    a.checked_sub(b)
        .map(Value::Int)
        .ok_or_else(|| overflow("subtract"))
}

fn multiply(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    let (a, b) = ints(args)?;
    a.checked_mul(b)
        .map(Value::Int)
        .ok_or_else(|| overflow("multiply"))
}

fn divide(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    let (a, b) = ints(args)?;
    if b == 0 {
        return Err(LogicError::DivisionByZero {
            function: "divide".into(),
        });
    }
    a.checked_div(b)
        .map(Value::Int)
        .ok_or_else(|| overflow("divide"))
}

fn modulo(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    let (a, b) = ints(args)?;
    if b == 0 {
        return Err(LogicError::DivisionByZero {
            function: "modulo".into(),
        });
    }
    a.checked_rem(b)
        .map(Value::Int)
        .ok_or_else(|| overflow("modulo"))
}

fn power(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    let (a, b) = ints(args)?;
    let exponent = u32::try_from(b)
        .map_err(|_| LogicError::type_error("power: exponent must fit a non-negative u32"))?;
    a.checked_pow(exponent)
        .map(Value::Int)
        .ok_or_else(|| overflow("power"))
}

pub fn register(registry: &mut FunctionRegistry) {
    let int_pair = || FunctionSignature::new(vec![ValueTy::Int, ValueTy::Int], ValueTy::Int);
    registry.register("add", int_pair(), add);
    registry.register("subtract", int_pair(), subtract);
    registry.register("multiply", int_pair(), multiply);
    registry.register("divide", int_pair(), divide);
    registry.register("modulo", int_pair(), modulo);
    registry.register("power", int_pair(), power);
}
