//! Meta functions over expressions carried as data.
//!
//! `logic.is_well_formed` and `logic.all_functions_exist` take an
//! AST-as-value and answer about its shape, not its result. Undecodable
//! input yields `false`, never an error: self-validation treats a broken
//! expression as a failed check.

use credo_logic_ast::{LogicError, Value};

use crate::registry::{FunctionRegistry, FunctionSignature, ValueTy};

fn is_well_formed(args: &[Value], _: &FunctionRegistry) -> Result<Value, LogicError> {
    Ok(Value::Bool(credo_logic_check::well_formed(&args[0]).is_ok()))
}

fn all_functions_exist(args: &[Value], registry: &FunctionRegistry) -> Result<Value, LogicError> {
    let all_exist = match credo_logic_check::missing_functions(&args[0], registry) {
        Ok(missing) => missing.is_empty(),
        Err(_) => false,
    };
    Ok(Value::Bool(all_exist))
}

pub fn register(registry: &mut FunctionRegistry) {
    let unary_any = || FunctionSignature::new(vec![ValueTy::Any], ValueTy::Bool);
    registry.register("logic.is_well_formed", unary_any(), is_well_formed);
    registry.register("logic.all_functions_exist", unary_any(), all_functions_exist);
}
