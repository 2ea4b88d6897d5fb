//!
//! Expression-as-data decoding.
//!
//! Rule and philosophy documents carry their logic subtrees as plain value
//! maps; this module gives that shape one documented meaning. A map with a
//! recognized discriminant key decodes to the matching constructor; any
//! non-map value is shorthand for a literal. A map without a discriminant
//! is a malformed expression.

use std::collections::BTreeMap;

use crate::error::LogicError;
use crate::expr::{Expr, FixpointStrategy, Op, QuantifierKind};
use crate::value::Value;

/// Decodes a value into an expression tree.
pub fn decode(value: &Value) -> Result<Expr, LogicError> {
    match value {
        Value::Map(entries) => decode_map(entries),
        other => Ok(Expr::Literal(other.clone())),
    }
}

fn decode_map(entries: &BTreeMap<String, Value>) -> Result<Expr, LogicError> {
    if let Some(value) = entries.get("literal") {
        return Ok(Expr::Literal(value.clone()));
    }
    if let Some(name) = entries.get("var") {
        return Ok(Expr::Var(expect_string(name, "var")?));
    }
    if let Some(name) = entries.get("operator") {
        let op = Op::parse(&expect_string(name, "operator")?)?;
        let operands = required(entries, "operands", "operator node")?;
        return Ok(Expr::Operator {
            op,
            args: decode_list(operands, "operands")?,
        });
    }
    if let Some(name) = entries.get("function") {
        let args = match entries.get("arguments") {
            Some(arguments) => decode_list(arguments, "arguments")?,
            None => Vec::new(),
        };
        return Ok(Expr::Call {
            name: expect_string(name, "function")?,
            args,
        });
    }
    if let Some(kind) = entries.get("quantifier") {
        let kind = match expect_string(kind, "quantifier")?.as_str() {
            "forall" => QuantifierKind::Forall,
            "exists" => QuantifierKind::Exists,
            other => {
                return Err(LogicError::malformed(format!(
                    "unknown quantifier kind `{other}`"
                )))
            }
        };
        let var = expect_string(required(entries, "variable", "quantifier node")?, "variable")?;
        let domain = decode(required(entries, "domain", "quantifier node")?)?;
        let condition = decode(required(entries, "condition", "quantifier node")?)?;
        return Ok(Expr::Quantifier {
            kind,
            var,
            domain: Box::new(domain),
            condition: Box::new(condition),
        });
    }
    if let Some(condition) = entries.get("if") {
        let condition = decode(condition)?;
        let then = decode(required(entries, "then", "if node")?)?;
        let otherwise = match entries.get("else") {
            Some(value) => Some(Box::new(decode(value)?)),
            None => None,
        };
        return Ok(Expr::If {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise,
        });
    }
    if let Some(params) = entries.get("fixpoint") {
        return decode_fixpoint(params);
    }
    if let Some(object) = entries.get("get_field") {
        let key = decode(required(entries, "key", "get_field node")?)?;
        return Ok(Expr::GetField {
            object: Box::new(decode(object)?),
            key: Box::new(key),
        });
    }
    if let Some(object) = entries.get("has_field") {
        let key = decode(required(entries, "key", "has_field node")?)?;
        return Ok(Expr::HasField {
            object: Box::new(decode(object)?),
            key: Box::new(key),
        });
    }
    Err(LogicError::malformed(
        "map value has no recognized constructor key",
    ))
}

fn decode_fixpoint(params: &Value) -> Result<Expr, LogicError> {
    let entries = match params {
        Value::Map(entries) => entries,
        other => {
            return Err(LogicError::malformed(format!(
                "fixpoint params must be a map, got {}",
                other.tag()
            )))
        }
    };
    let var = expect_string(required(entries, "variable", "fixpoint params")?, "variable")?;
    let body = decode(required(entries, "expression", "fixpoint params")?)?;
    let initial = entries.get("initial").cloned();
    let max_iterations = match entries.get("max_iterations") {
        Some(value) => Some(expect_count(value, "max_iterations")?),
        None => None,
    };
    let strategy = match entries.get("strategy") {
        Some(value) => Some(FixpointStrategy::parse(&expect_string(value, "strategy")?)?),
        None => None,
    };
    let tolerance = match entries.get("tolerance") {
        Some(value) => Some(value.as_int().map_err(|err| {
            LogicError::malformed(format!("fixpoint tolerance: {err}"))
        })?),
        None => None,
    };
    Ok(Expr::Fixpoint {
        var,
        body: Box::new(body),
        initial,
        max_iterations,
        strategy,
        tolerance,
    })
}

fn required<'a>(
    entries: &'a BTreeMap<String, Value>,
    key: &str,
    context: &str,
) -> Result<&'a Value, LogicError> {
    entries
        .get(key)
        .ok_or_else(|| LogicError::malformed(format!("{context} is missing `{key}`")))
}

fn expect_string(value: &Value, field: &str) -> Result<String, LogicError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(LogicError::malformed(format!(
            "`{field}` must be a string, got {}",
            other.tag()
        ))),
    }
}

fn expect_count(value: &Value, field: &str) -> Result<u32, LogicError> {
    match value {
        Value::Int(n) if *n >= 0 && *n <= u32::MAX as i64 => Ok(*n as u32),
        other => Err(LogicError::malformed(format!(
            "`{field}` must be a non-negative int, got {other}"
        ))),
    }
}

fn decode_list(value: &Value, field: &str) -> Result<Vec<Expr>, LogicError> {
    match value {
        Value::List(items) => items.iter().map(decode).collect(),
        other => Err(LogicError::malformed(format!(
            "`{field}` must be a list, got {}",
            other.tag()
        ))),
    }
}
