//!
//! Rule and philosophy driver over the evaluation engine.
//!
//! Documents are plain `Value` maps with well-known keys:
//! - `rule.logic`, `rule.unit_tests[].{test_data, test_logic,
//!   expected_result}`, `rule.self_validation.logic`;
//! - `philosophy.formal_logic.conclusion.logic`,
//!   `philosophy.self_proof.logic`.
//!
//! The evaluator knows nothing about these shapes; this crate decodes the
//! logic subtrees, supplies the conventional context bindings, and leaves
//! every evaluation error to the host. Nothing here converts an error into
//! a `false` result.

use credo_logic_ast::{decode, LogicError, Value};
use credo_logic_eval::{Engine, Environment};

/// Walks nested maps by key. `None` on any missing step or non-map hop.
pub fn doc_get<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cursor = doc;
    for key in path {
        match cursor {
            Value::Map(entries) => cursor = entries.get(*key)?,
            _ => return None,
        }
    }
    Some(cursor)
}

fn require<'a>(doc: &'a Value, path: &[&str]) -> Result<&'a Value, LogicError> {
    doc_get(doc, path)
        .ok_or_else(|| LogicError::malformed(format!("document is missing `{}`", path.join("."))))
}

fn require_bool(value: Value, what: &str) -> Result<bool, LogicError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(LogicError::type_error(format!(
            "{what} must yield bool, got {}",
            other.tag()
        ))),
    }
}

/// Evaluates `rule.logic` with `rule` and `rule_logic` bound for
/// introspection.
pub fn execute_rule(
    engine: &mut Engine,
    doc: &Value,
    env: &mut Environment,
) -> Result<Value, LogicError> {
    let logic = require(doc, &["rule", "logic"])?;
    env.bind("rule", require(doc, &["rule"])?.clone());
    env.bind("rule_logic", logic.clone());
    engine.eval(&decode(logic)?, env)
}

/// Runs every embedded unit test against a fresh environment seeded from
/// its `test_data`. The first expectation mismatch yields `false`;
/// evaluation errors propagate untouched.
pub fn execute_rule_unit_tests(engine: &mut Engine, doc: &Value) -> Result<bool, LogicError> {
    let tests = require(doc, &["rule", "unit_tests"])?.as_list()?;
    for test in tests {
        let mut env = Environment::new();
        if let Some(data) = doc_get(test, &["test_data"]) {
            for (name, value) in data.as_map()? {
                env.bind(name.clone(), value.clone());
            }
        }
        let logic = require(test, &["test_logic"])?;
        let expected = require(test, &["expected_result"])?;
        let actual = engine.eval(&decode(logic)?, &mut env)?;
        if actual != *expected {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluates `rule.self_validation.logic` under `rule`/`rule_logic`
/// bindings; the rule inspecting its own formula.
pub fn execute_rule_self_validation(engine: &mut Engine, doc: &Value) -> Result<bool, LogicError> {
    let logic = require(doc, &["rule", "self_validation", "logic"])?;
    let mut env = Environment::new();
    env.bind("rule", require(doc, &["rule"])?.clone());
    if let Some(rule_logic) = doc_get(doc, &["rule", "logic"]) {
        env.bind("rule_logic", rule_logic.clone());
    }
    let result = engine.eval(&decode(logic)?, &mut env)?;
    require_bool(result, "self_validation")
}

/// Default introspection contexts bound for philosophy evaluation: maps of
/// named booleans describing how the host's codebase is organized. A host
/// overrides one by binding the same name before the call.
pub fn introspection_defaults() -> Vec<(&'static str, Value)> {
    let map_of = |pairs: &[(&str, bool)]| {
        Value::Map(
            pairs
                .iter()
                .map(|(name, flag)| (name.to_string(), Value::Bool(*flag)))
                .collect(),
        )
    };
    vec![
        (
            "file_organization",
            map_of(&[
                ("sources_layout_consistent", true),
                ("tests_colocated", true),
                ("single_purpose_files", true),
            ]),
        ),
        (
            "code_structure",
            map_of(&[
                ("modules_separated", true),
                ("interfaces_defined", true),
                ("no_circular_dependencies", true),
            ]),
        ),
        (
            "code_quality",
            map_of(&[
                ("errors_propagated", true),
                ("naming_consistent", true),
                ("documented", true),
            ]),
        ),
    ]
}

fn bind_philosophy_context(doc: &Value, env: &mut Environment) -> Result<(), LogicError> {
    env.bind("philosophy", require(doc, &["philosophy"])?.clone());
    if let Some(formal) = doc_get(doc, &["philosophy", "formal_logic"]) {
        env.bind("formal_logic", formal.clone());
    }
    for (name, value) in introspection_defaults() {
        if !env.has(name) {
            env.bind(name, value);
        }
    }
    Ok(())
}

/// Evaluates `philosophy.formal_logic.conclusion.logic` under the
/// philosophy bindings and introspection contexts.
pub fn execute_philosophy(
    engine: &mut Engine,
    doc: &Value,
    env: &mut Environment,
) -> Result<Value, LogicError> {
    let logic = require(doc, &["philosophy", "formal_logic", "conclusion", "logic"])?;
    let expr = decode(logic)?;
    bind_philosophy_context(doc, env)?;
    engine.eval(&expr, env)
}

/// Evaluates `philosophy.self_proof.logic`; the philosophy proving a
/// property about itself.
pub fn execute_philosophy_self_proof(
    engine: &mut Engine,
    doc: &Value,
) -> Result<bool, LogicError> {
    let logic = require(doc, &["philosophy", "self_proof", "logic"])?;
    let mut env = Environment::new();
    bind_philosophy_context(doc, &mut env)?;
    let result = engine.eval(&decode(logic)?, &mut env)?;
    require_bool(result, "self_proof")
}
