use credo_logic_ast::Value;
use credo_logic_driver::{execute_rule, execute_rule_self_validation, execute_rule_unit_tests};
use credo_logic_eval::{Engine, Environment};
use serde_json::json;

fn main() {
    let logic = json!({
        "quantifier": "forall",
        "variable": "path",
        "domain": {"var": "source_files"},
        "condition": {"function": "matches",
                      "arguments": [{"var": "path"}, "\\.rs$"]}
    });
    let doc = Value::from_json(&json!({
        "rule": {
            "name": "rust-sources-only",
            "logic": logic.clone(),
            "unit_tests": [{
                "test_data": {"source_files": ["src/lib.rs", "src/engine.rs"]},
                "test_logic": logic,
                "expected_result": true
            }],
            "self_validation": {
                "logic": {"function": "logic.all_functions_exist",
                          "arguments": [{"var": "rule_logic"}]}
            }
        }
    }));

    let mut engine = Engine::with_builtins();
    let mut env = Environment::new();
    env.bind(
        "source_files",
        Value::List(vec![
            Value::String("src/lib.rs".into()),
            Value::String("src/value.rs".into()),
        ]),
    );

    let verdict = execute_rule(&mut engine, &doc, &mut env).unwrap();
    let tests_pass = execute_rule_unit_tests(&mut engine, &doc).unwrap();
    let self_valid = execute_rule_self_validation(&mut engine, &doc).unwrap();

    println!("rule verdict={verdict}");
    println!("unit tests pass={tests_pass}");
    println!("self validation={self_valid}");
}
