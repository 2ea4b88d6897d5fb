use std::collections::BTreeMap;

use credo_logic_ast::{extract_dependencies, Expr, Op, Value};
use credo_logic_eval::{Engine, Environment, FunctionSignature, ValueTy};

/// Example host function: module_count(layout) -> int.
fn main() {
    let mut engine = Engine::with_builtins();
    engine.registry_mut().register(
        "module_count",
        FunctionSignature::new(vec![ValueTy::Map], ValueTy::Int),
        |args, _| Ok(Value::Int(args[0].as_map()?.len() as i64)),
    );

    let expr = Expr::operator(
        Op::GreaterEqual,
        vec![
            Expr::call("module_count", vec![Expr::var("layout")]),
            Expr::lit(2),
        ],
    );

    let deps = extract_dependencies(&expr);
    println!("variables={:?}", deps.variables);
    println!("functions={:?}", deps.functions);

    let mut layout = BTreeMap::new();
    layout.insert("ast".to_string(), Value::Null);
    layout.insert("eval".to_string(), Value::Null);

    let mut env = Environment::new();
    env.bind("layout", Value::Map(layout));

    let result = engine.eval(&expr, &mut env).unwrap();
    println!("result={result}");
}
