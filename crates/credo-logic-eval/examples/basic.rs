use credo_logic_ast::{Expr, Op};
use credo_logic_eval::{Engine, Environment};

fn main() {
    let mut engine = Engine::with_builtins();
    engine.enable_tracing(true);
    let mut env = Environment::new();

    let expr = Expr::forall(
        "x",
        Expr::lit(vec![1.into(), 2.into(), 3.into()]),
        Expr::operator(Op::GreaterThan, vec![Expr::var("x"), Expr::lit(0)]),
    );

    let result = engine.eval(&expr, &mut env).unwrap();
    println!("result={result}");
    println!("metrics={:?}", engine.metrics());
    for line in engine.execution_trace() {
        println!("{line}");
    }
}
