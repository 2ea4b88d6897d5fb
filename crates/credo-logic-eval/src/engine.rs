//!
//! The recursive evaluator with its cache, trace, and metrics.
//!
//! Evaluation is strictly synchronous and single-threaded; operand order
//! is left-to-right with no short-circuit outside `if` and quantifier
//! early exit. All mutable state (registry, cache, trace, counters) is
//! instance-scoped.

use std::cmp::Ordering;
use std::collections::HashMap;

use credo_logic_ast::{
    ast_hash, is_closed, render_short, render_value_short, Expr, FixpointStrategy, LogicError, Op,
    QuantifierKind, Value,
};

use crate::env::Environment;
use crate::registry::FunctionRegistry;

const DEFAULT_MAX_ITERATIONS: u32 = 1000;
/// Oscillation detection looks this many values back.
const FIXPOINT_HISTORY: usize = 10;

/// Counters observable by the host.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub function_calls: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

struct FixpointParams<'a> {
    var: &'a str,
    body: &'a Expr,
    max_iterations: u32,
    strategy: FixpointStrategy,
    tolerance: i64,
}

enum FixpointOutcome {
    Converged { value: Value, iteration: u32 },
    Oscillating { value: Value },
    Diverged,
    Failed(LogicError),
}

/// One evaluator instance. Not thread-safe by design: hosts wanting
/// parallelism create one engine per thread.
pub struct Engine {
    registry: FunctionRegistry,
    cache: HashMap<String, Value>,
    caching: bool,
    tracing: bool,
    trace: Vec<String>,
    metrics: Metrics,
    depth: usize,
}

impl Engine {
    /// Engine with an empty registry. Caching starts enabled, tracing
    /// disabled.
    pub fn new() -> Self {
        Engine {
            registry: FunctionRegistry::new(),
            cache: HashMap::new(),
            caching: true,
            tracing: false,
            trace: Vec::new(),
            metrics: Metrics::default(),
            depth: 0,
        }
    }

    /// Engine with the builtin function groups preinstalled.
    pub fn with_builtins() -> Self {
        let mut engine = Self::new();
        engine.registry = FunctionRegistry::with_builtins();
        engine
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    /// Disabling also empties the store.
    pub fn enable_caching(&mut self, enabled: bool) {
        self.caching = enabled;
        if !enabled {
            self.cache.clear();
        }
    }

    pub fn enable_tracing(&mut self, enabled: bool) {
        self.tracing = enabled;
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn reset_metrics(&mut self) {
        self.metrics = Metrics::default();
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Ordered log of `EVAL:`/`CACHE HIT`/`RESULT:` entries, indented by
    /// evaluation depth. Unbounded: long-running hosts disable tracing or
    /// clear between runs.
    pub fn execution_trace(&self) -> &[String] {
        &self.trace
    }

    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    fn trace_line(&mut self, text: &str) {
        let mut line = "  ".repeat(self.depth);
        line.push_str(text);
        self.trace.push(line);
    }

    /// Evaluates an expression under the given environment.
    pub fn eval(&mut self, expr: &Expr, env: &mut Environment) -> Result<Value, LogicError> {
        if self.tracing {
            self.trace_line(&format!("EVAL: {}", render_short(expr)));
        }

        let cache_key = self.cache_key(expr);
        if let Some(key) = &cache_key {
            if let Some(hit) = self.cache.get(key) {
                let hit = hit.clone();
                self.metrics.cache_hits += 1;
                if self.tracing {
                    self.depth += 1;
                    self.trace_line("CACHE HIT");
                    self.depth -= 1;
                    self.trace_line(&format!("RESULT: {}", render_value_short(&hit)));
                }
                return Ok(hit);
            }
        }

        self.depth += 1;
        let result = self.eval_node(expr, env);
        self.depth -= 1;

        let value = result?;
        if let Some(key) = cache_key {
            self.metrics.cache_misses += 1;
            self.cache.insert(key, value.clone());
        }
        if self.tracing {
            self.trace_line(&format!("RESULT: {}", render_value_short(&value)));
        }
        Ok(value)
    }

    /// Closed, non-literal expressions are the memoizable ones; literals
    /// are their own value already.
    fn cache_key(&self, expr: &Expr) -> Option<String> {
        if !self.caching || matches!(expr, Expr::Literal(_)) || !is_closed(expr) {
            return None;
        }
        Some(ast_hash(expr))
    }

    fn eval_node(&mut self, expr: &Expr, env: &mut Environment) -> Result<Value, LogicError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Var(name) => env
                .lookup(name)
                .ok_or_else(|| LogicError::Name { name: name.clone() }),
            Expr::Operator { op, args } => self.eval_operator(*op, args, env, expr),
            Expr::Call { name, args } => {
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.eval(arg, env)?);
                }
                self.metrics.function_calls += 1;
                self.registry.call(name, &evaluated)
            }
            Expr::Quantifier {
                kind,
                var,
                domain,
                condition,
            } => self.eval_quantifier(*kind, var, domain, condition, env),
            Expr::If {
                condition,
                then,
                otherwise,
            } => {
                let decided = self.eval(condition, env)?;
                let decided = decided
                    .as_bool()
                    .map_err(|err| err.annotated(&render_short(condition)))?;
                if decided {
                    self.eval(then, env)
                } else if let Some(otherwise) = otherwise {
                    self.eval(otherwise, env)
                } else {
                    Ok(Value::Null)
                }
            }
            Expr::GetField { object, key } => {
                let (entries, key) = self.eval_projection(object, key, env)?;
                Ok(entries.get(&key).cloned().unwrap_or(Value::Null))
            }
            Expr::HasField { object, key } => {
                let (entries, key) = self.eval_projection(object, key, env)?;
                Ok(Value::Bool(entries.contains_key(&key)))
            }
            Expr::Fixpoint {
                var,
                body,
                initial,
                max_iterations,
                strategy,
                tolerance,
            } => {
                let strategy = strategy.unwrap_or(FixpointStrategy::Standard);
                let start = match initial {
                    Some(value) => value.clone(),
                    None => match strategy {
                        FixpointStrategy::Least => Value::Bool(false),
                        FixpointStrategy::Greatest => Value::Bool(true),
                        _ => Value::Null,
                    },
                };
                let params = FixpointParams {
                    var,
                    body,
                    max_iterations: max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
                    strategy,
                    tolerance: tolerance.unwrap_or(0),
                };
                self.eval_fixpoint(&params, start, env)
            }
        }
    }

    fn eval_projection(
        &mut self,
        object: &Expr,
        key: &Expr,
        env: &mut Environment,
    ) -> Result<(std::collections::BTreeMap<String, Value>, String), LogicError> {
        let object_value = self.eval(object, env)?;
        let entries = object_value
            .as_map()
            .map_err(|err| err.annotated(&render_short(object)))?
            .clone();
        let key_value = self.eval(key, env)?;
        let key = key_value
            .as_str()
            .map_err(|err| err.annotated(&render_short(key)))?
            .to_string();
        Ok((entries, key))
    }

    fn eval_operator(
        &mut self,
        op: Op,
        args: &[Expr],
        env: &mut Environment,
        node: &Expr,
    ) -> Result<Value, LogicError> {
        if args.len() != op.arity() {
            return Err(LogicError::malformed(format!(
                "operator `{}` expects {} operand(s), got {}",
                op.name(),
                op.arity(),
                args.len()
            ))
            .annotated(&render_short(node)));
        }
        match op {
            Op::Not => {
                let operand = self.eval(&args[0], env)?;
                Ok(Value::Bool(!expect_bool(&operand, node)?))
            }
            // Strict: both sides evaluate even when the left decides the
            // result, so an ill-typed right operand always surfaces.
            Op::And | Op::Or | Op::Implies => {
                let lhs = self.eval(&args[0], env)?;
                let rhs = self.eval(&args[1], env)?;
                let (a, b) = (expect_bool(&lhs, node)?, expect_bool(&rhs, node)?);
                Ok(Value::Bool(match op {
                    Op::And => a && b,
                    Op::Or => a || b,
                    _ => !a || b,
                }))
            }
            Op::Equals => {
                let lhs = self.eval(&args[0], env)?;
                let rhs = self.eval(&args[1], env)?;
                Ok(Value::Bool(lhs == rhs))
            }
            Op::LessThan | Op::LessEqual | Op::GreaterThan | Op::GreaterEqual => {
                let lhs = self.eval(&args[0], env)?;
                let rhs = self.eval(&args[1], env)?;
                let ordering = lhs
                    .compare(&rhs)
                    .map_err(|err| err.annotated(&render_short(node)))?;
                Ok(Value::Bool(match op {
                    Op::LessThan => ordering == Ordering::Less,
                    Op::LessEqual => ordering != Ordering::Greater,
                    Op::GreaterThan => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }))
            }
        }
    }

    fn eval_quantifier(
        &mut self,
        kind: QuantifierKind,
        var: &str,
        domain: &Expr,
        condition: &Expr,
        env: &mut Environment,
    ) -> Result<Value, LogicError> {
        let domain_value = self.eval(domain, env)?;
        let items = match domain_value {
            Value::List(items) => items,
            other => {
                return Err(LogicError::type_error(format!(
                    "quantifier domain must be a list, got {}",
                    other.tag()
                ))
                .annotated(&render_short(domain)))
            }
        };

        env.push();
        let result = self.quantifier_loop(kind, var, &items, condition, env);
        env.pop();
        result
    }

    fn quantifier_loop(
        &mut self,
        kind: QuantifierKind,
        var: &str,
        items: &[Value],
        condition: &Expr,
        env: &mut Environment,
    ) -> Result<Value, LogicError> {
        for item in items {
            env.bind(var, item.clone());
            let verdict = self.eval(condition, env)?;
            let holds = expect_bool(&verdict, condition)?;
            match kind {
                QuantifierKind::Forall if !holds => return Ok(Value::Bool(false)),
                QuantifierKind::Exists if holds => return Ok(Value::Bool(true)),
                _ => {}
            }
        }
        Ok(Value::Bool(kind == QuantifierKind::Forall))
    }

    fn eval_fixpoint(
        &mut self,
        params: &FixpointParams<'_>,
        start: Value,
        env: &mut Environment,
    ) -> Result<Value, LogicError> {
        let mut history: Vec<Value> = Vec::new();

        env.push();
        let outcome = self.fixpoint_loop(params, start, &mut history, env);
        env.pop();

        match outcome {
            FixpointOutcome::Converged { value, iteration } => {
                env.bind("__converged_at", Value::Int(i64::from(iteration)));
                if self.tracing {
                    self.trace_line(&format!("FIXPOINT: converged at iteration {iteration}"));
                }
                Ok(value)
            }
            FixpointOutcome::Oscillating { value } => {
                env.bind("__oscillating", Value::Bool(true));
                if self.tracing {
                    self.trace_line("FIXPOINT: oscillation detected");
                }
                Ok(value)
            }
            FixpointOutcome::Diverged => {
                let last_values = history
                    .iter()
                    .rev()
                    .take(3)
                    .rev()
                    .map(render_value_short)
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(LogicError::FixpointDiverged {
                    iterations: params.max_iterations,
                    last_values,
                })
            }
            FixpointOutcome::Failed(err) => Err(err),
        }
    }

    fn fixpoint_loop(
        &mut self,
        params: &FixpointParams<'_>,
        mut current: Value,
        history: &mut Vec<Value>,
        env: &mut Environment,
    ) -> FixpointOutcome {
        for iteration in 0..params.max_iterations {
            history.push(current.clone());
            if history.len() > FIXPOINT_HISTORY {
                history.remove(0);
            }

            env.bind(params.var, current.clone());
            env.bind("__iteration", Value::Int(i64::from(iteration)));
            env.bind(
                "__strategy",
                Value::String(params.strategy.name().to_string()),
            );

            let next = match self.eval(params.body, env) {
                Ok(value) => value,
                // The very first application failing is the body being
                // broken, not the iteration: rethrow unwrapped.
                Err(err) if iteration == 0 => return FixpointOutcome::Failed(err),
                Err(err) => {
                    return FixpointOutcome::Failed(LogicError::FixpointIterationFailed {
                        iteration,
                        source: Box::new(err),
                    })
                }
            };

            if converged(&current, &next, params.strategy, params.tolerance) {
                return FixpointOutcome::Converged {
                    value: next,
                    iteration,
                };
            }

            if params.strategy == FixpointStrategy::Standard && oscillates(history, &next) {
                return FixpointOutcome::Oscillating { value: current };
            }

            current = next;
        }
        FixpointOutcome::Diverged
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

fn expect_bool(value: &Value, node: &Expr) -> Result<bool, LogicError> {
    value
        .as_bool()
        .map_err(|err| err.annotated(&render_short(node)))
}

fn converged(current: &Value, next: &Value, strategy: FixpointStrategy, tolerance: i64) -> bool {
    match strategy {
        FixpointStrategy::Numeric => match (current, next) {
            (Value::Int(a), Value::Int(b)) => {
                tolerance >= 0 && a.abs_diff(*b) <= tolerance as u64
            }
            _ => current == next,
        },
        _ => current == next,
    }
}

/// Period-2k oscillation: the new value equals the value from 2k
/// iterations ago, for some k >= 1 within the history window.
fn oscillates(history: &[Value], next: &Value) -> bool {
    let mut back = 2;
    while back <= history.len() {
        if history[history.len() - back] == *next {
            return true;
        }
        back += 2;
    }
    false
}
