//!
//! Expression AST: the immutable input the evaluator consumes.
//!
//! Expressions are finite trees built by an external loader; the evaluator
//! pattern-matches on the constructor. The canonical JSON rendering of a
//! tree (and the stable hash over it) is what the evaluation cache keys on,
//! so everything here derives `Serialize` with deterministic field order.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::LogicError;
use crate::value::Value;

/// Logical and comparison operators. `not` is unary; all others binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    And,
    Or,
    Not,
    Implies,
    Equals,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl Op {
    pub fn parse(name: &str) -> Result<Op, LogicError> {
        Ok(match name {
            "and" => Op::And,
            "or" => Op::Or,
            "not" => Op::Not,
            "implies" => Op::Implies,
            "equals" => Op::Equals,
            "less_than" => Op::LessThan,
            "less_equal" => Op::LessEqual,
            "greater_than" => Op::GreaterThan,
            "greater_equal" => Op::GreaterEqual,
            other => {
                return Err(LogicError::UnknownOperator {
                    name: other.to_string(),
                })
            }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Op::And => "and",
            Op::Or => "or",
            Op::Not => "not",
            Op::Implies => "implies",
            Op::Equals => "equals",
            Op::LessThan => "less_than",
            Op::LessEqual => "less_equal",
            Op::GreaterThan => "greater_than",
            Op::GreaterEqual => "greater_equal",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Op::And => "and",
            Op::Or => "or",
            Op::Not => "not",
            Op::Implies => "implies",
            Op::Equals => "==",
            Op::LessThan => "<",
            Op::LessEqual => "<=",
            Op::GreaterThan => ">",
            Op::GreaterEqual => ">=",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Op::Not => 1,
            _ => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantifierKind {
    Forall,
    Exists,
}

impl QuantifierKind {
    pub fn name(&self) -> &'static str {
        match self {
            QuantifierKind::Forall => "forall",
            QuantifierKind::Exists => "exists",
        }
    }
}

/// Iteration strategy for `Expr::Fixpoint`. `least`/`greatest` are the
/// mu/nu fixpoints over the boolean lattice; `numeric` compares ints
/// within a tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixpointStrategy {
    Standard,
    #[serde(alias = "mu")]
    Least,
    #[serde(alias = "nu")]
    Greatest,
    Exact,
    Numeric,
}

impl FixpointStrategy {
    pub fn parse(name: &str) -> Result<FixpointStrategy, LogicError> {
        Ok(match name {
            "standard" => FixpointStrategy::Standard,
            "least" | "mu" => FixpointStrategy::Least,
            "greatest" | "nu" => FixpointStrategy::Greatest,
            "exact" => FixpointStrategy::Exact,
            "numeric" => FixpointStrategy::Numeric,
            other => {
                return Err(LogicError::malformed(format!(
                    "unknown fixpoint strategy `{other}`"
                )))
            }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            FixpointStrategy::Standard => "standard",
            FixpointStrategy::Least => "least",
            FixpointStrategy::Greatest => "greatest",
            FixpointStrategy::Exact => "exact",
            FixpointStrategy::Numeric => "numeric",
        }
    }
}

/// Expression AST.
///
/// Notes:
/// - Quantifier and fixpoint bindings are live only inside their own
///   condition/body; the evaluator enforces frame hygiene.
/// - `Call` resolves through the engine's function registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Value),
    Var(String),
    Operator {
        op: Op,
        args: Vec<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Quantifier {
        kind: QuantifierKind,
        var: String,
        domain: Box<Expr>,
        condition: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
    Fixpoint {
        var: String,
        body: Box<Expr>,
        initial: Option<Value>,
        max_iterations: Option<u32>,
        strategy: Option<FixpointStrategy>,
        tolerance: Option<i64>,
    },
    GetField {
        object: Box<Expr>,
        key: Box<Expr>,
    },
    HasField {
        object: Box<Expr>,
        key: Box<Expr>,
    },
}

impl Expr {
    pub fn lit(value: impl Into<Value>) -> Expr {
        Expr::Literal(value.into())
    }

    pub fn var(name: impl Into<String>) -> Expr {
        Expr::Var(name.into())
    }

    pub fn operator(op: Op, args: Vec<Expr>) -> Expr {
        Expr::Operator { op, args }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    pub fn forall(var: impl Into<String>, domain: Expr, condition: Expr) -> Expr {
        Expr::Quantifier {
            kind: QuantifierKind::Forall,
            var: var.into(),
            domain: Box::new(domain),
            condition: Box::new(condition),
        }
    }

    pub fn exists(var: impl Into<String>, domain: Expr, condition: Expr) -> Expr {
        Expr::Quantifier {
            kind: QuantifierKind::Exists,
            var: var.into(),
            domain: Box::new(domain),
            condition: Box::new(condition),
        }
    }

    pub fn conditional(condition: Expr, then: Expr, otherwise: Option<Expr>) -> Expr {
        Expr::If {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
        }
    }

    pub fn get_field(object: Expr, key: Expr) -> Expr {
        Expr::GetField {
            object: Box::new(object),
            key: Box::new(key),
        }
    }

    pub fn has_field(object: Expr, key: Expr) -> Expr {
        Expr::HasField {
            object: Box::new(object),
            key: Box::new(key),
        }
    }
}

/// Canonical JSON form of an expression. Maps inside literals are
/// `BTreeMap`-backed, so the rendering is deterministic.
pub fn canonical_json(expr: &Expr) -> serde_json::Value {
    serde_json::to_value(expr).expect("Expr is serializable")
}

/// Stable structural hash of the canonical form; used as the evaluation
/// cache key.
pub fn ast_hash(expr: &Expr) -> String {
    let bytes = serde_json::to_vec(&canonical_json(expr)).expect("canonical form serializes");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hex::encode(hasher.finalize())
}

/// Variables and functions referenced from an expression.
///
/// `variables` includes quantifier/fixpoint-bound occurrences; callers that
/// care about free variables resolve binders themselves. Powers the
/// function-existence meta check and host impact analysis.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dependencies {
    pub variables: HashSet<String>,
    pub functions: HashSet<String>,
}

pub fn extract_dependencies(expr: &Expr) -> Dependencies {
    let mut deps = Dependencies::default();
    walk(expr, &mut deps);
    deps
}

fn walk(expr: &Expr, deps: &mut Dependencies) {
    match expr {
        Expr::Literal(_) => {}
        Expr::Var(name) => {
            deps.variables.insert(name.clone());
        }
        Expr::Operator { args, .. } => {
            for arg in args {
                walk(arg, deps);
            }
        }
        Expr::Call { name, args } => {
            deps.functions.insert(name.clone());
            for arg in args {
                walk(arg, deps);
            }
        }
        Expr::Quantifier {
            domain, condition, ..
        } => {
            walk(domain, deps);
            walk(condition, deps);
        }
        Expr::If {
            condition,
            then,
            otherwise,
        } => {
            walk(condition, deps);
            walk(then, deps);
            if let Some(otherwise) = otherwise {
                walk(otherwise, deps);
            }
        }
        Expr::Fixpoint { body, .. } => walk(body, deps),
        Expr::GetField { object, key } | Expr::HasField { object, key } => {
            walk(object, deps);
            walk(key, deps);
        }
    }
}

/// A closed expression contains no `Var` node anywhere, bound or not; only
/// closed expressions are sound to memoize.
pub fn is_closed(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(_) => true,
        Expr::Var(_) => false,
        Expr::Operator { args, .. } | Expr::Call { args, .. } => args.iter().all(is_closed),
        Expr::Quantifier {
            domain, condition, ..
        } => is_closed(domain) && is_closed(condition),
        Expr::If {
            condition,
            then,
            otherwise,
        } => {
            is_closed(condition)
                && is_closed(then)
                && otherwise.as_deref().map_or(true, is_closed)
        }
        Expr::Fixpoint { body, .. } => is_closed(body),
        Expr::GetField { object, key } | Expr::HasField { object, key } => {
            is_closed(object) && is_closed(key)
        }
    }
}

const RENDER_LIMIT: usize = 80;

fn truncated(text: String) -> String {
    if text.chars().count() <= RENDER_LIMIT {
        return text;
    }
    let mut short: String = text.chars().take(RENDER_LIMIT - 3).collect();
    short.push_str("...");
    short
}

/// Rendering for traces and error messages, truncated to a readable width.
pub fn render_short(expr: &Expr) -> String {
    truncated(expr.to_string())
}

pub fn render_value_short(value: &Value) -> String {
    truncated(value.to_string())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Operator { op, args } => match (op, args.as_slice()) {
                (Op::Not, [operand]) => write!(f, "(not {operand})"),
                (op, [lhs, rhs]) => write!(f, "({lhs} {} {rhs})", op.symbol()),
                // Wrong arity still renders, prefix-style, for diagnostics.
                (op, args) => {
                    write!(f, "({}", op.name())?;
                    for arg in args {
                        write!(f, " {arg}")?;
                    }
                    write!(f, ")")
                }
            },
            Expr::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expr::Quantifier {
                kind,
                var,
                domain,
                condition,
            } => write!(f, "{} {var} in {domain}: {condition}", kind.name()),
            Expr::If {
                condition,
                then,
                otherwise,
            } => {
                write!(f, "if {condition} then {then}")?;
                if let Some(otherwise) = otherwise {
                    write!(f, " else {otherwise}")?;
                }
                Ok(())
            }
            Expr::Fixpoint { var, body, .. } => write!(f, "fixpoint {var}: {body}"),
            Expr::GetField { object, key } => write!(f, "get_field({object}, {key})"),
            Expr::HasField { object, key } => write!(f, "has_field({object}, {key})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gt_zero(var: &str) -> Expr {
        Expr::operator(Op::GreaterThan, vec![Expr::var(var), Expr::lit(0)])
    }

    #[test]
    fn operator_names_roundtrip() {
        for op in [
            Op::And,
            Op::Or,
            Op::Not,
            Op::Implies,
            Op::Equals,
            Op::LessThan,
            Op::LessEqual,
            Op::GreaterThan,
            Op::GreaterEqual,
        ] {
            assert_eq!(Op::parse(op.name()).unwrap(), op);
        }
        assert!(matches!(
            Op::parse("xor"),
            Err(LogicError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn strategy_aliases() {
        assert_eq!(
            FixpointStrategy::parse("mu").unwrap(),
            FixpointStrategy::Least
        );
        assert_eq!(
            FixpointStrategy::parse("nu").unwrap(),
            FixpointStrategy::Greatest
        );
        assert!(FixpointStrategy::parse("chaotic").is_err());
    }

    #[test]
    fn hash_is_stable_and_structural() {
        let a = Expr::forall("x", Expr::lit(vec![1.into(), 2.into()]), gt_zero("x"));
        let b = Expr::forall("x", Expr::lit(vec![1.into(), 2.into()]), gt_zero("x"));
        let c = Expr::forall("y", Expr::lit(vec![1.into(), 2.into()]), gt_zero("y"));
        assert_eq!(ast_hash(&a), ast_hash(&b));
        assert_ne!(ast_hash(&a), ast_hash(&c));
    }

    #[test]
    fn dependencies_collect_vars_and_functions() {
        let expr = Expr::forall(
            "x",
            Expr::call("list", vec![Expr::var("seed")]),
            Expr::call("is_zero", vec![Expr::var("x")]),
        );
        let deps = extract_dependencies(&expr);
        assert!(deps.variables.contains("seed"));
        assert!(deps.variables.contains("x"));
        assert_eq!(deps.functions.len(), 2);
    }

    #[test]
    fn closedness_sees_bound_vars() {
        let closed = Expr::call("count", vec![Expr::lit(vec![1.into()])]);
        assert!(is_closed(&closed));
        // A quantifier referencing its own binder is still open.
        let open = Expr::forall("x", Expr::lit(vec![1.into()]), gt_zero("x"));
        assert!(!is_closed(&open));
    }

    #[test]
    fn display_reads_naturally() {
        let expr = Expr::forall("x", Expr::lit(vec![1.into(), 2.into()]), gt_zero("x"));
        assert_eq!(expr.to_string(), "forall x in [1, 2]: (x > 0)");
        let cond = Expr::conditional(
            Expr::operator(Op::Equals, vec![Expr::var("n"), Expr::lit(0)]),
            Expr::lit("done"),
            None,
        );
        assert_eq!(cond.to_string(), "if (n == 0) then \"done\"");
    }

    #[test]
    fn render_short_truncates() {
        let long = Expr::lit("x".repeat(200));
        let rendered = render_short(&long);
        assert_eq!(rendered.chars().count(), 80);
        assert!(rendered.ends_with("..."));
    }
}
