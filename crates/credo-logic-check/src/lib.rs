//!
//! Meta-validation of expressions carried as data.
//!
//! Self-validation blocks ask whether a document's logic subtree is a
//! well-formed expression and whether every function it names is
//! registered. Evaluation never requires these checks; malformed input
//! fails there with a structured error either way.

use thiserror::Error;

use credo_logic_ast::{decode, extract_dependencies, Expr, LogicError, Value};

/// Lookup surface the evaluator's registry implements for
/// [`missing_functions`].
pub trait FunctionLookup {
    fn has_function(&self, name: &str) -> bool;
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("undecodable expression: {0}")]
    Undecodable(#[from] LogicError),

    #[error("operator `{op}` expects {expected} operand(s), got {actual}")]
    OperatorArity {
        op: String,
        expected: usize,
        actual: usize,
    },

    #[error("{construct} binds an empty variable name")]
    EmptyBinding { construct: &'static str },

    #[error("call names an empty function")]
    EmptyFunctionName,

    #[error("fixpoint declares zero max_iterations")]
    ZeroIterations,
}

/// Structural well-formedness of an AST-as-value.
pub fn well_formed(value: &Value) -> Result<(), CheckError> {
    validate(&decode(value)?)
}

/// Structural well-formedness of a decoded expression: operator arity,
/// non-empty binders, a usable iteration limit.
pub fn validate(expr: &Expr) -> Result<(), CheckError> {
    match expr {
        Expr::Literal(_) | Expr::Var(_) => Ok(()),
        Expr::Operator { op, args } => {
            if args.len() != op.arity() {
                return Err(CheckError::OperatorArity {
                    op: op.name().to_string(),
                    expected: op.arity(),
                    actual: args.len(),
                });
            }
            args.iter().try_for_each(validate)
        }
        Expr::Call { name, args } => {
            if name.is_empty() {
                return Err(CheckError::EmptyFunctionName);
            }
            args.iter().try_for_each(validate)
        }
        Expr::Quantifier {
            var,
            domain,
            condition,
            ..
        } => {
            if var.is_empty() {
                return Err(CheckError::EmptyBinding {
                    construct: "quantifier",
                });
            }
            validate(domain)?;
            validate(condition)
        }
        Expr::If {
            condition,
            then,
            otherwise,
        } => {
            validate(condition)?;
            validate(then)?;
            otherwise.as_deref().map_or(Ok(()), validate)
        }
        Expr::Fixpoint {
            var,
            body,
            max_iterations,
            ..
        } => {
            if var.is_empty() {
                return Err(CheckError::EmptyBinding {
                    construct: "fixpoint",
                });
            }
            if *max_iterations == Some(0) {
                return Err(CheckError::ZeroIterations);
            }
            validate(body)
        }
        Expr::GetField { object, key } | Expr::HasField { object, key } => {
            validate(object)?;
            validate(key)
        }
    }
}

/// Functions an AST-as-value references that the registry does not know,
/// sorted for stable reporting. Empty means every call site resolves.
pub fn missing_functions(
    value: &Value,
    functions: &dyn FunctionLookup,
) -> Result<Vec<String>, CheckError> {
    let deps = extract_dependencies(&decode(value)?);
    let mut missing: Vec<String> = deps
        .functions
        .into_iter()
        .filter(|name| !functions.has_function(name))
        .collect();
    missing.sort();
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credo_logic_ast::Op;
    use std::collections::HashSet;

    struct Known(HashSet<String>);

    impl FunctionLookup for Known {
        fn has_function(&self, name: &str) -> bool {
            self.0.contains(name)
        }
    }

    fn known(names: &[&str]) -> Known {
        Known(names.iter().map(|n| n.to_string()).collect())
    }

    #[test]
    fn accepts_well_formed_trees() {
        let expr = Expr::forall(
            "x",
            Expr::lit(vec![1.into(), 2.into()]),
            Expr::operator(Op::GreaterThan, vec![Expr::var("x"), Expr::lit(0)]),
        );
        assert!(validate(&expr).is_ok());
    }

    #[test]
    fn flags_operator_arity() {
        let expr = Expr::operator(Op::Not, vec![Expr::lit(true), Expr::lit(false)]);
        assert!(matches!(
            validate(&expr),
            Err(CheckError::OperatorArity { expected: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn flags_empty_binders() {
        let expr = Expr::forall("", Expr::lit(vec![]), Expr::lit(true));
        assert!(matches!(
            validate(&expr),
            Err(CheckError::EmptyBinding { construct: "quantifier" })
        ));
    }

    #[test]
    fn well_formed_rejects_undecodable_values() {
        let mut entries = std::collections::BTreeMap::new();
        entries.insert("mystery".to_string(), Value::Int(1));
        assert!(matches!(
            well_formed(&Value::Map(entries)),
            Err(CheckError::Undecodable(_))
        ));
    }

    #[test]
    fn reports_missing_functions_sorted() {
        let mut entries = std::collections::BTreeMap::new();
        entries.insert("function".to_string(), Value::String("zeta".into()));
        entries.insert(
            "arguments".to_string(),
            Value::List(vec![{
                let mut inner = std::collections::BTreeMap::new();
                inner.insert("function".to_string(), Value::String("alpha".into()));
                Value::Map(inner)
            }]),
        );
        let doc = Value::Map(entries);

        let missing = missing_functions(&doc, &known(&[])).unwrap();
        assert_eq!(missing, vec!["alpha".to_string(), "zeta".to_string()]);

        let missing = missing_functions(&doc, &known(&["alpha", "zeta"])).unwrap();
        assert!(missing.is_empty());
    }
}
