//!
//! Shared vocabulary for the credo logic engine.
//!
//! This crate is intentionally small and shared by:
//! - the meta-validation pass (`credo-logic-check`),
//! - the evaluator (`credo-logic-eval`),
//! - the rule/philosophy driver (`credo-logic-driver`).
//!
//! Key pieces:
//! - `Value`: the tagged data model for documents, bindings, and results.
//! - `Expr`: the expression AST the evaluator consumes.
//! - `ast_hash`: stable hash of the canonical JSON form (cache keys).
//! - `extract_dependencies`: referenced variables and functions.
//! - `decode`: the expression-as-data reading of document subtrees.

mod decode;
mod error;
mod expr;
mod value;

pub use decode::decode;
pub use error::{ErrorKind, LogicError};
pub use expr::{
    ast_hash, canonical_json, extract_dependencies, is_closed, render_short, render_value_short,
    Dependencies, Expr, FixpointStrategy, Op, QuantifierKind,
};
pub use value::{Tag, Value};
