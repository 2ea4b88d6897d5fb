//!
//! The single error taxonomy every evaluation path surfaces.

use thiserror::Error;

use crate::value::{Tag, Value};

/// Identifier kinds exposed to host diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    Name,
    Arity,
    DivisionByZero,
    FixpointDiverged,
    FixpointIterationFailed,
    UnknownFunction,
    UnknownOperator,
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LogicError {
    #[error("type error: {message}")]
    Type { message: String },

    #[error("unbound variable `{name}`")]
    Name { name: String },

    #[error("{function} expects {expected} argument(s), got {actual}")]
    Arity {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("{function}: division by zero")]
    DivisionByZero { function: String },

    #[error("Fixpoint did not converge after {iterations} iterations (last values: {last_values})")]
    FixpointDiverged { iterations: u32, last_values: String },

    #[error("Fixpoint evaluation failed at iteration {iteration}: {source}")]
    FixpointIterationFailed {
        iteration: u32,
        #[source]
        source: Box<LogicError>,
    },

    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("unknown operator `{name}`")]
    UnknownOperator { name: String },

    #[error("malformed expression: {message}")]
    Malformed { message: String },
}

impl LogicError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LogicError::Type { .. } => ErrorKind::Type,
            LogicError::Name { .. } => ErrorKind::Name,
            LogicError::Arity { .. } => ErrorKind::Arity,
            LogicError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            LogicError::FixpointDiverged { .. } => ErrorKind::FixpointDiverged,
            LogicError::FixpointIterationFailed { .. } => ErrorKind::FixpointIterationFailed,
            LogicError::UnknownFunction { .. } => ErrorKind::UnknownFunction,
            LogicError::UnknownOperator { .. } => ErrorKind::UnknownOperator,
            LogicError::Malformed { .. } => ErrorKind::Malformed,
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        LogicError::Type {
            message: message.into(),
        }
    }

    pub fn tag_mismatch(expected: Tag, actual: &Value) -> Self {
        LogicError::Type {
            message: format!("expected {expected}, got {}", actual.tag()),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        LogicError::Malformed {
            message: message.into(),
        }
    }

    /// Appends a short rendering of the offending node to type and
    /// malformed-expression messages. Other kinds already carry their
    /// context.
    pub fn annotated(self, node: &str) -> Self {
        match self {
            LogicError::Type { message } => LogicError::Type {
                message: format!("{message} in `{node}`"),
            },
            LogicError::Malformed { message } => LogicError::Malformed {
                message: format!("{message} in `{node}`"),
            },
            other => other,
        }
    }
}
