//!
//! The tagged value model shared by documents, environments, and results.
//!
//! Equality is structural and type-strict: values of different tags are
//! never equal. Ordering exists only within `int` and `string`. Maps are
//! `BTreeMap`-backed so the derived serde form is canonical.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LogicError;

/// Discriminant of the value sum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Null,
    Bool,
    Int,
    String,
    List,
    Map,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tag::Null => "null",
            Tag::Bool => "bool",
            Tag::Int => "int",
            Tag::String => "string",
            Tag::List => "list",
            Tag::Map => "map",
        })
    }
}

/// One constructor per tag; no implicit coercions anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn tag(&self) -> Tag {
        match self {
            Value::Null => Tag::Null,
            Value::Bool(_) => Tag::Bool,
            Value::Int(_) => Tag::Int,
            Value::String(_) => Tag::String,
            Value::List(_) => Tag::List,
            Value::Map(_) => Tag::Map,
        }
    }

    pub fn as_bool(&self) -> Result<bool, LogicError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(LogicError::tag_mismatch(Tag::Bool, other)),
        }
    }

    pub fn as_int(&self) -> Result<i64, LogicError> {
        match self {
            Value::Int(n) => Ok(*n),
            other => Err(LogicError::tag_mismatch(Tag::Int, other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, LogicError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(LogicError::tag_mismatch(Tag::String, other)),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], LogicError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(LogicError::tag_mismatch(Tag::List, other)),
        }
    }

    pub fn as_map(&self) -> Result<&BTreeMap<String, Value>, LogicError> {
        match self {
            Value::Map(entries) => Ok(entries),
            other => Err(LogicError::tag_mismatch(Tag::Map, other)),
        }
    }

    /// Structural, type-strict equality. Same as `==`; named to match the
    /// rest of the value operations.
    pub fn equals(&self, other: &Value) -> bool {
        self == other
    }

    /// Ordering within `int` and within `string`; anything else is a type
    /// error.
    pub fn compare(&self, other: &Value) -> Result<Ordering, LogicError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
            (a, b) => Err(LogicError::type_error(format!(
                "cannot order {} against {}",
                a.tag(),
                b.tag()
            ))),
        }
    }

    /// List membership, or substring containment when both sides are
    /// strings.
    pub fn contains(&self, needle: &Value) -> Result<bool, LogicError> {
        match (self, needle) {
            (Value::List(items), v) => Ok(items.iter().any(|item| item == v)),
            (Value::String(s), Value::String(sub)) => Ok(s.contains(sub.as_str())),
            (coll, v) => Err(LogicError::type_error(format!(
                "contains is defined on list or string/string, got {}/{}",
                coll.tag(),
                v.tag()
            ))),
        }
    }

    /// Element, entry, or character count.
    pub fn size(&self) -> Result<i64, LogicError> {
        match self {
            Value::List(items) => Ok(items.len() as i64),
            Value::Map(entries) => Ok(entries.len() as i64),
            Value::String(s) => Ok(s.chars().count() as i64),
            other => Err(LogicError::type_error(format!(
                "size is undefined for {}",
                other.tag()
            ))),
        }
    }

    /// Reads an untyped JSON document tree. Integral numbers become `int`;
    /// a non-integral number is stored as `string`, preserving the token.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                            Value::Int(f as i64)
                        }
                        _ => Value::String(n.to_string()),
                    }
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
