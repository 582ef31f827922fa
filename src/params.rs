//! Command-line value parsing helpers.
//!
//! KEY=VALUE pairs and list modifiers (limit, offset, order-by) arrive as
//! free-form strings; this module turns them into typed values before any
//! request is built.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("invalid input, expected KEY=VALUE, got: {0}")]
    MalformedPair(String),
    #[error("empty key in pair: {0}")]
    EmptyKey(String),
    #[error("empty column name in order-by: {0}")]
    EmptyOrderByColumn(String),
}

/// Parse trailing KEY=VALUE arguments, preserving order.
///
/// Keys and values are trimmed; the value may itself contain `=`.
pub fn parse_pairs(args: &[String]) -> Result<Vec<(String, String)>, ParamError> {
    let mut pairs = Vec::with_capacity(args.len());
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| ParamError::MalformedPair(arg.clone()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ParamError::EmptyKey(arg.clone()));
        }
        pairs.push((key.to_string(), value.trim().to_string()));
    }

    Ok(pairs)
}

/// Coerce a raw command-line value into a JSON value.
///
/// Numbers, booleans and null become typed JSON; everything else stays a
/// string.
pub fn coerce_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}

/// A single order-by column, optionally descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderColumn {
    pub name: String,
    pub descending: bool,
}

/// Ordered list of sort columns parsed from `--order-by`.
///
/// The wire format is preserved: `name,-created_at` parses into ascending
/// `name` then descending `created_at` and serializes back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub columns: Vec<OrderColumn>,
}

impl FromStr for OrderBy {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut columns = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            let (name, descending) = match part.strip_prefix('-') {
                Some(name) => (name, true),
                None => (part, false),
            };
            if name.is_empty() {
                return Err(ParamError::EmptyOrderByColumn(s.to_string()));
            }
            columns.push(OrderColumn {
                name: name.to_string(),
                descending,
            });
        }

        Ok(OrderBy { columns })
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if c.descending {
                    format!("-{}", c.name)
                } else {
                    c.name.clone()
                }
            })
            .collect();
        write!(f, "{}", rendered.join(","))
    }
}

/// Pagination and ordering modifiers for list and query actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListModifiers {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order_by: Option<OrderBy>,
}

impl ListModifiers {
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none() && self.order_by.is_none()
    }
}
