use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::{LedgerError, Result};

/// A rich query of the form `{"selector": {"field": value, ...}}`.
///
/// Each selector entry matches a top-level field of a JSON document by
/// equality. A value may also be written as `{"$eq": value}`. A document
/// matches when every entry matches; values that are not JSON objects never
/// match.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    conditions: Vec<(String, Value)>,
}

impl Selector {
    pub fn parse(query: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(query)
            .map_err(|e| LedgerError::InvalidSelector(format!("{}: {}", query, e)))?;
        let selector = root
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                LedgerError::InvalidSelector(format!("missing \"selector\" object in {}", query))
            })?;

        let mut conditions = Vec::with_capacity(selector.len());
        for (field, expected) in selector {
            conditions.push((field.clone(), equality_operand(field, expected)?));
        }
        Ok(Selector { conditions })
    }

    pub fn matches(&self, document: &[u8]) -> bool {
        match serde_json::from_slice::<Map<String, Value>>(document) {
            Ok(object) => self
                .conditions
                .iter()
                .all(|(field, expected)| object.get(field) == Some(expected)),
            Err(_) => false,
        }
    }
}

impl FromStr for Selector {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

fn equality_operand(field: &str, expected: &Value) -> Result<Value> {
    match expected {
        Value::Object(operators) if operators.keys().any(|k| k.starts_with('$')) => {
            match operators.get("$eq") {
                Some(operand) if operators.len() == 1 => Ok(operand.clone()),
                _ => Err(LedgerError::InvalidSelector(format!(
                    "unsupported operator on field '{}': {}",
                    field, expected
                ))),
            }
        }
        other => Ok(other.clone()),
    }
}
