//! Typed report rows

use crate::catalog::Field;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// A coerced field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    /// Whole seconds reported by the API
    Duration(chrono::Duration),
    /// Arrays, objects and anything else kept as raw JSON
    Opaque(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::Timestamp(_) => "timestamp",
            Value::Duration(_) => "duration",
            Value::Opaque(_) => "opaque",
        }
    }
}

/// One validated report row: every catalog field is present
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedRecord {
    values: HashMap<Field, Value>,
}

impl TypedRecord {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: HashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, field: Field, value: Value) {
        self.values.insert(field, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The row's `id`, the idempotency key used by the stores
    pub fn id(&self) -> Option<i64> {
        match self.get("id") {
            Some(Value::Integer(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn timestamp(&self, name: &str) -> Option<NaiveDateTime> {
        match self.get(name) {
            Some(Value::Timestamp(v)) => Some(*v),
            _ => None,
        }
    }
}
