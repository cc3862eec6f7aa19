//! Record persistence
//!
//! Rows are written with insert-if-absent semantics keyed by `id`: a row that
//! already exists is never modified. Each report type maps onto a fixed
//! [`Table`]; values are pulled out of a [`TypedRecord`] column by column and
//! must match the column's [`ColumnKind`].

pub mod memory;
pub mod postgres;
pub mod tables;

pub use memory::MemoryStore;
pub use postgres::{create_pool, DbConfig, PgStore};
pub use tables::{CALLS_TABLE, CALL_LEGS_TABLE};

use crate::record::{TypedRecord, Value};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("{table}.{column}: expected {expected}, got {actual}")]
    ColumnType {
        table: &'static str,
        column: &'static str,
        expected: ColumnKind,
        actual: &'static str,
    },

    #[error("{table}.{column}: value absent from record")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("{0}: record has no integer id")]
    MissingId(&'static str),

    #[error("Database configuration error: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// SQL type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    BigInt,
    Boolean,
    Timestamp,
    Interval,
}

impl ColumnKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::BigInt => "BIGINT",
            ColumnKind::Boolean => "BOOLEAN",
            ColumnKind::Timestamp => "TIMESTAMP",
            ColumnKind::Interval => "INTERVAL",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sql_type())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// A column value ready to bind; `None` is a typed SQL NULL
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(Option<String>),
    BigInt(Option<i64>),
    Boolean(Option<bool>),
    Timestamp(Option<NaiveDateTime>),
    Interval(Option<chrono::Duration>),
}

/// Fixed column mapping of one report type; the first column is the key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    /// `INSERT ... ON CONFLICT (id) DO NOTHING` with one placeholder per column
    pub fn insert_sql(&self) -> String {
        let names = self.columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", ");
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT (id) DO NOTHING",
            self.name, names, placeholders
        )
    }

    /// Extract every column of `record` in column order
    pub fn values(&self, record: &TypedRecord) -> StoreResult<Vec<ColumnValue>> {
        self.columns
            .iter()
            .map(|column| self.value(column, record))
            .collect()
    }

    fn value(&self, column: &Column, record: &TypedRecord) -> StoreResult<ColumnValue> {
        let value = record.get(column.name).ok_or(StoreError::MissingColumn {
            table: self.name,
            column: column.name,
        })?;

        let mismatch = || StoreError::ColumnType {
            table: self.name,
            column: column.name,
            expected: column.kind,
            actual: value.kind(),
        };

        Ok(match (column.kind, value) {
            (ColumnKind::Text, Value::Null) => ColumnValue::Text(None),
            (ColumnKind::Text, Value::String(s)) => ColumnValue::Text(Some(s.clone())),
            (ColumnKind::Text, Value::Opaque(json)) => ColumnValue::Text(Some(json.to_string())),
            (ColumnKind::BigInt, Value::Null) => ColumnValue::BigInt(None),
            (ColumnKind::BigInt, Value::Integer(n)) => ColumnValue::BigInt(Some(*n)),
            (ColumnKind::Boolean, Value::Null) => ColumnValue::Boolean(None),
            (ColumnKind::Boolean, Value::Boolean(b)) => ColumnValue::Boolean(Some(*b)),
            (ColumnKind::Timestamp, Value::Null) => ColumnValue::Timestamp(None),
            (ColumnKind::Timestamp, Value::Timestamp(t)) => ColumnValue::Timestamp(Some(*t)),
            (ColumnKind::Interval, Value::Null) => ColumnValue::Interval(None),
            (ColumnKind::Interval, Value::Duration(d)) => ColumnValue::Interval(Some(*d)),
            _ => return Err(mismatch()),
        })
    }
}

/// Idempotent row sink shared by both sync streams
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Write `record` unless a row with its id exists; `true` when written
    async fn insert_if_absent(&self, table: &Table, record: &TypedRecord) -> StoreResult<bool>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::FieldCatalog;
    use crate::transform::transform;
    use serde_json::json;

    const SAMPLE: Table = Table {
        name: "sample",
        columns: &[
            Column::new("id", ColumnKind::BigInt),
            Column::new("start_time", ColumnKind::Timestamp),
            Column::new("talk_duration", ColumnKind::Interval),
            Column::new("is_lost", ColumnKind::Boolean),
            Column::new("source", ColumnKind::Text),
        ],
    };

    fn record(row: serde_json::Value) -> TypedRecord {
        let catalog = FieldCatalog::builder()
            .group(&["id", "start_time", "talk_duration", "is_lost", "source"])
            .build();
        transform(&catalog, &row).unwrap()
    }

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            SAMPLE.insert_sql(),
            "INSERT INTO sample (id, start_time, talk_duration, is_lost, source) \
             VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING"
        );
    }

    #[test]
    fn test_values_in_column_order() {
        let values = SAMPLE
            .values(&record(json!({
                "id": 7,
                "start_time": "2024-03-01 10:00:00",
                "talk_duration": 125,
                "is_lost": false,
                "source": null,
            })))
            .unwrap();

        assert_eq!(values[0], ColumnValue::BigInt(Some(7)));
        assert_eq!(
            values[1],
            ColumnValue::Timestamp(Some(
                callsync_common::time::parse_datetime("2024-03-01 10:00:00").unwrap()
            ))
        );
        assert_eq!(values[2], ColumnValue::Interval(Some(chrono::Duration::seconds(125))));
        assert_eq!(values[3], ColumnValue::Boolean(Some(false)));
        assert_eq!(values[4], ColumnValue::Text(None));
    }

    #[test]
    fn test_kind_mismatch() {
        let err = SAMPLE
            .values(&record(json!({
                "id": 7,
                "start_time": null,
                "talk_duration": null,
                "is_lost": "no",
                "source": "ads",
            })))
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::ColumnType {
                column: "is_lost",
                expected: ColumnKind::Boolean,
                actual: "string",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_column() {
        let catalog = FieldCatalog::builder().field("id").build();
        let partial = transform(&catalog, &json!({ "id": 1 })).unwrap();
        assert!(matches!(
            SAMPLE.values(&partial),
            Err(StoreError::MissingColumn { column: "start_time", .. })
        ));
    }

    #[test]
    fn test_report_tables_are_keyed_by_id() {
        for table in [CALLS_TABLE, CALL_LEGS_TABLE] {
            assert_eq!(table.columns[0], Column::new("id", ColumnKind::BigInt));
        }
        assert_eq!(CALLS_TABLE.columns.len(), 18);
        assert_eq!(CALL_LEGS_TABLE.columns.len(), 31);
    }
}
