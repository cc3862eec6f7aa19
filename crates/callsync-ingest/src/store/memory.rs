//! In-memory store with the same insert-if-absent semantics as [`PgStore`]
//!
//! Backs `--dry-run` and the pipeline tests.
//!
//! [`PgStore`]: super::PgStore

use super::{RecordStore, StoreError, StoreResult, Table};
use crate::record::TypedRecord;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, BTreeMap<i64, TypedRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows held for `table`
    pub async fn len(&self, table: &Table) -> usize {
        self.tables.read().await.get(table.name).map_or(0, BTreeMap::len)
    }

    pub async fn get(&self, table: &Table, id: i64) -> Option<TypedRecord> {
        self.tables.read().await.get(table.name)?.get(&id).cloned()
    }

    /// Ids held for `table`, ascending
    pub async fn ids(&self, table: &Table) -> Vec<i64> {
        self.tables
            .read()
            .await
            .get(table.name)
            .map(|rows| rows.keys().copied().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_if_absent(&self, table: &Table, record: &TypedRecord) -> StoreResult<bool> {
        // Same column checks as the SQL path so dry runs surface type errors.
        table.values(record)?;
        let id = record.id().ok_or(StoreError::MissingId(table.name))?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.name).or_default();
        if rows.contains_key(&id) {
            return Ok(false);
        }
        rows.insert(id, record.clone());
        Ok(true)
    }
}
