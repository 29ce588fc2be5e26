//! In-memory store implementations.
//!
//! The memory stores back tests and single-process deployments; they keep
//! records in insertion order to match the stored-order contract of the
//! store traits. `FlakyRecordStore` is a test double for persistence-failure
//! coverage.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use acervo_core::traits::{FilterStore, RecordStore, SchemaStore};
use acervo_core::{Error, Record, Result, SavedFilter, Schema};

// =============================================================================
// RECORD STORE
// =============================================================================

/// Insertion-ordered in-memory record store.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load_records(&self) -> Result<Vec<Record>> {
        Ok(self.records.read().await.clone())
    }

    async fn save_record(&self, id: &str, data: &Map<String, Value>) -> Result<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id) {
            Some(existing) => existing.data = data.clone(),
            None => records.push(Record {
                id: id.to_string(),
                data: data.clone(),
            }),
        }
        Ok(())
    }

    async fn delete_record(&self, id: &str) -> Result<()> {
        self.records.write().await.retain(|r| r.id != id);
        Ok(())
    }
}

// =============================================================================
// SCHEMA STORE
// =============================================================================

/// In-memory schema store holding the raw stored value, current-format or
/// legacy alike.
#[derive(Default)]
pub struct MemorySchemaStore {
    schema: RwLock<Option<Value>>,
}

impl MemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw payload, e.g. a legacy-shaped document.
    pub fn with_raw(raw: Value) -> Self {
        Self {
            schema: RwLock::new(Some(raw)),
        }
    }
}

#[async_trait]
impl SchemaStore for MemorySchemaStore {
    async fn load_schema(&self) -> Result<Option<Value>> {
        Ok(self.schema.read().await.clone())
    }

    async fn save_schema(&self, schema: &Schema) -> Result<()> {
        let raw = serde_json::to_value(schema)?;
        *self.schema.write().await = Some(raw);
        Ok(())
    }
}

// =============================================================================
// FILTER STORE
// =============================================================================

/// In-memory saved-filter store, upsert by id.
#[derive(Default)]
pub struct MemoryFilterStore {
    filters: RwLock<Vec<SavedFilter>>,
}

impl MemoryFilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(filters: Vec<SavedFilter>) -> Self {
        Self {
            filters: RwLock::new(filters),
        }
    }
}

#[async_trait]
impl FilterStore for MemoryFilterStore {
    async fn load_filters(&self) -> Result<Vec<SavedFilter>> {
        Ok(self.filters.read().await.clone())
    }

    async fn save_filter(&self, filter: &SavedFilter) -> Result<()> {
        let mut filters = self.filters.write().await;
        match filters.iter_mut().find(|f| f.id == filter.id) {
            Some(existing) => *existing = filter.clone(),
            None => filters.push(filter.clone()),
        }
        Ok(())
    }

    async fn delete_filter(&self, id: &str) -> Result<()> {
        self.filters.write().await.retain(|f| f.id != id);
        Ok(())
    }
}

// =============================================================================
// TEST DOUBLES
// =============================================================================

/// Record store whose writes always fail. Loads succeed and return nothing.
///
/// Lets tests assert the optimistic-update contract: a failed persistence
/// call is logged and never rolls back in-memory state.
#[derive(Default)]
pub struct FlakyRecordStore {
    failed_writes: AtomicUsize,
}

impl FlakyRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many writes (saves and deletes) have been rejected so far.
    pub fn failed_writes(&self) -> usize {
        self.failed_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for FlakyRecordStore {
    async fn load_records(&self) -> Result<Vec<Record>> {
        Ok(Vec::new())
    }

    async fn save_record(&self, id: &str, _data: &Map<String, Value>) -> Result<()> {
        self.failed_writes.fetch_add(1, Ordering::SeqCst);
        Err(Error::Store(format!("write rejected for record {}", id)))
    }

    async fn delete_record(&self, id: &str) -> Result<()> {
        self.failed_writes.fetch_add(1, Ordering::SeqCst);
        Err(Error::Store(format!("delete rejected for record {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn record_store_upserts_in_insertion_order() {
        let store = MemoryRecordStore::new();
        let r1 = Record::new("r1").with_value("title", "A");
        let r2 = Record::new("r2").with_value("title", "B");

        store.save_record(&r1.id, &r1.data).await.unwrap();
        store.save_record(&r2.id, &r2.data).await.unwrap();

        let updated = Record::new("r1").with_value("title", "A v2");
        store.save_record(&updated.id, &updated.data).await.unwrap();

        let records = store.load_records().await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(records[0].value("title"), Some(&json!("A v2")));
    }

    #[tokio::test]
    async fn record_store_delete_unknown_id_is_ok() {
        let store = MemoryRecordStore::new();
        assert!(store.delete_record("missing").await.is_ok());
    }

    #[tokio::test]
    async fn schema_store_roundtrips_current_format() {
        let store = MemorySchemaStore::new();
        assert!(store.load_schema().await.unwrap().is_none());

        let schema = Schema::starter();
        store.save_schema(&schema).await.unwrap();

        let raw = store.load_schema().await.unwrap().unwrap();
        assert!(raw.get("fieldBank").is_some());
    }

    #[tokio::test]
    async fn filter_store_upserts_and_deletes() {
        let store = MemoryFilterStore::new();
        let filter = SavedFilter::new("ativos");
        store.save_filter(&filter).await.unwrap();

        let renamed = SavedFilter {
            name: "ativos 2024".to_string(),
            ..filter.clone()
        };
        store.save_filter(&renamed).await.unwrap();

        let filters = store.load_filters().await.unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].name, "ativos 2024");

        store.delete_filter(&filter.id).await.unwrap();
        assert!(store.load_filters().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn flaky_store_counts_rejected_writes() {
        let store = FlakyRecordStore::new();
        let record = Record::new("r1");

        assert!(store.save_record(&record.id, &record.data).await.is_err());
        assert!(store.delete_record("r1").await.is_err());
        assert_eq!(store.failed_writes(), 2);
    }
}
