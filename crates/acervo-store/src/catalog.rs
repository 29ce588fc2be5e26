//! The stateful catalog session.
//!
//! `Catalog` owns the in-memory record set, normalized schema, and saved
//! filters. Every mutation applies to the in-memory state first and is then
//! persisted fire-and-forget; a slow or failed store call never blocks or
//! rolls back what the user already sees. There is no locking and no
//! conflict detection; the last write observed by the store wins.
//!
//! Mutating methods spawn persistence tasks, so a `Catalog` must live inside
//! a tokio runtime.

use std::sync::Arc;

use tracing::{info, warn};

use acervo_core::aggregate::FieldSeries;
use acervo_core::traits::{FilterStore, RecordStore, SchemaStore};
use acervo_core::{
    aggregate, normalize, project, Record, Result, SavedFilter, Schema, ViewQuery, ViewResponse,
};

pub struct Catalog {
    record_store: Arc<dyn RecordStore>,
    schema_store: Arc<dyn SchemaStore>,
    filter_store: Arc<dyn FilterStore>,
    records: Vec<Record>,
    schema: Schema,
    filters: Vec<SavedFilter>,
}

impl Catalog {
    /// Load everything from the stores and normalize the schema. The
    /// normalized form is persisted back so the store converges to the
    /// current shape.
    pub async fn open(
        record_store: Arc<dyn RecordStore>,
        schema_store: Arc<dyn SchemaStore>,
        filter_store: Arc<dyn FilterStore>,
    ) -> Result<Self> {
        let mut catalog = Self {
            record_store,
            schema_store,
            filter_store,
            records: Vec::new(),
            schema: Schema::new(),
            filters: Vec::new(),
        };
        catalog.reload().await?;
        Ok(catalog)
    }

    /// Full refresh from the stores, re-running the normalizer. Discards
    /// any in-memory state a concurrent editor has not yet overwritten in
    /// the store.
    pub async fn reload(&mut self) -> Result<()> {
        let raw = self.schema_store.load_schema().await?;
        self.schema = normalize(raw.as_ref());
        self.records = self.record_store.load_records().await?;
        self.filters = self.filter_store.load_filters().await?;
        self.persist_schema();
        info!(
            field_count = self.schema.field_bank.len(),
            result_count = self.records.len(),
            "catalog loaded"
        );
        Ok(())
    }

    // ─── State access ──────────────────────────────────────────────────────

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn filters(&self) -> &[SavedFilter] {
        &self.filters
    }

    pub fn find_filter(&self, id: &str) -> Option<&SavedFilter> {
        self.filters.iter().find(|f| f.id == id)
    }

    // ─── Mutations (optimistic, fire-and-forget persistence) ───────────────

    /// Replace the schema, e.g. after a chain of pure layout edits. Dangling
    /// cells are repaired before the schema becomes visible.
    pub fn update_schema(&mut self, schema: Schema) {
        self.schema = schema.drop_dangling_cells();
        self.persist_schema();
    }

    /// Upsert a record in memory and persist it in the background.
    pub fn save_record(&mut self, record: Record) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => self.records.push(record.clone()),
        }

        let store = Arc::clone(&self.record_store);
        tokio::spawn(async move {
            if let Err(e) = store.save_record(&record.id, &record.data).await {
                warn!(record_id = %record.id, error = %e, "record persistence failed, in-memory state kept");
            }
        });
    }

    pub fn delete_record(&mut self, id: &str) {
        self.records.retain(|r| r.id != id);

        let store = Arc::clone(&self.record_store);
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = store.delete_record(&id).await {
                warn!(record_id = %id, error = %e, "record deletion failed at the store, in-memory state kept");
            }
        });
    }

    pub fn save_filter(&mut self, filter: SavedFilter) {
        match self.filters.iter_mut().find(|f| f.id == filter.id) {
            Some(existing) => *existing = filter.clone(),
            None => self.filters.push(filter.clone()),
        }

        let store = Arc::clone(&self.filter_store);
        tokio::spawn(async move {
            if let Err(e) = store.save_filter(&filter).await {
                warn!(filter_id = %filter.id, error = %e, "filter persistence failed, in-memory state kept");
            }
        });
    }

    pub fn delete_filter(&mut self, id: &str) {
        self.filters.retain(|f| f.id != id);

        let store = Arc::clone(&self.filter_store);
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = store.delete_filter(&id).await {
                warn!(filter_id = %id, error = %e, "filter deletion failed at the store, in-memory state kept");
            }
        });
    }

    // ─── Derived outputs (pure recompute per call) ─────────────────────────

    /// Project the current record set through the derived view pipeline.
    pub fn view(&self, query: &ViewQuery) -> ViewResponse {
        project(&self.records, &self.schema, query)
    }

    /// Dashboard series over the BI-flagged fields.
    pub fn dashboard(&self) -> Vec<(String, FieldSeries)> {
        aggregate(&self.records, &self.schema.field_bank)
    }

    fn persist_schema(&self) {
        let store = Arc::clone(&self.schema_store);
        let schema = self.schema.clone();
        tokio::spawn(async move {
            if let Err(e) = store.save_schema(&schema).await {
                warn!(error = %e, "schema persistence failed, in-memory state kept");
            }
        });
    }
}
