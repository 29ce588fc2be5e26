//! Store traits for the external record/schema/filter store.
//!
//! These traits define the persistence boundary; the core never talks to a
//! transport directly. Consumers must pass every loaded schema through
//! [`crate::normalize::normalize`] before use and may persist the normalized
//! form back.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::filter::SavedFilter;
use crate::record::Record;
use crate::schema::Schema;

/// Record persistence.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load all records, in stored order.
    async fn load_records(&self) -> Result<Vec<Record>>;

    /// Persist one record's data under its id (upsert).
    async fn save_record(&self, id: &str, data: &Map<String, Value>) -> Result<()>;

    /// Delete a record. Deleting an unknown id is not an error.
    async fn delete_record(&self, id: &str) -> Result<()>;
}

/// Schema persistence.
///
/// `load_schema` returns the raw stored value because the store may hold a
/// legacy or damaged shape; only the normalizer interprets it.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    async fn load_schema(&self) -> Result<Option<Value>>;

    async fn save_schema(&self, schema: &Schema) -> Result<()>;
}

/// Saved-filter persistence.
#[async_trait]
pub trait FilterStore: Send + Sync {
    async fn load_filters(&self) -> Result<Vec<SavedFilter>>;

    /// Persist one filter (upsert by id).
    async fn save_filter(&self, filter: &SavedFilter) -> Result<()>;

    /// Delete a filter. Deleting an unknown id is not an error.
    async fn delete_filter(&self, id: &str) -> Result<()>;
}
