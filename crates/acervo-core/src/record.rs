//! Catalog records.
//!
//! Records are not schema-validated on write; a record's `data` map may hold
//! keys for fields that no longer exist and may lack keys for fields that do.
//! Absent keys default to empty at read time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat catalog record: an opaque id plus a field-id → value map.
///
/// Value shapes are determined by the referenced field's type (scalar,
/// array-of-attachment, or a type-specific structured value); the coercion
/// layer in [`crate::value`] interprets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: Map::new(),
        }
    }

    /// Set a field value.
    pub fn with_value(mut self, field_id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(field_id.into(), value.into());
        self
    }

    /// Read a field value. Absent keys are simply `None`; callers treat
    /// `None` and JSON null alike.
    pub fn value(&self, field_id: &str) -> Option<&Value> {
        self.data.get(field_id)
    }
}
