//! # acervo-core
//!
//! Core types and pure logic for the acervo record catalog: the field bank
//! and layout model, legacy-schema normalization, the nested boolean filter
//! engine, the derived-view pipeline, and dashboard aggregation.
//!
//! Everything here is synchronous and non-throwing; the only async surface
//! is the store traits the `acervo-store` crate implements.

pub mod aggregate;
pub mod defaults;
pub mod error;
pub mod field;
pub mod filter;
pub mod logging;
pub mod normalize;
pub mod record;
pub mod schema;
pub mod traits;
pub mod value;
pub mod view;

// Re-export commonly used types at crate root
pub use aggregate::{aggregate, CategoryCount, FieldSeries, NumericGroup};
pub use error::{Error, Result};
pub use field::{FieldBank, FieldDefinition, FieldType};
pub use filter::{evaluate, FilterBlock, FilterOperator, FilterRule, Logic, SavedFilter};
pub use normalize::{is_legacy, normalize};
pub use record::Record;
pub use schema::{FieldUsage, LayoutCell, LayoutRow, MoveDirection, Schema, Tab};
pub use traits::{FilterStore, RecordStore, SchemaStore};
pub use view::{effective_columns, project, SortDirection, SortSpec, ViewQuery, ViewResponse};
