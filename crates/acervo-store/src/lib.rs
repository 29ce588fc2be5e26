//! # acervo-store
//!
//! Concrete store implementations for the acervo catalog plus the [`Catalog`]
//! session type that owns the optimistic in-memory state, persists mutations
//! fire-and-forget, and recomputes derived outputs on demand.

pub mod catalog;
pub mod memory;

pub use catalog::Catalog;
pub use memory::{FlakyRecordStore, MemoryFilterStore, MemoryRecordStore, MemorySchemaStore};
