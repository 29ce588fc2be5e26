//! Structured logging schema and field name constants for acervo.
//!
//! All crates use these constants for consistent structured logging fields.
//! This ensures log aggregation tools can query by standardized field names
//! across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | WARN  | Recoverable issue, automatic fallback applied (unknown operator, failed persistence) |
//! | INFO  | Lifecycle events (schema migration, catalog open/reload) |
//! | DEBUG | Self-repair decisions (dangling cells dropped, duplicate ids collapsed) |
//! | TRACE | Per-record evaluation, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "core", "store"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "normalize", "filter", "view", "aggregate", "catalog"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "migrate", "evaluate", "save_record", "save_schema"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Record id being operated on.
pub const RECORD_ID: &str = "record_id";

/// Field bank id referenced by a rule, cell, or column.
pub const FIELD_ID: &str = "field_id";

/// Saved filter id being evaluated or persisted.
pub const FILTER_ID: &str = "filter_id";

/// Layout tab id.
pub const TAB_ID: &str = "tab_id";

/// Layout cell id.
pub const CELL_ID: &str = "cell_id";

/// Filter operator token, logged when an unknown operator falls through.
pub const OPERATOR: &str = "operator";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Number of tabs touched by a migration.
pub const TAB_COUNT: &str = "tab_count";

/// Number of field definitions in a bank after an operation.
pub const FIELD_COUNT: &str = "field_count";

/// Number of records produced by a projection.
pub const RESULT_COUNT: &str = "result_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
