//! Centralized default constants for the acervo catalog.
//!
//! **This module is the single source of truth** for all shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for the derived record view.
pub const PAGE_SIZE: usize = 20;

// =============================================================================
// LAYOUT
// =============================================================================

/// Column spans a layout cell may occupy on the 12-column form grid.
pub const COL_SPANS: [u8; 6] = [3, 4, 6, 8, 9, 12];

/// Full-width span; also the snap target for out-of-range spans and the
/// span assigned to every cell produced by legacy-schema migration.
pub const FULL_SPAN: u8 = 12;

/// Label of the tab created for an empty or absent schema.
pub const DEFAULT_TAB_LABEL: &str = "Informações Gerais";

/// Icon tag of the default tab. Icons are stable string tags; resolution to
/// a runtime symbol happens at the presentation boundary.
pub const DEFAULT_TAB_ICON: &str = "info";

// =============================================================================
// SYSTEM FIELDS
// =============================================================================

/// Version of the mandatory system-field list injected by the normalizer.
/// v1 predates the cover-image gallery; v2 added the `cover_images` field.
pub const SYSTEM_FIELDS_VERSION: u32 = 2;

// =============================================================================
// AGGREGATION
// =============================================================================

/// Category bucket for records missing a value in a grouping field.
pub const NA_CATEGORY: &str = "N/A";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn col_spans_are_sorted_and_end_full_width() {
        for w in COL_SPANS.windows(2) {
            assert!(w[0] < w[1], "Expected {} < {}", w[0], w[1]);
        }
        assert_eq!(COL_SPANS[COL_SPANS.len() - 1], FULL_SPAN);
    }

    #[test]
    fn page_size_is_positive() {
        const {
            assert!(PAGE_SIZE > 0);
        }
    }

    #[test]
    fn system_fields_version_is_current() {
        const {
            assert!(SYSTEM_FIELDS_VERSION >= 2);
        }
    }
}
