//! Derived view pipeline.
//!
//! Combines the saved-filter engine, global search, type-aware sort, and
//! pagination into the one projection the table renders from. Recomputed in
//! full on every mutation; there is no incremental update.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::defaults::PAGE_SIZE;
use crate::field::FieldBank;
use crate::filter::{evaluate, SavedFilter};
use crate::record::Record;
use crate::schema::Schema;
use crate::value::{coerce_number, stringify};

// =============================================================================
// SORT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// The single active sort: a field id or the literal `"id"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Desc,
        }
    }
}

// =============================================================================
// QUERY / RESPONSE
// =============================================================================

/// Parameters of one projection. `page` is 1-based.
#[derive(Debug, Clone)]
pub struct ViewQuery<'a> {
    pub filter: Option<&'a SavedFilter>,
    pub search_term: &'a str,
    pub sort: Option<SortSpec>,
    pub visible_columns: &'a [String],
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewQuery<'_> {
    fn default() -> Self {
        Self {
            filter: None,
            search_term: "",
            sort: None,
            visible_columns: &[],
            page: 1,
            page_size: PAGE_SIZE,
        }
    }
}

/// The visible, ordered, paginated record slice plus the valid column set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub records: Vec<Record>,
    pub total: usize,
    pub total_pages: usize,
    pub effective_columns: Vec<String>,
}

// =============================================================================
// PROJECTION
// =============================================================================

/// Project a record set through filter → search → sort → pagination.
///
/// Filtering applies the saved filter first, then the global free-text
/// search. Sorting is stable: equal keys keep their original relative order,
/// so re-projecting an unchanged set yields an identical ordering.
pub fn project(records: &[Record], schema: &Schema, query: &ViewQuery) -> ViewResponse {
    let bank = &schema.field_bank;

    let mut visible: Vec<&Record> = records
        .iter()
        .filter(|r| query.filter.map_or(true, |f| evaluate(f, r, bank)))
        .filter(|r| matches_search(r, query.search_term))
        .collect();

    if let Some(sort) = &query.sort {
        sort_records(&mut visible, sort, bank);
    }

    let total = visible.len();
    let page_size = query.page_size.max(1);
    let total_pages = total.div_ceil(page_size).max(1);
    let start = (query.page.max(1) - 1).saturating_mul(page_size);
    let page: Vec<Record> = visible
        .iter()
        .skip(start)
        .take(page_size)
        .map(|r| (*r).clone())
        .collect();

    tracing::trace!(result_count = total, "view projected");

    ViewResponse {
        records: page,
        total,
        total_pages,
        effective_columns: effective_columns(query.visible_columns, bank),
    }
}

/// Filter requested column ids down to the valid, visible set.
///
/// `"id"` is kept unconditionally; every other id survives only if its field
/// still exists and is not hidden. Stale ids are dropped silently, never an
/// error.
pub fn effective_columns(requested: &[String], bank: &FieldBank) -> Vec<String> {
    let mut columns = vec!["id".to_string()];
    for col in requested {
        if col == "id" {
            continue;
        }
        if let Some(def) = bank.get(col) {
            if def.is_visible {
                columns.push(col.clone());
            }
        }
    }
    columns
}

/// Global search: case-insensitive substring over the record id and every
/// stringified data value, independent of field type.
fn matches_search(record: &Record, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    if record.id.to_lowercase().contains(&needle) {
        return true;
    }
    record
        .data
        .values()
        .any(|v| stringify(v).to_lowercase().contains(&needle))
}

fn sort_records(records: &mut [&Record], sort: &SortSpec, bank: &FieldBank) {
    let numeric = sort.key != "id"
        && bank
            .get(&sort.key)
            .map(|f| f.field_type.is_numeric())
            .unwrap_or(false);

    records.sort_by(|a, b| {
        let ord = if sort.key == "id" {
            a.id.cmp(&b.id)
        } else if numeric {
            let av = a.value(&sort.key).map(coerce_number).unwrap_or(0.0);
            let bv = b.value(&sort.key).map(coerce_number).unwrap_or(0.0);
            av.partial_cmp(&bv).unwrap_or(Ordering::Equal)
        } else {
            let av = a.value(&sort.key).map(stringify).unwrap_or_default().to_lowercase();
            let bv = b.value(&sort.key).map(stringify).unwrap_or_default().to_lowercase();
            av.cmp(&bv)
        };
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}
