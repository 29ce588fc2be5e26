//! Dashboard aggregation over BI-flagged fields.
//!
//! Categorical fields become count-per-category series; numeric fields become
//! sum/average series grouped by a sibling categorical BI field. Numeric
//! coercion is shared with the filter engine ([`crate::value`]) so a currency
//! string filters and sums identically.

use serde::{Deserialize, Serialize};

use crate::defaults::NA_CATEGORY;
use crate::field::{FieldBank, FieldDefinition};
use crate::record::Record;
use crate::value::{coerce_number, is_empty_value, stringify};

// =============================================================================
// SERIES SHAPES
// =============================================================================

/// One slice of a categorical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub value: usize,
    /// Share of all records, rounded to one decimal.
    pub percent: f64,
}

/// One bucket of a numeric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericGroup {
    pub name: String,
    pub sum: f64,
    /// Mean over the bucket, excluding zero/invalid coercions.
    pub average: f64,
}

/// A per-field dashboard series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSeries {
    Categorical {
        categories: Vec<CategoryCount>,
    },
    Numeric {
        groups: Vec<NumericGroup>,
        grand_total: f64,
        /// Mean over all records, excluding zero/invalid coercions.
        grand_average: f64,
    },
}

// =============================================================================
// AGGREGATION
// =============================================================================

/// Build one series per BI-flagged field, in bank order.
pub fn aggregate(records: &[Record], bank: &FieldBank) -> Vec<(String, FieldSeries)> {
    bank.iter()
        .filter(|f| f.is_bi)
        .map(|f| {
            let series = if f.field_type.is_numeric() {
                numeric_series(records, f, bank)
            } else {
                categorical_series(records, f)
            };
            (f.id.clone(), series)
        })
        .collect()
}

/// Group by raw value; missing values fall into the N/A bucket. Buckets are
/// emitted in first-occurrence order.
fn categorical_series(records: &[Record], field: &FieldDefinition) -> FieldSeries {
    let mut buckets: Vec<(String, usize)> = Vec::new();
    for record in records {
        let name = bucket_name(record, &field.id);
        match buckets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => buckets.push((name, 1)),
        }
    }

    let total = records.len();
    let categories = buckets
        .into_iter()
        .map(|(name, value)| CategoryCount {
            name,
            value,
            percent: round1(value as f64 / total.max(1) as f64 * 100.0),
        })
        .collect();

    FieldSeries::Categorical { categories }
}

/// Sum and average the coerced values, grouped by the first *other*
/// categorical BI field. With no such sibling every record lands in the
/// single N/A bucket, which keeps the series totals equal to the grand
/// totals.
fn numeric_series(records: &[Record], field: &FieldDefinition, bank: &FieldBank) -> FieldSeries {
    let dimension = bank
        .iter()
        .find(|other| other.is_bi && other.id != field.id && other.field_type.is_categorical());

    let mut buckets: Vec<(String, f64, usize)> = Vec::new();
    let mut grand_total = 0.0;
    let mut grand_count = 0usize;

    for record in records {
        let amount = record.value(&field.id).map(coerce_number).unwrap_or(0.0);
        grand_total += amount;
        if amount != 0.0 {
            grand_count += 1;
        }

        let name = match dimension {
            Some(dim) => bucket_name(record, &dim.id),
            None => NA_CATEGORY.to_string(),
        };
        match buckets.iter_mut().find(|(n, _, _)| *n == name) {
            Some((_, sum, count)) => {
                *sum += amount;
                if amount != 0.0 {
                    *count += 1;
                }
            }
            None => buckets.push((name, amount, usize::from(amount != 0.0))),
        }
    }

    let groups = buckets
        .into_iter()
        .map(|(name, sum, count)| NumericGroup {
            name,
            sum,
            average: if count > 0 { sum / count as f64 } else { 0.0 },
        })
        .collect();

    FieldSeries::Numeric {
        groups,
        grand_total,
        grand_average: if grand_count > 0 {
            grand_total / grand_count as f64
        } else {
            0.0
        },
    }
}

fn bucket_name(record: &Record, field_id: &str) -> String {
    let value = record.value(field_id);
    if is_empty_value(value) {
        NA_CATEGORY.to_string()
    } else {
        value.map(stringify).unwrap_or_default()
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
