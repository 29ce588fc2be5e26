//! Saved filters and the boolean evaluation engine.
//!
//! A saved filter is a two-level AND/OR tree: blocks combined by the global
//! logic, rules combined within each block by the block logic. Evaluation is
//! purely structural recursion over that tree; the field's declared type
//! (looked up in the Field Bank) selects the operator family.
//!
//! Evaluation never throws. A rule referencing an unknown field falls back to
//! text semantics; an unrecognized operator is vacuously satisfied. Both
//! fallbacks are logged as unexpected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::field::FieldBank;
use crate::record::Record;
use crate::value::{coerce_number, is_empty_value, stringify};

// =============================================================================
// FILTER MODEL
// =============================================================================

/// AND/OR combinator, used both across blocks and within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl std::fmt::Display for Logic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// Comparison operators. Which ones apply is decided by the field type:
/// `numeric`/`currency` fields use the numeric set, everything else the text
/// set. `is_empty`/`is_not_empty` apply uniformly.
///
/// Operator tokens from newer or older builds deserialize to `Unknown`
/// rather than failing the filter load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Starts,
    Ends,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    Between,
    IsEmpty,
    IsNotEmpty,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::Starts => "starts",
            Self::Ends => "ends",
            Self::GreaterThan => "greater_than",
            Self::GreaterEqual => "greater_equal",
            Self::LessThan => "less_than",
            Self::LessEqual => "less_equal",
            Self::Between => "between",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", token)
    }
}

/// One comparison against one field. `value2` is only meaningful for the
/// range operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    #[serde(default)]
    pub field_id: String,

    #[serde(default)]
    pub operator: FilterOperator,

    #[serde(default)]
    pub value: String,

    /// Upper bound for `between`, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<String>,
}

impl FilterRule {
    pub fn new(
        field_id: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            operator,
            value: value.into(),
            value2: None,
        }
    }

    /// Set the upper bound for a range rule.
    pub fn with_value2(mut self, value2: impl Into<String>) -> Self {
        self.value2 = Some(value2.into());
        self
    }
}

/// An ordered group of rules sharing one combinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterBlock {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub logic: Logic,

    #[serde(default)]
    pub rules: Vec<FilterRule>,
}

impl FilterBlock {
    pub fn new(logic: Logic) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            logic,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: FilterRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// A named, persisted filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilter {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub global_logic: Logic,

    #[serde(default)]
    pub blocks: Vec<FilterBlock>,

    #[serde(default = "Utc::now")]
    pub created_at_utc: DateTime<Utc>,
}

impl SavedFilter {
    /// Create an empty AND filter with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            global_logic: Logic::And,
            blocks: Vec::new(),
            created_at_utc: Utc::now(),
        }
    }

    pub fn with_logic(mut self, logic: Logic) -> Self {
        self.global_logic = logic;
        self
    }

    pub fn with_block(mut self, block: FilterBlock) -> Self {
        self.blocks.push(block);
        self
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Evaluate a saved filter against one record.
///
/// Blocks combine via the global logic, rules within a block via the block
/// logic. An AND over zero operands is vacuously true; an OR over zero
/// operands is false. This holds at both levels.
pub fn evaluate(filter: &SavedFilter, record: &Record, bank: &FieldBank) -> bool {
    let matched = match filter.global_logic {
        Logic::And => filter
            .blocks
            .iter()
            .all(|block| evaluate_block(block, record, bank)),
        Logic::Or => filter
            .blocks
            .iter()
            .any(|block| evaluate_block(block, record, bank)),
    };
    tracing::trace!(
        filter_id = %filter.id,
        record_id = %record.id,
        matched,
        "filter evaluated"
    );
    matched
}

fn evaluate_block(block: &FilterBlock, record: &Record, bank: &FieldBank) -> bool {
    match block.logic {
        Logic::And => block
            .rules
            .iter()
            .all(|rule| evaluate_rule(rule, record, bank)),
        Logic::Or => block
            .rules
            .iter()
            .any(|rule| evaluate_rule(rule, record, bank)),
    }
}

fn evaluate_rule(rule: &FilterRule, record: &Record, bank: &FieldBank) -> bool {
    let value = record.value(&rule.field_id);

    // Emptiness is type-independent.
    match rule.operator {
        FilterOperator::IsEmpty => return is_empty_value(value),
        FilterOperator::IsNotEmpty => return !is_empty_value(value),
        FilterOperator::Unknown => {
            tracing::warn!(
                field_id = %rule.field_id,
                "unrecognized filter operator, rule vacuously satisfied"
            );
            return true;
        }
        _ => {}
    }

    let numeric = match bank.get(&rule.field_id) {
        Some(def) => def.field_type.is_numeric(),
        None => {
            tracing::warn!(
                field_id = %rule.field_id,
                "rule references unknown field, using text semantics"
            );
            false
        }
    };

    if numeric {
        evaluate_numeric(rule, value)
    } else {
        evaluate_text(rule, value)
    }
}

fn evaluate_numeric(rule: &FilterRule, value: Option<&Value>) -> bool {
    let actual = value.map(coerce_number).unwrap_or(0.0);
    let target = rule_number(&rule.value);

    match rule.operator {
        FilterOperator::Equals => actual == target,
        FilterOperator::NotEquals => actual != target,
        FilterOperator::GreaterThan => actual > target,
        FilterOperator::GreaterEqual => actual >= target,
        FilterOperator::LessThan => actual < target,
        FilterOperator::LessEqual => actual <= target,
        FilterOperator::Between => {
            let upper = rule.value2.as_deref().map(rule_number).unwrap_or(0.0);
            actual >= target && actual <= upper
        }
        other => {
            tracing::warn!(
                field_id = %rule.field_id,
                operator = %other,
                "operator outside the numeric family, rule vacuously satisfied"
            );
            true
        }
    }
}

fn evaluate_text(rule: &FilterRule, value: Option<&Value>) -> bool {
    let actual = value.map(stringify).unwrap_or_default().to_lowercase();
    let needle = rule.value.to_lowercase();

    match rule.operator {
        FilterOperator::Equals => actual == needle,
        FilterOperator::NotEquals => actual != needle,
        FilterOperator::Contains => actual.contains(&needle),
        FilterOperator::NotContains => !actual.contains(&needle),
        FilterOperator::Starts => actual.starts_with(&needle),
        FilterOperator::Ends => actual.ends_with(&needle),
        other => {
            tracing::warn!(
                field_id = %rule.field_id,
                operator = %other,
                "operator outside the text family, rule vacuously satisfied"
            );
            true
        }
    }
}

fn rule_number(raw: &str) -> f64 {
    coerce_number(&Value::String(raw.to_string()))
}
