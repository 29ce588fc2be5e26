//! Field definitions and the Field Bank registry.
//!
//! The Field Bank is the single registry of typed field definitions in a
//! schema. Insertion order is display order in "available fields" listings.
//! Layout cells reference bank entries by id; the bank itself knows nothing
//! about placement (see [`crate::schema`]).

use serde::{Deserialize, Serialize};

// =============================================================================
// FIELD TYPE
// =============================================================================

/// Enumerated field kinds.
///
/// The type selects the operator family used by the filter engine and the
/// aggregation mode used by the dashboard: `Numeric`/`Currency` get numeric
/// semantics, everything else gets text semantics.
///
/// Unrecognized type strings from older stored schemas deserialize to
/// [`FieldType::Unknown`], which degrades to text semantics instead of
/// failing the load path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    ShortText,
    LongText,
    Numeric,
    Currency,
    Phone,
    Isbn,
    Doi,
    SingleSelect,
    FileList,
    AuthorsGroup,
    NegotiatorsGroup,
    PaymentStatus,
    WorkflowTimeline,
    CoverImages,
    #[serde(other)]
    Unknown,
}

impl FieldType {
    /// Whether values of this type compare as numbers (comma-decimal coercion).
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric | Self::Currency)
    }

    /// Whether this type can serve as a grouping dimension for aggregation.
    ///
    /// Single-select and the plain text kinds group by raw value; structured
    /// kinds (file lists, author groups, timelines) do not.
    pub fn is_categorical(&self) -> bool {
        matches!(
            self,
            Self::SingleSelect
                | Self::ShortText
                | Self::LongText
                | Self::Phone
                | Self::Isbn
                | Self::Doi
                | Self::PaymentStatus
        )
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShortText => write!(f, "short_text"),
            Self::LongText => write!(f, "long_text"),
            Self::Numeric => write!(f, "numeric"),
            Self::Currency => write!(f, "currency"),
            Self::Phone => write!(f, "phone"),
            Self::Isbn => write!(f, "isbn"),
            Self::Doi => write!(f, "doi"),
            Self::SingleSelect => write!(f, "single_select"),
            Self::FileList => write!(f, "file_list"),
            Self::AuthorsGroup => write!(f, "authors_group"),
            Self::NegotiatorsGroup => write!(f, "negotiators_group"),
            Self::PaymentStatus => write!(f, "payment_status"),
            Self::WorkflowTimeline => write!(f, "workflow_timeline"),
            Self::CoverImages => write!(f, "cover_images"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// =============================================================================
// FIELD DEFINITION
// =============================================================================

/// A single typed field definition.
///
/// `id` is an opaque token, unique across the whole Field Bank. The type is
/// immutable in practice once records reference it; changing it does not
/// migrate existing record values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,

    /// Human-readable label shown on forms and column headers.
    #[serde(default)]
    pub label: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Hidden fields are excluded from the effective column set.
    #[serde(default = "default_true")]
    pub is_visible: bool,

    /// BI fields are eligible for dashboard aggregation.
    #[serde(rename = "isBI", default)]
    pub is_bi: bool,

    /// Choice list, only meaningful for `single_select`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl FieldDefinition {
    /// Create a visible, non-BI field definition.
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            is_visible: true,
            is_bi: false,
            options: Vec::new(),
        }
    }

    /// Set the single-select choice list.
    pub fn with_options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Flag the field for dashboard aggregation.
    pub fn with_bi(mut self, is_bi: bool) -> Self {
        self.is_bi = is_bi;
        self
    }

    /// Hide the field from the effective column set.
    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }
}

// =============================================================================
// FIELD BANK
// =============================================================================

/// Ordered registry of field definitions.
///
/// Insertion order is display order. Upserting an existing id replaces the
/// definition in place (last write wins) without changing its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldBank {
    fields: Vec<FieldDefinition>,
}

impl FieldBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a definition by id.
    pub fn get(&self, field_id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    /// Whether a definition with this id exists.
    pub fn contains(&self, field_id: &str) -> bool {
        self.get(field_id).is_some()
    }

    /// Insert or replace a definition. Replacement keeps the original
    /// position so display order stays stable.
    pub fn upsert(&mut self, def: FieldDefinition) {
        match self.fields.iter_mut().find(|f| f.id == def.id) {
            Some(existing) => *existing = def,
            None => self.fields.push(def),
        }
    }

    /// Remove a definition. Unknown ids are a no-op.
    pub fn remove(&mut self, field_id: &str) {
        self.fields.retain(|f| f.id != field_id);
    }

    /// Collapse duplicate ids: the last occurrence wins, at the position of
    /// the first. Self-repair for hand-edited or damaged stored schemas.
    pub fn dedup(&mut self) {
        let mut deduped: Vec<FieldDefinition> = Vec::with_capacity(self.fields.len());
        for def in self.fields.drain(..) {
            match deduped.iter_mut().find(|f| f.id == def.id) {
                Some(existing) => {
                    tracing::debug!(field_id = %def.id, "duplicate field id collapsed, last write wins");
                    *existing = def;
                }
                None => deduped.push(def),
            }
        }
        self.fields = deduped;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDefinition> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<FieldDefinition> for FieldBank {
    fn from_iter<I: IntoIterator<Item = FieldDefinition>>(iter: I) -> Self {
        let mut bank = Self::new();
        for def in iter {
            bank.upsert(def);
        }
        bank
    }
}

impl<'a> IntoIterator for &'a FieldBank {
    type Item = &'a FieldDefinition;
    type IntoIter = std::slice::Iter<'a, FieldDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_wire_names_are_snake_case() {
        let json = serde_json::to_string(&FieldType::SingleSelect).unwrap();
        assert_eq!(json, "\"single_select\"");

        let parsed: FieldType = serde_json::from_str("\"workflow_timeline\"").unwrap();
        assert_eq!(parsed, FieldType::WorkflowTimeline);
    }

    #[test]
    fn unknown_type_string_degrades_instead_of_failing() {
        let parsed: FieldType = serde_json::from_str("\"hologram\"").unwrap();
        assert_eq!(parsed, FieldType::Unknown);
        assert!(!parsed.is_numeric());
    }

    #[test]
    fn numeric_classification() {
        assert!(FieldType::Numeric.is_numeric());
        assert!(FieldType::Currency.is_numeric());
        assert!(!FieldType::ShortText.is_numeric());
        assert!(!FieldType::Isbn.is_numeric());
    }

    #[test]
    fn categorical_classification() {
        assert!(FieldType::SingleSelect.is_categorical());
        assert!(FieldType::PaymentStatus.is_categorical());
        assert!(!FieldType::Currency.is_categorical());
        assert!(!FieldType::FileList.is_categorical());
        assert!(!FieldType::AuthorsGroup.is_categorical());
    }

    #[test]
    fn field_definition_wire_casing() {
        let def = FieldDefinition::new("f1", "Situação", FieldType::SingleSelect)
            .with_options(["Ativo", "Em Pausa"])
            .with_bi(true);
        let json = serde_json::to_value(&def).unwrap();

        assert_eq!(json["type"], "single_select");
        assert_eq!(json["isBI"], true);
        assert_eq!(json["isVisible"], true);
        assert_eq!(json["options"][1], "Em Pausa");
    }

    #[test]
    fn field_definition_defaults_from_partial_json() {
        let def: FieldDefinition = serde_json::from_str(r#"{"id": "f1"}"#).unwrap();
        assert!(def.is_visible);
        assert!(!def.is_bi);
        assert_eq!(def.field_type, FieldType::ShortText);
        assert!(def.options.is_empty());
    }

    #[test]
    fn bank_upsert_replaces_in_place() {
        let mut bank = FieldBank::new();
        bank.upsert(FieldDefinition::new("a", "A", FieldType::ShortText));
        bank.upsert(FieldDefinition::new("b", "B", FieldType::Numeric));
        bank.upsert(FieldDefinition::new("a", "A v2", FieldType::ShortText));

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.get("a").unwrap().label, "A v2");
        // Position preserved: "a" still first.
        assert_eq!(bank.iter().next().unwrap().id, "a");
    }

    #[test]
    fn bank_dedup_last_write_wins_first_position() {
        let json = r#"[
            {"id": "a", "label": "first"},
            {"id": "b", "label": "keep"},
            {"id": "a", "label": "second"}
        ]"#;
        let mut bank: FieldBank = serde_json::from_str(json).unwrap();
        bank.dedup();

        assert_eq!(bank.len(), 2);
        let ids: Vec<&str> = bank.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(bank.get("a").unwrap().label, "second");
    }

    #[test]
    fn bank_remove_unknown_id_is_noop() {
        let mut bank = FieldBank::new();
        bank.upsert(FieldDefinition::new("a", "A", FieldType::ShortText));
        bank.remove("missing");
        assert_eq!(bank.len(), 1);
    }
}
