//! Schema normalization and legacy migration.
//!
//! `normalize` is a total function over whatever the schema store returns:
//! the current layout shape, the legacy per-tab-fields shape, malformed JSON,
//! or nothing at all. It never fails; damaged input degrades to a usable
//! schema and the repair is logged.
//!
//! Every load path must pass the stored schema through here before use.

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::defaults::FULL_SPAN;
use crate::field::{FieldBank, FieldDefinition, FieldType};
use crate::schema::{LayoutCell, LayoutRow, Schema, Tab};

/// Mandatory system fields, appended to the bank for any id not already
/// present. Versioned via [`crate::defaults::SYSTEM_FIELDS_VERSION`]; the
/// list only ever grows. Injected fields are never auto-placed into a cell.
static SYSTEM_FIELDS: Lazy<Vec<FieldDefinition>> = Lazy::new(|| {
    vec![
        FieldDefinition::new("title", "Título", FieldType::ShortText),
        FieldDefinition::new("isbn", "ISBN", FieldType::Isbn),
        FieldDefinition::new("doi", "DOI", FieldType::Doi),
        FieldDefinition::new("authors", "Autores", FieldType::AuthorsGroup),
        FieldDefinition::new("negotiators", "Negociadores", FieldType::NegotiatorsGroup),
        FieldDefinition::new("workflow", "Linha do Tempo Editorial", FieldType::WorkflowTimeline),
        FieldDefinition::new("payment_status", "Status de Pagamento", FieldType::PaymentStatus),
        FieldDefinition::new("cover_images", "Capas", FieldType::CoverImages),
    ]
});

/// Normalize a raw stored schema into the current shape.
///
/// Absent or unparseable input yields the starter schema. Legacy input is
/// migrated. Either way the result is self-repaired (duplicate field ids
/// collapsed, dangling cells dropped) and the mandatory system fields are
/// injected. Idempotent: normalizing an already-normalized schema changes
/// nothing.
pub fn normalize(raw: Option<&Value>) -> Schema {
    let schema = match raw {
        None => Schema::starter(),
        Some(value) if is_legacy(value) => migrate_legacy(value),
        Some(value) => match serde_json::from_value::<Schema>(value.clone()) {
            Ok(schema) => schema,
            Err(e) => {
                tracing::warn!(error = %e, "stored schema unparseable, starting fresh");
                Schema::starter()
            }
        },
    };

    let mut schema = schema.drop_dangling_cells();
    schema.field_bank.dedup();
    inject_system_fields(schema)
}

/// Legacy shape detection: `tabs` present, `fieldBank` absent, and the first
/// tab carries a `fields` list but no `rows` list.
pub fn is_legacy(raw: &Value) -> bool {
    let Some(obj) = raw.as_object() else {
        return false;
    };
    if obj.contains_key("fieldBank") {
        return false;
    }
    let Some(tabs) = obj.get("tabs").and_then(Value::as_array) else {
        return false;
    };
    match tabs.first().and_then(Value::as_object) {
        Some(first) => first.contains_key("fields") && !first.contains_key("rows"),
        None => false,
    }
}

/// Migrate the legacy per-tab-fields shape into the current layout shape.
///
/// Fields move into a single bank in first-occurrence order across all tabs.
/// Each tab gets one row holding a full-width cell per field, preserving the
/// original field order within the tab.
fn migrate_legacy(raw: &Value) -> Schema {
    let tabs_raw = raw
        .get("tabs")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut bank = FieldBank::new();
    let mut tabs = Vec::with_capacity(tabs_raw.len());

    for tab_raw in &tabs_raw {
        let mut tab = Tab::new(
            tab_raw.get("label").and_then(Value::as_str).unwrap_or(""),
            tab_raw.get("icon").and_then(Value::as_str).unwrap_or(""),
        );
        if let Some(id) = tab_raw.get("id").and_then(Value::as_str) {
            tab.id = id.to_string();
        }

        let mut row = LayoutRow::new();
        for field_raw in tab_raw
            .get("fields")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let Ok(def) = serde_json::from_value::<FieldDefinition>(field_raw.clone()) else {
                tracing::debug!("skipping unparseable legacy field");
                continue;
            };
            if def.id.is_empty() {
                continue;
            }
            row.cells.push(LayoutCell::new(def.id.as_str(), FULL_SPAN));
            if !bank.contains(&def.id) {
                bank.upsert(def);
            }
        }
        tab.rows = vec![row];
        tabs.push(tab);
    }

    tracing::info!(
        tab_count = tabs.len(),
        field_count = bank.len(),
        "migrated legacy schema to layout shape"
    );

    Schema {
        field_bank: bank,
        tabs,
    }
}

/// Append any missing system field to the bank. Existing definitions are
/// left untouched, even when an operator re-typed or re-labeled them. Tabs
/// are never created, deleted, or reordered here.
fn inject_system_fields(mut schema: Schema) -> Schema {
    for def in SYSTEM_FIELDS.iter() {
        if !schema.field_bank.contains(&def.id) {
            schema.field_bank.upsert(def.clone());
        }
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_input_yields_starter_with_system_fields() {
        let schema = normalize(None);

        assert_eq!(schema.tabs.len(), 1);
        assert_eq!(schema.tabs[0].label, crate::defaults::DEFAULT_TAB_LABEL);
        assert!(schema.field_bank.contains("title"));
        assert!(schema.field_bank.contains("cover_images"));
        // Injected, not placed: the form starts empty.
        assert!(schema.placed_field_ids().is_empty());
    }

    #[test]
    fn unparseable_input_falls_back_to_starter() {
        let schema = normalize(Some(&json!("not a schema")));
        assert_eq!(schema.tabs.len(), 1);
        assert!(schema.field_bank.contains("title"));
    }

    #[test]
    fn legacy_detection_requires_fields_without_rows() {
        let legacy = json!({"tabs": [{"id": "t1", "fields": []}]});
        assert!(is_legacy(&legacy));

        let current = json!({"fieldBank": [], "tabs": [{"id": "t1", "rows": []}]});
        assert!(!is_legacy(&current));

        let rows_present = json!({"tabs": [{"id": "t1", "fields": [], "rows": []}]});
        assert!(!is_legacy(&rows_present));

        assert!(!is_legacy(&json!({"tabs": []})));
        assert!(!is_legacy(&json!({})));
        assert!(!is_legacy(&json!(null)));
    }

    #[test]
    fn legacy_migration_builds_full_width_rows() {
        let legacy = json!({
            "tabs": [{
                "id": "t1",
                "label": "Geral",
                "icon": "info",
                "fields": [
                    {"id": "f1", "label": "Um", "type": "short_text"},
                    {"id": "f2", "label": "Dois", "type": "currency"}
                ]
            }]
        });

        let schema = normalize(Some(&legacy));
        assert_eq!(schema.tabs.len(), 1);
        assert_eq!(schema.tabs[0].id, "t1");
        assert_eq!(schema.tabs[0].rows.len(), 1);

        let cells = &schema.tabs[0].rows[0].cells;
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].field_id, "f1");
        assert_eq!(cells[1].field_id, "f2");
        assert!(cells.iter().all(|c| c.col_span == FULL_SPAN));
    }

    #[test]
    fn legacy_migration_bank_is_first_occurrence_order_across_tabs() {
        let legacy = json!({
            "tabs": [
                {"id": "t1", "fields": [{"id": "b"}, {"id": "a"}]},
                {"id": "t2", "fields": [{"id": "a"}, {"id": "c"}]}
            ]
        });

        let schema = normalize(Some(&legacy));
        let ids: Vec<&str> = schema
            .field_bank
            .iter()
            .map(|f| f.id.as_str())
            .filter(|id| ["a", "b", "c"].contains(id))
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn injection_preserves_operator_overrides() {
        let current = json!({
            "fieldBank": [
                {"id": "title", "label": "Nome da Obra", "type": "long_text"}
            ],
            "tabs": []
        });

        let schema = normalize(Some(&current));
        let title = schema.field_bank.get("title").unwrap();
        assert_eq!(title.label, "Nome da Obra");
        assert_eq!(title.field_type, FieldType::LongText);
    }

    #[test]
    fn normalize_drops_dangling_cells() {
        let current = json!({
            "fieldBank": [{"id": "f1", "label": "Um"}],
            "tabs": [{
                "id": "t1",
                "label": "Geral",
                "icon": "info",
                "rows": [[
                    {"cellId": "c1", "fieldId": "f1", "colSpan": 6},
                    {"cellId": "c2", "fieldId": "gone", "colSpan": 6}
                ]]
            }]
        });

        let schema = normalize(Some(&current));
        assert_eq!(schema.tabs[0].rows[0].cells.len(), 1);
        assert_eq!(schema.tabs[0].rows[0].cells[0].field_id, "f1");
    }
}
