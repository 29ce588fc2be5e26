//! Properties of the schema normalizer: idempotence and content-preserving
//! legacy migration.

use acervo_core::{is_legacy, normalize};
use serde_json::json;

fn legacy_payload() -> serde_json::Value {
    json!({
        "tabs": [
            {
                "id": "t-geral",
                "label": "Geral",
                "icon": "info",
                "fields": [
                    {"id": "f-titulo", "label": "Título", "type": "short_text"},
                    {"id": "f-status", "label": "Situação", "type": "single_select",
                     "options": ["Ativo", "Em Pausa"]}
                ]
            },
            {
                "id": "t-financeiro",
                "label": "Financeiro",
                "icon": "wallet",
                "fields": [
                    {"id": "f-status", "label": "Situação", "type": "single_select"},
                    {"id": "f-adiantamento", "label": "Adiantamento", "type": "currency"}
                ]
            }
        ]
    })
}

#[test]
fn normalize_is_idempotent_over_a_migrated_legacy_schema() {
    let first = normalize(Some(&legacy_payload()));
    let raw = serde_json::to_value(&first).unwrap();
    assert!(!is_legacy(&raw));

    let second = normalize(Some(&raw));
    assert_eq!(second, first);
}

#[test]
fn normalize_is_idempotent_over_the_starter_schema() {
    let first = normalize(None);
    let raw = serde_json::to_value(&first).unwrap();

    let second = normalize(Some(&raw));
    assert_eq!(second, first);
}

#[test]
fn migration_preserves_tab_count_and_distinct_field_ids() {
    let schema = normalize(Some(&legacy_payload()));

    // Two legacy tabs survive as two tabs, one row each.
    assert_eq!(schema.tabs.len(), 2);
    assert!(schema.tabs.iter().all(|t| t.rows.len() == 1));

    // f-status occurs in both tabs but enters the bank once, at its first
    // occurrence; system fields are appended after the migrated ones.
    let migrated: Vec<&str> = schema
        .field_bank
        .iter()
        .map(|f| f.id.as_str())
        .filter(|id| id.starts_with("f-"))
        .collect();
    assert_eq!(migrated, vec!["f-titulo", "f-status", "f-adiantamento"]);

    // Every occurrence still renders: both tabs carry a cell for f-status.
    let status_cells = schema
        .tabs
        .iter()
        .flat_map(|t| t.rows.iter())
        .flat_map(|r| r.cells.iter())
        .filter(|c| c.field_id == "f-status")
        .count();
    assert_eq!(status_cells, 2);
}

#[test]
fn migration_keeps_field_order_within_each_tab() {
    let schema = normalize(Some(&legacy_payload()));

    let first_tab: Vec<&str> = schema.tabs[0].rows[0]
        .cells
        .iter()
        .map(|c| c.field_id.as_str())
        .collect();
    assert_eq!(first_tab, vec!["f-titulo", "f-status"]);

    let second_tab: Vec<&str> = schema.tabs[1].rows[0]
        .cells
        .iter()
        .map(|c| c.field_id.as_str())
        .collect();
    assert_eq!(second_tab, vec!["f-status", "f-adiantamento"]);
}

#[test]
fn system_fields_are_injected_once_and_never_placed_by_injection() {
    let schema = normalize(Some(&legacy_payload()));

    assert!(schema.field_bank.contains("title"));
    assert!(schema.field_bank.contains("payment_status"));

    let placed = schema.placed_field_ids();
    assert!(!placed.contains("title"));
    assert!(!placed.contains("payment_status"));

    // Re-normalizing does not duplicate the injected fields.
    let raw = serde_json::to_value(&schema).unwrap();
    let again = normalize(Some(&raw));
    assert_eq!(again.field_bank.len(), schema.field_bank.len());
}
