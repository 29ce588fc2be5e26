//! Schema layout model: tabs of rows of cells over the Field Bank.
//!
//! `Schema` is an immutable value; every mutation consumes `self` and returns
//! the updated schema. All operations are total: unknown ids are no-ops,
//! never errors. The placement invariant (a field occupies at most one cell
//! across the whole layout) is enforced inside [`Schema::place_cell`], not
//! scattered across callers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::{COL_SPANS, DEFAULT_TAB_ICON, DEFAULT_TAB_LABEL, FULL_SPAN};
use crate::field::{FieldBank, FieldDefinition};

// =============================================================================
// LAYOUT CELL
// =============================================================================

/// One placement of a field on the form grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCell {
    #[serde(default)]
    pub cell_id: String,

    /// Reference into the Field Bank.
    #[serde(default)]
    pub field_id: String,

    /// Grid width, one of [`COL_SPANS`].
    #[serde(default = "default_span")]
    pub col_span: u8,
}

fn default_span() -> u8 {
    FULL_SPAN
}

impl LayoutCell {
    /// Create a cell with a generated id. Out-of-range spans snap to full
    /// width rather than erroring.
    pub fn new(field_id: impl Into<String>, col_span: u8) -> Self {
        Self {
            cell_id: Uuid::new_v4().to_string(),
            field_id: field_id.into(),
            col_span: snap_span(col_span),
        }
    }
}

/// Clamp a requested span onto the allowed grid widths.
pub fn snap_span(col_span: u8) -> u8 {
    if COL_SPANS.contains(&col_span) {
        col_span
    } else {
        FULL_SPAN
    }
}

// =============================================================================
// LAYOUT ROW / TAB
// =============================================================================

/// An ordered run of cells; may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutRow {
    pub cells: Vec<LayoutCell>,
}

impl LayoutRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<Vec<LayoutCell>> for LayoutRow {
    fn from(cells: Vec<LayoutCell>) -> Self {
        Self { cells }
    }
}

/// A form tab. `icon` is a stable string tag; resolving it to a runtime
/// symbol is the presentation layer's problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub icon: String,

    #[serde(default)]
    pub rows: Vec<LayoutRow>,
}

impl Tab {
    /// Create a tab with a generated id and one empty row to drop cells into.
    pub fn new(label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            icon: icon.into(),
            rows: vec![LayoutRow::new()],
        }
    }
}

/// Swap direction for tab and row reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

// =============================================================================
// SCHEMA
// =============================================================================

/// Which bank fields are placed in the layout and which remain available.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldUsage {
    pub placed: Vec<FieldDefinition>,
    pub available: Vec<FieldDefinition>,
}

/// The whole schema: Field Bank plus tab layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    pub field_bank: FieldBank,
    pub tabs: Vec<Tab>,
}

impl Schema {
    /// Empty schema, no tabs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty schema with the default tab, as served to a fresh install.
    /// System fields are injected by the normalizer but never auto-placed,
    /// so the form renders empty until someone places them.
    pub fn starter() -> Self {
        Self::new().add_tab(DEFAULT_TAB_LABEL, DEFAULT_TAB_ICON)
    }

    // ─── Field bank ────────────────────────────────────────────────────────

    /// Add a field definition, replacing any existing definition with the
    /// same id (last write wins).
    pub fn add_field(mut self, def: FieldDefinition) -> Self {
        self.field_bank.upsert(def);
        self
    }

    /// Update an existing field definition. Unknown ids are a no-op.
    pub fn update_field(mut self, def: FieldDefinition) -> Self {
        if self.field_bank.contains(&def.id) {
            self.field_bank.upsert(def);
        }
        self
    }

    /// Delete a field definition and purge every cell referencing it from
    /// every row of every tab. Rows left empty by the purge are preserved
    /// unless `prune_empty_rows` is set.
    pub fn remove_field(mut self, field_id: &str, prune_empty_rows: bool) -> Self {
        self.field_bank.remove(field_id);
        for tab in &mut self.tabs {
            for row in &mut tab.rows {
                row.cells.retain(|c| c.field_id != field_id);
            }
            if prune_empty_rows {
                tab.rows.retain(|r| !r.is_empty());
            }
        }
        self
    }

    // ─── Tabs ──────────────────────────────────────────────────────────────

    pub fn add_tab(mut self, label: impl Into<String>, icon: impl Into<String>) -> Self {
        self.tabs.push(Tab::new(label, icon));
        self
    }

    pub fn remove_tab(mut self, tab_id: &str) -> Self {
        self.tabs.retain(|t| t.id != tab_id);
        self
    }

    /// Swap the tab at `index` with its neighbor. Out-of-range is a no-op;
    /// this is an explicit position swap, not a re-sort.
    pub fn move_tab(mut self, index: usize, direction: MoveDirection) -> Self {
        match direction {
            MoveDirection::Up if index > 0 && index < self.tabs.len() => {
                self.tabs.swap(index, index - 1);
            }
            MoveDirection::Down if index + 1 < self.tabs.len() => {
                self.tabs.swap(index, index + 1);
            }
            _ => {}
        }
        self
    }

    // ─── Rows ──────────────────────────────────────────────────────────────

    pub fn add_row(mut self, tab_id: &str) -> Self {
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) {
            tab.rows.push(LayoutRow::new());
        }
        self
    }

    pub fn remove_row(mut self, tab_id: &str, row_index: usize) -> Self {
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) {
            if row_index < tab.rows.len() {
                tab.rows.remove(row_index);
            }
        }
        self
    }

    pub fn move_row(mut self, tab_id: &str, row_index: usize, direction: MoveDirection) -> Self {
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) {
            match direction {
                MoveDirection::Up if row_index > 0 && row_index < tab.rows.len() => {
                    tab.rows.swap(row_index, row_index - 1);
                }
                MoveDirection::Down if row_index + 1 < tab.rows.len() => {
                    tab.rows.swap(row_index, row_index + 1);
                }
                _ => {}
            }
        }
        self
    }

    // ─── Cells ─────────────────────────────────────────────────────────────

    /// Place a field into a row. A field already placed anywhere in the
    /// layout is relocated, never duplicated. Unknown field, tab, or row is
    /// a no-op and leaves any existing placement untouched.
    pub fn place_cell(
        mut self,
        tab_id: &str,
        row_index: usize,
        field_id: &str,
        col_span: u8,
    ) -> Self {
        if !self.field_bank.contains(field_id) {
            return self;
        }
        let Some(tab_idx) = self.tabs.iter().position(|t| t.id == tab_id) else {
            return self;
        };
        if row_index >= self.tabs[tab_idx].rows.len() {
            return self;
        }
        self.purge_field_cells(field_id);
        self.tabs[tab_idx].rows[row_index]
            .cells
            .push(LayoutCell::new(field_id, col_span));
        self
    }

    /// Detach a cell from its current row and append it to the first row of
    /// the target tab, creating one if none exists. Rows emptied in the
    /// source tab are dropped, but the source tab always keeps at least one
    /// (possibly empty) row.
    pub fn move_cell_to_tab(mut self, cell_id: &str, target_tab_id: &str) -> Self {
        if !self.tabs.iter().any(|t| t.id == target_tab_id) {
            return self;
        }

        let mut moved: Option<LayoutCell> = None;
        for tab in &mut self.tabs {
            let mut found = false;
            for row in &mut tab.rows {
                if let Some(pos) = row.cells.iter().position(|c| c.cell_id == cell_id) {
                    moved = Some(row.cells.remove(pos));
                    found = true;
                    break;
                }
            }
            if found {
                tab.rows.retain(|r| !r.is_empty());
                if tab.rows.is_empty() {
                    tab.rows.push(LayoutRow::new());
                }
                break;
            }
        }

        let Some(cell) = moved else {
            return self;
        };
        if let Some(target) = self.tabs.iter_mut().find(|t| t.id == target_tab_id) {
            if target.rows.is_empty() {
                target.rows.push(LayoutRow::new());
            }
            if let Some(first) = target.rows.first_mut() {
                first.cells.push(cell);
            }
        }
        self
    }

    /// Remove a cell wherever it lives. The row is kept even if emptied.
    pub fn remove_cell(mut self, cell_id: &str) -> Self {
        for tab in &mut self.tabs {
            for row in &mut tab.rows {
                row.cells.retain(|c| c.cell_id != cell_id);
            }
        }
        self
    }

    // ─── Queries ───────────────────────────────────────────────────────────

    /// The placement-tracking set: every field id referenced by a cell.
    pub fn placed_field_ids(&self) -> BTreeSet<String> {
        self.tabs
            .iter()
            .flat_map(|t| t.rows.iter())
            .flat_map(|r| r.cells.iter())
            .map(|c| c.field_id.clone())
            .collect()
    }

    /// Split the bank into placed and still-available fields, in bank order.
    pub fn field_usage(&self) -> FieldUsage {
        let placed_ids = self.placed_field_ids();
        let mut usage = FieldUsage::default();
        for def in self.field_bank.iter() {
            if placed_ids.contains(&def.id) {
                usage.placed.push(def.clone());
            } else {
                usage.available.push(def.clone());
            }
        }
        usage
    }

    /// Drop cells referencing ids missing from the bank. Self-repair for
    /// schemas damaged by partial writes; dangling references are never
    /// rendered.
    pub fn drop_dangling_cells(mut self) -> Self {
        let known: BTreeSet<String> = self.field_bank.iter().map(|f| f.id.clone()).collect();
        for tab in &mut self.tabs {
            for row in &mut tab.rows {
                row.cells.retain(|c| {
                    let keep = known.contains(&c.field_id);
                    if !keep {
                        tracing::debug!(
                            field_id = %c.field_id,
                            cell_id = %c.cell_id,
                            "dropping dangling layout cell"
                        );
                    }
                    keep
                });
            }
        }
        self
    }

    fn purge_field_cells(&mut self, field_id: &str) {
        for tab in &mut self.tabs {
            for row in &mut tab.rows {
                row.cells.retain(|c| c.field_id != field_id);
            }
        }
    }
}
