use shared::{
    domain::{Machine, MachineDraft, MachineId},
    error::StoreError,
};
use store::MachineStore;

use crate::view::{format_item_list, parse_item_list};

/// One editable sheet row: the machine plus the comma-joined item text the
/// operator actually types.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub machine: Machine,
    pub item_string: String,
}

impl SheetRow {
    fn from_machine(machine: Machine) -> Self {
        // Machines without an item menu show their assigned item, so a
        // sheet round trip does not wipe free-text assignments.
        let item_string = if machine.possible_items.is_empty() {
            machine.item_name.clone()
        } else {
            format_item_list(&machine.possible_items)
        };
        Self {
            machine,
            item_string,
        }
    }
}

/// Bulk spreadsheet-style editor over the whole machine list. Row edits,
/// additions, and removals stay local; a single confirmed save-all writes
/// the snapshot through the store.
pub struct SheetEditor {
    rows: Vec<SheetRow>,
}

impl SheetEditor {
    /// Reads all machines and orders them by building then name for
    /// editing.
    pub async fn load(store: &dyn MachineStore) -> Result<Self, StoreError> {
        let mut machines = store.get_machines().await?;
        machines.sort_by(|a, b| {
            a.building
                .cmp(&b.building)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(Self {
            rows: machines.into_iter().map(SheetRow::from_machine).collect(),
        })
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    pub fn row_mut(&mut self, id: MachineId) -> Option<&mut SheetRow> {
        self.rows.iter_mut().find(|r| r.machine.id == id)
    }

    /// Appends a fresh draft row and returns its id.
    pub fn add_row(&mut self) -> MachineId {
        let id = MachineId::fresh();
        self.rows.push(SheetRow {
            machine: MachineDraft::default().into_machine(id),
            item_string: String::new(),
        });
        id
    }

    /// Local removal only; the store is untouched until save.
    pub fn remove_row(&mut self, id: MachineId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.machine.id != id);
        self.rows.len() != before
    }

    /// Normalizes every `item_string` back into the item menu, resets any
    /// assigned item that fell outside its new menu to the first entry (or
    /// empty), and persists the whole snapshot in one call.
    pub async fn save_all(self, store: &dyn MachineStore) -> Result<Vec<Machine>, StoreError> {
        let snapshot: Vec<Machine> = self
            .rows
            .into_iter()
            .map(|row| {
                let mut machine = row.machine;
                let items = parse_item_list(&row.item_string);
                if !items.iter().any(|i| *i == machine.item_name) {
                    machine.item_name = items.first().cloned().unwrap_or_default();
                }
                machine.possible_items = items;
                machine
            })
            .collect();
        store.save_all_machines(snapshot).await
    }
}

#[cfg(test)]
#[path = "tests/sheet_tests.rs"]
mod tests;
