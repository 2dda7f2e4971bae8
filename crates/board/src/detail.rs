use shared::{
    domain::{Machine, MachineStatus},
    error::StoreError,
};
use store::MachineStore;

use crate::EditError;

/// Draft editor for one machine: status, assigned item, and counts. All
/// mutations stay local until `save` writes the whole draft back through
/// the store.
pub struct DetailEditor {
    draft: Machine,
}

impl DetailEditor {
    pub fn new(machine: Machine) -> Self {
        Self { draft: machine }
    }

    pub fn draft(&self) -> &Machine {
        &self.draft
    }

    pub fn set_status(&mut self, status: MachineStatus) {
        self.draft.status = status;
    }

    /// Closed-set choice when the machine has a producible-item menu, free
    /// text otherwise.
    pub fn set_item(&mut self, item: &str) -> Result<(), EditError> {
        if !self.draft.possible_items.is_empty()
            && !self.draft.possible_items.iter().any(|i| i == item)
        {
            return Err(EditError::UnknownItem(item.to_string()));
        }
        self.draft.item_name = item.to_string();
        Ok(())
    }

    /// Nudges the count by a signed delta, saturating at zero.
    pub fn adjust_count(&mut self, delta: i32) {
        self.draft.count = if delta >= 0 {
            self.draft.count.saturating_add(delta as u32)
        } else {
            self.draft.count.saturating_sub(delta.unsigned_abs())
        };
    }

    pub fn set_count_text(&mut self, text: &str) -> Result<(), EditError> {
        self.draft.count = parse_quantity(text)?;
        Ok(())
    }

    pub fn set_target_text(&mut self, text: &str) -> Result<(), EditError> {
        self.draft.target = parse_quantity(text)?;
        Ok(())
    }

    /// Writes the whole draft back via `update_machine`.
    pub async fn save(self, store: &dyn MachineStore) -> Result<Machine, StoreError> {
        store.update_machine(self.draft).await
    }
}

// Strict numeric entry; negative or non-numeric text is an error.
fn parse_quantity(text: &str) -> Result<u32, EditError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| EditError::InvalidNumber(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{MachineDraft, MachineId};

    fn press() -> Machine {
        MachineDraft {
            name: "Press-01".to_string(),
            status: MachineStatus::Running,
            item_name: "Bracket-A".to_string(),
            possible_items: vec!["Bracket-A".to_string(), "Bracket-B".to_string()],
            count: 1250,
            target: 2000,
            ..MachineDraft::default()
        }
        .into_machine(MachineId(1))
    }

    #[test]
    fn item_choice_is_closed_when_menu_exists() {
        let mut editor = DetailEditor::new(press());

        editor.set_item("Bracket-B").expect("menu item");
        assert_eq!(editor.draft().item_name, "Bracket-B");

        let err = editor.set_item("Gear-Z").expect_err("off-menu item");
        assert_eq!(err, EditError::UnknownItem("Gear-Z".to_string()));
        assert_eq!(editor.draft().item_name, "Bracket-B");
    }

    #[test]
    fn item_is_free_text_without_a_menu() {
        let mut machine = press();
        machine.possible_items.clear();
        let mut editor = DetailEditor::new(machine);

        editor.set_item("One-Off-Part").expect("free text");
        assert_eq!(editor.draft().item_name, "One-Off-Part");
    }

    #[test]
    fn count_nudges_saturate_at_zero() {
        let mut editor = DetailEditor::new(press());

        editor.adjust_count(10);
        assert_eq!(editor.draft().count, 1260);

        editor.adjust_count(-10_000);
        assert_eq!(editor.draft().count, 0);

        editor.adjust_count(-10);
        assert_eq!(editor.draft().count, 0);
    }

    #[test]
    fn typed_quantities_are_validated() {
        let mut editor = DetailEditor::new(press());

        editor.set_count_text(" 300 ").expect("numeric");
        assert_eq!(editor.draft().count, 300);

        let err = editor.set_count_text("lots").expect_err("non-numeric");
        assert_eq!(err, EditError::InvalidNumber("lots".to_string()));
        assert_eq!(editor.draft().count, 300);

        let err = editor.set_target_text("-5").expect_err("negative");
        assert_eq!(err, EditError::InvalidNumber("-5".to_string()));
    }
}
