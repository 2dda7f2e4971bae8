use shared::{
    domain::{Machine, MachineDraft, MachineId},
    error::StoreError,
};
use store::MachineStore;

/// Add/edit form state for the management list. Submitting creates a new
/// machine, or updates the one being edited, then resets the form to its
/// defaults. The form keeps its contents when a save fails.
#[derive(Default)]
pub struct ManageEditor {
    form: MachineDraft,
    editing: Option<MachineId>,
}

impl ManageEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &MachineDraft {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut MachineDraft {
        &mut self.form
    }

    pub fn editing(&self) -> Option<MachineId> {
        self.editing
    }

    /// Loads an existing record into the form.
    pub fn begin_edit(&mut self, machine: &Machine) {
        self.editing = Some(machine.id);
        self.form = MachineDraft::from(machine.clone());
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.form = MachineDraft::default();
    }

    pub async fn submit(&mut self, store: &dyn MachineStore) -> Result<Machine, StoreError> {
        let stored = match self.editing {
            Some(id) => {
                store
                    .update_machine(self.form.clone().into_machine(id))
                    .await?
            }
            None => store.create_machine(self.form.clone()).await?,
        };
        self.editing = None;
        self.form = MachineDraft::default();
        Ok(stored)
    }

    /// Deletion is destructive; callers confirm with the operator before
    /// invoking.
    pub async fn delete(
        store: &dyn MachineStore,
        id: MachineId,
    ) -> Result<MachineId, StoreError> {
        store.delete_machine(id).await
    }
}
