use async_trait::async_trait;
use shared::{
    domain::{Machine, MachineDraft, MachineId},
    error::StoreError,
};

pub mod defaults;
mod local;
mod remote;
pub mod settings;

pub use local::LocalStore;
pub use remote::RemoteStore;

/// Storage contract for the machine list. Both backends satisfy the same
/// semantics; callers hold a `&dyn MachineStore` and never learn which one
/// they are talking to.
#[async_trait]
pub trait MachineStore: Send + Sync {
    /// Returns every machine. An empty backing store is seeded with the
    /// fixed default set first, so a second call returns the same records.
    async fn get_machines(&self) -> Result<Vec<Machine>, StoreError>;

    /// Assigns a fresh time-derived id, persists the draft, and returns the
    /// stored record.
    async fn create_machine(&self, draft: MachineDraft) -> Result<Machine, StoreError>;

    /// Replaces the record with the same id. A missing id is a silent no-op
    /// treated as success.
    async fn update_machine(&self, machine: Machine) -> Result<Machine, StoreError>;

    /// Removes the record with that id; no-op if absent.
    async fn delete_machine(&self, id: MachineId) -> Result<MachineId, StoreError>;

    /// Replaces the entire record set with the given sequence. Records
    /// absent from the sequence are gone afterwards.
    async fn save_all_machines(&self, machines: Vec<Machine>) -> Result<Vec<Machine>, StoreError>;
}
