use thiserror::Error;

pub mod detail;
pub mod manage;
pub mod sheet;
pub mod view;

pub use detail::DetailEditor;
pub use manage::ManageEditor;
pub use sheet::{SheetEditor, SheetRow};

/// Rejected editor input. Invalid entry never silently becomes a default
/// value; the caller re-prompts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("item '{0}' is not one of this machine's producible items")]
    UnknownItem(String),

    #[error("invalid quantity '{0}': expected a non-negative integer")]
    InvalidNumber(String),
}
