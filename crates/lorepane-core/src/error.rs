//! Error types for the display pipeline.

use thiserror::Error;

/// Errors surfaced by the panel API.
///
/// Most panel operations cannot fail: empty inputs are no-ops, scroll
/// requests are clamped and dropped renders are not errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PanelError {
    /// A batch transaction was used after it was committed or discarded.
    #[error("batch transaction already released")]
    TransactionReleased,

    /// The UI inbox receiver was dropped; paint work can no longer be delivered.
    #[error("UI context closed")]
    UiContextClosed,
}
