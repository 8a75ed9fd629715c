//! Session protocol errors

use quill_commands::CommandError;
use quill_model::ModelError;

/// Protocol misuse and edit failures surfaced by the session
///
/// Protocol variants mark caller bugs: the session refuses the call
/// synchronously and changes nothing. The wrapped variants carry a failed
/// start or apply through.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// `start` while an edit is already pending
    #[error("an edit is already pending")]
    AlreadyPending,

    /// `apply`, `cancel` or a check while idle
    #[error("no edit is pending")]
    NotPending,

    /// `state_for` while an edit is pending
    #[error("state is unavailable while an edit is pending")]
    StateUnavailable,

    /// `apply` after a previous attempt already failed
    #[error("a failed apply left this edit unrecoverable; cancel it")]
    ApplyFailed,

    /// The command could not start or apply
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Freezing a draft violated an aggregate invariant
    #[error(transparent)]
    Model(#[from] ModelError),
}
