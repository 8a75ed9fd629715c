//! Pending Edit Context: everything held while one edit is in flight

use crate::session::EditOutcome;
use quill_commands::EditCommand;
use quill_model::{Definition, Record};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Snapshot pair, live command, and single-shot outcome slot
///
/// The snapshots are the pre-edit aggregates: `apply` re-derives its drafts
/// from them, and `cancel` hands the very same `Arc`s back.
#[derive(Debug)]
pub(crate) struct PendingEdit {
    /// Definition as it was before `start`
    pub(crate) definition: Arc<Definition>,
    /// Record as it was before `start`
    pub(crate) record: Arc<Record>,
    /// The command driving this edit
    pub(crate) command: Box<dyn EditCommand>,
    /// Fired exactly once, on apply or cancel
    pub(crate) outcome: oneshot::Sender<EditOutcome>,
    /// Set by a failed `apply`; only `cancel` clears the edit afterwards
    pub(crate) failed: bool,
}
