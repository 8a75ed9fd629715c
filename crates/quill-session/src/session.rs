//! The edit-session state machine
//!
//! One session per respondent. The session owns the visible snapshot pair
//! and at most one Pending Edit Context; partially-applied states are never
//! observable outside that context.

use crate::error::SessionError;
use crate::pending::PendingEdit;
use crate::resolver::{self, ResolvedTarget};
use quill_commands::{CommandSpec, TargetLocator};
use quill_model::{AnswerSet, Definition, DefinitionDraft, Record, RecordDraft, RuleViolation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Where the session sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No edit in flight
    Idle,
    /// An edit-form is spliced in and awaiting answers
    Pending,
    /// An `apply` failed; the edit is still pending and only `cancel`
    /// settles it
    ApplyFailed,
}

/// Terminal result of one edit, delivered on the outcome channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    /// The answers were bound and committed
    Applied {
        /// Where the edit landed
        target: ResolvedTarget,
    },
    /// The edit was abandoned and the snapshots restored
    Canceled {
        /// Target resolved against the restored state
        target: ResolvedTarget,
    },
}

/// One respondent's live editing surface over a definition/record pair
#[derive(Debug)]
pub struct EditSession {
    definition: Arc<Definition>,
    record: Arc<Record>,
    target: ResolvedTarget,
    pending: Option<PendingEdit>,
}

impl EditSession {
    /// Open a session over a frozen aggregate pair
    #[must_use]
    pub fn new(definition: Arc<Definition>, record: Arc<Record>) -> Self {
        let target = resolver::resolve(&definition, &record, &TargetLocator::detached());
        Self {
            definition,
            record,
            target,
            pending: None,
        }
    }

    /// Lifecycle position
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match &self.pending {
            None => SessionStatus::Idle,
            Some(pending) if pending.failed => SessionStatus::ApplyFailed,
            Some(_) => SessionStatus::Pending,
        }
    }

    /// Visible definition; parts-augmented while an edit is pending
    #[must_use]
    pub fn definition(&self) -> &Arc<Definition> {
        &self.definition
    }

    /// Visible record; carries the edit interview while pending
    #[must_use]
    pub fn record(&self) -> &Arc<Record> {
        &self.record
    }

    /// Target of the last settled edit
    #[must_use]
    pub fn target(&self) -> &ResolvedTarget {
        &self.target
    }

    /// Begin an edit: splice its form in and hand back the outcome channel
    ///
    /// The parts-augmented pair becomes the visible state immediately.
    /// Exactly one [`EditOutcome`] will ever be delivered on the returned
    /// receiver.
    ///
    /// # Errors
    /// [`SessionError::AlreadyPending`] while an edit is in flight, raised
    /// before anything is touched. Command and freeze failures leave the
    /// session idle with the visible state unchanged.
    pub fn start(
        &mut self,
        spec: CommandSpec,
    ) -> Result<oneshot::Receiver<EditOutcome>, SessionError> {
        if self.pending.is_some() {
            return Err(SessionError::AlreadyPending);
        }

        let mut command = spec.build();
        let mut definition = DefinitionDraft::new(&self.definition);
        let mut record = RecordDraft::new(&self.record);
        command.start(&mut definition, &mut record)?;
        let definition = definition.freeze()?;
        let record = record.freeze(&definition)?;

        let (sender, receiver) = oneshot::channel();
        self.pending = Some(PendingEdit {
            definition: Arc::clone(&self.definition),
            record: Arc::clone(&self.record),
            command,
            outcome: sender,
            failed: false,
        });
        self.definition = Arc::new(definition);
        self.record = Arc::new(record);
        tracing::debug!("edit started");
        Ok(receiver)
    }

    /// Evaluate the pending form's rules over candidate answers
    ///
    /// # Errors
    /// [`SessionError::NotPending`] while idle.
    pub fn violations(&self, answers: &AnswerSet) -> Result<Vec<RuleViolation>, SessionError> {
        let pending = self.pending.as_ref().ok_or(SessionError::NotPending)?;
        Ok(pending.command.check(&self.definition, answers))
    }

    /// Whether `apply` would accept these answers
    ///
    /// `false` is the expected "not ready yet" signal, not an error.
    ///
    /// # Errors
    /// [`SessionError::NotPending`] while idle.
    pub fn can_apply(&self, answers: &AnswerSet) -> Result<bool, SessionError> {
        let pending = self.pending.as_ref().ok_or(SessionError::NotPending)?;
        Ok(pending.command.can_apply(&self.definition, answers))
    }

    /// Bind the answers and commit the edit as the visible state
    ///
    /// Drafts are re-derived from the pre-edit snapshot, never from the
    /// visible parts-augmented pair. On success the outcome channel fires
    /// [`EditOutcome::Applied`] and the session returns to idle. On failure
    /// the error returns synchronously, the channel stays un-fired, and the
    /// session remains pending with [`SessionStatus::ApplyFailed`]; only
    /// [`cancel`](Self::cancel) settles the edit then.
    ///
    /// # Errors
    /// [`SessionError::NotPending`] while idle,
    /// [`SessionError::ApplyFailed`] once a previous attempt failed, and
    /// command and freeze failures as described above.
    pub fn apply(&mut self, answers: &AnswerSet) -> Result<ResolvedTarget, SessionError> {
        let Some(pending) = self.pending.as_mut() else {
            return Err(SessionError::NotPending);
        };
        if pending.failed {
            return Err(SessionError::ApplyFailed);
        }

        let (definition, record) = match rebind(pending, answers) {
            Ok(frozen) => frozen,
            Err(error) => {
                pending.failed = true;
                tracing::warn!(error = %error, "apply failed; session stays pending");
                return Err(error);
            }
        };
        let locator = pending.command.locator();

        self.definition = Arc::new(definition);
        self.record = Arc::new(record);
        self.target = resolver::resolve(&self.definition, &self.record, &locator);
        if let Some(context) = self.pending.take() {
            let _ = context.outcome.send(EditOutcome::Applied {
                target: self.target.clone(),
            });
        }
        tracing::debug!(resolved = ?self.target, "edit applied");
        Ok(self.target.clone())
    }

    /// Abandon the pending edit and restore the pre-edit snapshots
    ///
    /// Both aggregates come back reference-identical to their pre-`start`
    /// values and the outcome channel fires [`EditOutcome::Canceled`].
    ///
    /// # Errors
    /// [`SessionError::NotPending`] while idle.
    pub fn cancel(&mut self) -> Result<ResolvedTarget, SessionError> {
        let Some(context) = self.pending.take() else {
            return Err(SessionError::NotPending);
        };

        let locator = context.command.locator();
        self.definition = context.definition;
        self.record = context.record;
        self.target = resolver::resolve(&self.definition, &self.record, &locator);
        let _ = context.outcome.send(EditOutcome::Canceled {
            target: self.target.clone(),
        });
        tracing::debug!(resolved = ?self.target, "edit canceled");
        Ok(self.target.clone())
    }

    /// Recompute the target for one interview, the re-entry point for a
    /// caller returning to a respondent
    ///
    /// # Errors
    /// [`SessionError::StateUnavailable`] while an edit is pending.
    pub fn state_for(&mut self, interview: usize) -> Result<ResolvedTarget, SessionError> {
        if self.pending.is_some() {
            return Err(SessionError::StateUnavailable);
        }
        let locator = TargetLocator {
            interview: Some(interview),
            ..TargetLocator::default()
        };
        self.target = resolver::resolve(&self.definition, &self.record, &locator);
        Ok(self.target.clone())
    }
}

/// Run the pending command against fresh drafts of the pre-edit snapshot
fn rebind(
    pending: &mut PendingEdit,
    answers: &AnswerSet,
) -> Result<(Definition, Record), SessionError> {
    let mut definition = DefinitionDraft::new(&pending.definition);
    let mut record = RecordDraft::new(&pending.record);
    pending.command.apply(&mut definition, &mut record, answers)?;
    let definition = definition.freeze()?;
    let record = record.freeze(&definition)?;
    Ok((definition, record))
}
