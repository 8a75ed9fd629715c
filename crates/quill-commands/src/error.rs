//! Command errors

use quill_forms::FormError;
use quill_model::ModelError;

/// Error starting or applying a mutation command
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// `check` or `apply` was called before `start` spliced the form
    #[error("command not started")]
    NotStarted,

    /// A consecutive-field range runs into a page include
    #[error("field range crosses a page include at item {0}")]
    RangeCrossesInclude(usize),

    /// The domain model rejected a mutation
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The edit-form could not be built or bound
    #[error(transparent)]
    Form(#[from] FormError),
}
