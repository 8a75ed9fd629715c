//! Error types for the questionnaire domain model
//!
//! Covers name grammar violations, aggregate invariant breaches, lookup
//! failures, and builder misuse.

use crate::name::{GroupCode, PageName, VariableName, WorkflowName};

/// Domain model error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// A name, code or specifier failed the identifier grammar
    #[error("invalid name {0:?}: expected letter followed by letters, digits or underscores")]
    InvalidName(String),

    /// A language code failed the tag grammar
    #[error("invalid language code {0:?}")]
    InvalidLanguage(String),

    /// Duplicate field variable name within a definition
    #[error("duplicate field name: {0}")]
    DuplicateField(VariableName),

    /// Duplicate page name within a definition
    #[error("duplicate page name: {0}")]
    DuplicatePage(PageName),

    /// Duplicate page-group code within a definition
    #[error("duplicate page-group code: {0}")]
    DuplicateGroup(GroupCode),

    /// Duplicate workflow name+specifier pair within a definition
    #[error("duplicate workflow: {name} ({specifier})")]
    DuplicateWorkflow {
        name: WorkflowName,
        specifier: String,
    },

    /// A page include points at a page that does not exist
    #[error("include of unknown page: {0}")]
    UnknownInclude(PageName),

    /// Lookup by name/code/index found nothing
    #[error("no such field: {0}")]
    NoSuchField(VariableName),

    /// Lookup by page name found nothing
    #[error("no such page: {0}")]
    NoSuchPage(PageName),

    /// Lookup by group code found nothing
    #[error("no such page-group: {0}")]
    NoSuchGroup(GroupCode),

    /// Lookup by workflow name found nothing
    #[error("no such workflow: {0}")]
    NoSuchWorkflow(WorkflowName),

    /// An index into an ordered collection was out of range
    #[error("index {index} out of range for {collection} of length {len}")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    /// Contextual instance lists must have equal, non-zero length
    #[error("contextual field needs at least one instance")]
    EmptyContext,

    /// A builder was finished before a mandatory piece was supplied
    #[error("incomplete builder: missing {0}")]
    Incomplete(&'static str),

    /// A scale's bounds are inverted
    #[error("scale minimum {min} exceeds maximum {max}")]
    InvertedScale { min: i64, max: i64 },

    /// A choice field was built without options
    #[error("choice field needs at least one option")]
    EmptyChoice,

    /// An answer references a field absent from the definition
    #[error("answer for unknown field: {0}")]
    OrphanAnswer(VariableName),

    /// An interview references a group absent from the definition
    #[error("interview for unknown page-group: {0}")]
    OrphanInterview(GroupCode),
}
