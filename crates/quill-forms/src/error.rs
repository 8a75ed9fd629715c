//! Edit-form errors

use quill_model::ModelError;

/// Error building a form or binding its answers
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    /// A part the binder needs has no usable answer
    #[error("missing edit-form part: {0}")]
    MissingPart(String),

    /// A part's answer cannot be interpreted
    #[error("unusable answer for part {part}: {detail}")]
    BadPart {
        /// Part name
        part: String,
        /// What went wrong
        detail: String,
    },

    /// The rebuilt entity failed domain validation
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl FormError {
    pub(crate) fn missing(part: &quill_model::VariableName) -> Self {
        Self::MissingPart(part.as_str().to_string())
    }

    pub(crate) fn bad(part: &quill_model::VariableName, detail: impl Into<String>) -> Self {
        Self::BadPart {
            part: part.as_str().to_string(),
            detail: detail.into(),
        }
    }
}
