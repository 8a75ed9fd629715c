//! Persistence driver traits
//!
//! Drivers persist the two aggregates and hand out server-assigned identity
//! keys. Deletes are deliberately absent from the driver surface: removing a
//! field, page, group or workflow is a structural edit and travels through
//! the command protocol, never through a driver call.

use crate::error::StoreError;
use quill_model::{Definition, Record};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-assigned keys returned by a record save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityKeys {
    /// Key of the saved record
    pub record: Uuid,
    /// Key of the saved interview, when one was addressed
    pub interview: Option<Uuid>,
}

/// Driver for questionnaire definitions, keyed by name
#[async_trait::async_trait]
pub trait DefinitionStore: Send + Sync {
    /// Persist a definition under its name
    ///
    /// # Errors
    ///
    /// Returns a backend failure when the definition cannot be written.
    async fn save(&self, definition: &Definition) -> Result<(), StoreError>;

    /// Fetch a definition by name
    ///
    /// # Errors
    ///
    /// Returns a backend failure when the lookup cannot be served.
    async fn get_by_name(&self, name: &str) -> Result<Option<Definition>, StoreError>;

    /// Always refused; structural deletes are commands.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::DeleteUnsupported`].
    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let _ = name;
        Err(StoreError::DeleteUnsupported)
    }
}

/// Driver for respondent records, keyed by participant code
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a record and return its identity keys
    ///
    /// `interview` addresses the interview touched by the edit; its key is
    /// echoed back in [`IdentityKeys`] when the position exists.
    ///
    /// # Errors
    ///
    /// Returns a backend failure when the record cannot be written.
    async fn save(
        &self,
        record: &Record,
        interview: Option<usize>,
    ) -> Result<IdentityKeys, StoreError>;

    /// Fetch a record by participant code
    ///
    /// # Errors
    ///
    /// Returns a backend failure when the lookup cannot be served.
    async fn get_by_code(&self, code: &str) -> Result<Option<Record>, StoreError>;

    /// Always refused; structural deletes are commands.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::DeleteUnsupported`].
    async fn delete(&self, code: &str) -> Result<(), StoreError> {
        let _ = code;
        Err(StoreError::DeleteUnsupported)
    }
}
