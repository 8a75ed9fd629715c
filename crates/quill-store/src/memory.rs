//! In-memory driver
//!
//! Development and test driver backing both aggregate stores with
//! concurrent maps. Identity keys are minted on first save and stay stable
//! for the life of the process.

use crate::driver::{DefinitionStore, IdentityKeys, RecordStore};
use crate::error::StoreError;
use dashmap::DashMap;
use quill_model::{Definition, Record};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// A record together with its server-assigned keys
#[derive(Debug)]
struct StoredRecord {
    record: Record,
    key: Uuid,
    interview_keys: Vec<Uuid>,
}

impl StoredRecord {
    fn new(record: Record) -> Self {
        Self {
            record,
            key: Uuid::new_v4(),
            interview_keys: Vec::new(),
        }
    }

    /// Interview keys are positional; a shrunk record retires trailing keys
    /// and later saves mint fresh ones for the new positions.
    fn align_interview_keys(&mut self) {
        self.interview_keys.truncate(self.record.interviews.len());
        while self.interview_keys.len() < self.record.interviews.len() {
            self.interview_keys.push(Uuid::new_v4());
        }
    }
}

/// Map-backed implementation of both driver traits
#[derive(Debug)]
pub struct MemoryStore {
    definitions: DashMap<String, Definition>,
    records: DashMap<String, StoredRecord>,
    nonces: AtomicU64,
}

impl MemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: DashMap::new(),
            records: DashMap::new(),
            nonces: AtomicU64::new(0),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DefinitionStore for MemoryStore {
    async fn save(&self, definition: &Definition) -> Result<(), StoreError> {
        tracing::debug!(
            name = %definition.name,
            version = definition.version,
            "definition saved"
        );
        self.definitions
            .insert(definition.name.clone(), definition.clone());
        Ok(())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Definition>, StoreError> {
        Ok(self.definitions.get(name).map(|entry| entry.value().clone()))
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn save(
        &self,
        record: &Record,
        interview: Option<usize>,
    ) -> Result<IdentityKeys, StoreError> {
        let mut entry = self
            .records
            .entry(record.code.clone())
            .or_insert_with(|| StoredRecord::new(record.clone()));
        let stored = entry.value_mut();
        // The stored nonce is authoritative once assigned; callers keep
        // whatever copy they started from.
        let nonce = if stored.record.nonce == 0 {
            self.nonces.fetch_add(1, Ordering::Relaxed) + 1
        } else {
            stored.record.nonce
        };
        stored.record = record.clone();
        stored.record.nonce = nonce;
        stored.align_interview_keys();
        tracing::debug!(
            code = %record.code,
            nonce,
            interviews = record.interviews.len(),
            "record saved"
        );
        Ok(IdentityKeys {
            record: stored.key,
            interview: interview.and_then(|at| stored.interview_keys.get(at).copied()),
        })
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.records.get(code).map(|entry| entry.value().record.clone()))
    }
}
