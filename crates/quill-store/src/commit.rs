//! Nonce-driven commit helper

use crate::driver::{DefinitionStore, IdentityKeys, RecordStore};
use crate::error::StoreError;
use quill_model::{Definition, Record};

/// Persist both aggregates after an applied edit
///
/// A record that still needs identity keys cannot reference a definition
/// the server has never seen, so the commit runs as two ordered phases:
/// definition first, then record. Established records save both aggregates
/// concurrently.
///
/// # Errors
///
/// Propagates the first driver failure. In the two-phase case the record is
/// never saved after a failed definition save.
pub async fn commit_edit<D, R>(
    definitions: &D,
    records: &R,
    definition: &Definition,
    record: &Record,
    interview: Option<usize>,
) -> Result<IdentityKeys, StoreError>
where
    D: DefinitionStore + ?Sized,
    R: RecordStore + ?Sized,
{
    tracing::debug!(
        name = %definition.name,
        code = %record.code,
        two_phase = record.needs_identity(),
        "committing edit"
    );
    if record.needs_identity() {
        definitions.save(definition).await?;
        records.save(record, interview).await
    } else {
        let (saved, keys) = tokio::join!(
            definitions.save(definition),
            records.save(record, interview)
        );
        saved?;
        keys
    }
}
