//! Quill Persistence Drivers
//!
//! Driver interfaces for the two aggregates and an in-memory implementation.
//! The session core never touches persistence; a caller commits an applied
//! edit through [`commit_edit`], which orders the saves only when the record
//! still needs server-assigned identity keys.
//!
//! # Core Concepts
//!
//! - [`DefinitionStore`] / [`RecordStore`]: async driver traits; both refuse
//!   `delete`, since structural deletes travel through the command protocol
//! - [`IdentityKeys`]: server-assigned keys echoed back by a record save
//! - [`MemoryStore`]: map-backed driver for development and tests
//!
//! # Example
//!
//! ```rust,ignore
//! let store = MemoryStore::new();
//! let keys = commit_edit(&store, &store, &definition, &record, Some(0)).await?;
//! assert!(keys.interview.is_some());
//! ```

#![recursion_limit = "256"]

mod commit;
mod driver;
mod error;
mod memory;

pub use commit::commit_edit;
pub use driver::{DefinitionStore, IdentityKeys, RecordStore};
pub use error::StoreError;
pub use memory::MemoryStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
