//! Quill Edit Session
//!
//! The live editing surface over one respondent's questionnaire: a visible
//! definition/record snapshot pair and at most one pending structural edit.
//! Aggregates are copy-on-write values, so snapshots are cheap and a cancel
//! is a pointer swap back to the exact pre-edit state.
//!
//! # Core Concepts
//!
//! - [`EditSession`]: the Idle/Pending state machine; `start` splices an
//!   edit-form into the visible pair, `apply` rebinds from the pre-edit
//!   snapshot and commits, `cancel` restores the snapshot untouched
//! - [`EditOutcome`]: delivered exactly once per edit on a oneshot channel,
//!   tagged applied or canceled
//! - [`ResolvedTarget`]: locator indices resolved to live names, falling
//!   back progressively so callers never hold a dangling reference
//!
//! # Example
//!
//! ```rust,ignore
//! let mut session = EditSession::new(definition, record);
//! let outcome = session.start(CommandSpec::UpdateField { name })?;
//! if session.can_apply(&answers)? {
//!     let target = session.apply(&answers)?;
//! }
//! assert_eq!(outcome.await?, EditOutcome::Applied { target });
//! ```

mod error;
mod pending;
mod resolver;
mod session;

pub use error::SessionError;
pub use resolver::{resolve, ResolvedTarget};
pub use session::{EditOutcome, EditSession, SessionStatus};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
