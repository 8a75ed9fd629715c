//! Quill Edit Commands
//!
//! The structural mutation vocabulary of a questionnaire: sixteen commands
//! covering insert, update, delete, and reorder across fields, pages, page
//! groups, and workflows. Each command runs a uniform lifecycle against
//! draft copies of the definition and record: `start` splices its edit-form
//! in, `check` evaluates the form's rules over candidate answers, `apply`
//! binds the answers into the real structure and cascades every secondary
//! effect, and `locator` reports where the edit landed.
//!
//! # Core Concepts
//!
//! - [`CommandSpec`]: the serializable request form of an edit, built into a
//!   live command with [`CommandSpec::build`]
//! - [`EditCommand`]: the lifecycle every command implements; commands are
//!   driven by an edit-session, never applied directly to a frozen snapshot
//! - [`TargetLocator`]: positional result of an apply, resolvable against
//!   the post-edit snapshot
//! - Cascades: renames re-key every reference (rule scopes, answers,
//!   includes, group pages, workflow steps, derivation links); deletes
//!   remove the references instead
//!
//! # Example
//!
//! ```rust,ignore
//! let mut command = CommandSpec::UpdateField { name }.build();
//! command.start(&mut definition_draft, &mut record_draft)?;
//! // ... the operator fills the spliced form ...
//! if command.can_apply(&visible_definition, &answers) {
//!     command.apply(&mut definition_draft, &mut record_draft, &answers)?;
//! }
//! ```

mod command;
mod error;
mod field;
mod group;
mod locator;
mod page;
mod spec;
mod workflow;

#[cfg(test)]
mod fixtures;

pub use command::EditCommand;
pub use error::CommandError;
pub use locator::TargetLocator;
pub use spec::CommandSpec;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
