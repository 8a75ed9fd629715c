//! Quill Edit-Forms
//!
//! Structural edits answered as questionnaires. Every mutation of a
//! questionnaire definition is driven by an ephemeral edit-form: a reserved
//! page of part fields spliced into the definition itself, answered through
//! the ordinary data-binding pipeline, validated by reserved-named cross
//! rules, and bound back into the edited entity.
//!
//! # Core Concepts
//!
//! - [`parts`]: the reserved `@` part vocabulary (only mintable here, never
//!   parseable from operator input)
//! - [`Parts`]: an assembled form (page, group, rules, defaults)
//! - [`FormBuilder`]: builds the form for each operation family, defaults
//!   mirroring the edited entity's current state
//! - [`FormBinder`]: rebuilds the final entity from the merged answers via
//!   the model builders, rule families all-or-nothing
//!
//! # Example
//!
//! ```rust,ignore
//! let parts = FormBuilder::field_form(&definition, Some(&field))?;
//! parts.splice_into(&mut definition_draft, &mut record_draft);
//! // ... operator answers arrive through the ordinary pipeline ...
//! let rebuilt = FormBinder::bind_field(&answers, field.section.clone())?;
//! ```

mod binder;
mod builder;
mod error;
pub mod parts;

pub use binder::FormBinder;
pub use builder::FormBuilder;
pub use error::FormError;
pub use parts::Parts;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
