//! Quill Questionnaire Model
//!
//! Immutable questionnaire aggregates with copy-on-write drafts.
//!
//! # Core Concepts
//!
//! - [`Definition`]: versioned questionnaire structure (pages, groups,
//!   workflows, cross rules)
//! - [`Record`]: a respondent's versioned answers, grouped into interviews
//! - [`DefinitionDraft`] / [`RecordDraft`]: copy-on-write mutable views;
//!   `freeze()` validates and bumps the version
//! - [`rules::evaluate`]: the generic rule engine shared by questionnaires
//!   and edit-forms
//! - Builders ([`DefinitionBuilder`], [`FieldBuilder`], ...): the validated
//!   construction DSL
//!
//! # Example
//!
//! ```rust,ignore
//! let definition = DefinitionBuilder::new("intake")
//!     .language(LanguageCode::parse("en")?)
//!     .page(PageBuilder::new("visit")
//!         .title(Text::with(en, "Visit"))
//!         .field(FieldBuilder::new("weight")
//!             .kind(FieldKind::Number)
//!             .wording(Text::with(en, "Weight"))
//!             .build()?)
//!         .build()?)
//!     .build()?;
//! ```

pub mod build;
pub mod definition;
pub mod draft;
pub mod error;
pub mod field;
pub mod group;
pub mod language;
pub mod name;
pub mod page;
pub mod record;
pub mod rules;
pub mod value;
pub mod workflow;

pub use build::{DefinitionBuilder, FieldBuilder, GroupBuilder, PageBuilder, WorkflowBuilder};
pub use definition::{Definition, FieldSlot};
pub use draft::{DefinitionDraft, RecordDraft};
pub use error::ModelError;
pub use field::{
    pad_cyclic, Condition, DateFormat, DefaultSource, Field, FieldKind, FieldRule, FieldShape,
    LetterCase, RangeBound,
};
pub use group::PageGroup;
pub use language::{LanguageCode, Text};
pub use name::{GroupCode, PageName, SectionName, VariableName, WorkflowName};
pub use page::{Page, PageItem};
pub use record::{Interview, Record};
pub use rules::{CrossRule, RuleKind, RuleTrigger, RuleViolation, UniqueTarget};
pub use value::{AnswerSet, Value};
pub use workflow::Workflow;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
