//! The four-operation mutation contract
//!
//! Every structural edit implements the same lifecycle: `start` splices the
//! edit-form into drafts of the pre-edit snapshot, `check`/`can_apply`
//! validate the operator's answers against the form's rules, `apply`
//! performs the edit against fresh drafts of the same snapshot, `cancel` is
//! a cleanup hook. Commands never touch the caller's aggregates directly;
//! the session owns snapshotting and freezing.

use crate::error::CommandError;
use crate::locator::TargetLocator;
use quill_forms::Parts;
use quill_model::{
    rules, AnswerSet, Definition, DefinitionDraft, GroupCode, PageName, Record, RecordDraft,
    RuleTrigger, RuleViolation, VariableName,
};

/// One structural edit, driven by an ephemeral edit-form
///
/// The session calls `start` exactly once, then any number of
/// `check`/`can_apply` rounds, then exactly one of `apply` or `cancel`.
/// `apply` receives drafts derived from the pre-edit snapshot, never from
/// the parts-augmented visible state.
pub trait EditCommand: std::fmt::Debug + Send {
    /// Splice the edit-form and capture what `apply` will need
    ///
    /// # Errors
    /// Fails when the addressed entity does not exist.
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError>;

    /// Violations of the form's rules against the merged answers
    fn check(&self, definition: &Definition, answers: &AnswerSet) -> Vec<RuleViolation>;

    /// Whether `apply` may proceed
    ///
    /// A `false` is the expected "not ready yet" signal, not an error.
    fn can_apply(&self, definition: &Definition, answers: &AnswerSet) -> bool {
        self.check(definition, answers).is_empty()
    }

    /// Perform the edit
    ///
    /// # Errors
    /// Fails when binding the answers or a draft mutation rejects them.
    fn apply(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
        answers: &AnswerSet,
    ) -> Result<(), CommandError>;

    /// Cleanup hook; the session restores the snapshots itself
    fn cancel(&mut self) {}

    /// Where the edit points after `apply` or `cancel`
    fn locator(&self) -> TargetLocator;
}

/// Operator answers merged over the form defaults
pub(crate) fn merged(parts: &Parts, answers: &AnswerSet) -> AnswerSet {
    answers.merged_over(&parts.defaults)
}

/// Evaluate a started form's rules; an unstarted command has nothing to
/// violate
pub(crate) fn violations(
    parts: Option<&Parts>,
    definition: &Definition,
    answers: &AnswerSet,
) -> Vec<RuleViolation> {
    match parts {
        Some(parts) => rules::evaluate(
            &parts.rules,
            RuleTrigger::OnApply,
            &merged(parts, answers),
            definition,
        ),
        None => Vec::new(),
    }
}

/// Locator for a page: its own index, its group's, and that group's
/// interview
pub(crate) fn locate_page(
    definition: &Definition,
    record: &Record,
    page: &PageName,
) -> TargetLocator {
    let group = definition.group_of_page(page);
    TargetLocator {
        interview: group.and_then(|g| record.interview_index(&g.code)),
        group: group.and_then(|g| definition.group_index(&g.code)),
        page: definition.page_index(page),
        field: None,
    }
}

/// Locator for a field by its flat position in a page (`None` field when
/// deleted)
pub(crate) fn locate_field(
    definition: &Definition,
    record: &Record,
    page: &PageName,
    field: Option<&VariableName>,
) -> TargetLocator {
    let mut locator = locate_page(definition, record, page);
    locator.field = field.and_then(|name| {
        definition
            .flat_fields(page)
            .ok()?
            .iter()
            .position(|slot| slot.field.name == *name)
    });
    locator
}

/// Locator for a group and its interview
pub(crate) fn locate_group(
    definition: &Definition,
    record: &Record,
    code: &GroupCode,
) -> TargetLocator {
    TargetLocator {
        interview: record.interview_index(code),
        group: definition.group_index(code),
        page: None,
        field: None,
    }
}
