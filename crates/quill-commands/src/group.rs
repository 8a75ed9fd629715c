//! Page-group commands: insert, update, delete, reorder

use crate::command::{self, EditCommand};
use crate::error::CommandError;
use crate::locator::TargetLocator;
use quill_forms::{FormBinder, FormBuilder, Parts};
use quill_model::{
    AnswerSet, Definition, DefinitionDraft, GroupCode, ModelError, PageGroup, RecordDraft,
    RuleViolation,
};

/// Insert a new page group into display order
#[derive(Debug)]
pub(crate) struct InsertGroupCommand {
    at: Option<usize>,
    parts: Option<Parts>,
    locator: TargetLocator,
}

impl InsertGroupCommand {
    pub(crate) fn new(at: Option<usize>) -> Self {
        Self {
            at,
            parts: None,
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for InsertGroupCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let parts = FormBuilder::group_form(definition.definition(), None)?;
        parts.splice_into(definition, record);
        tracing::debug!("group insert started");
        self.parts = Some(parts);
        Ok(())
    }

    fn check(&self, definition: &Definition, answers: &AnswerSet) -> Vec<RuleViolation> {
        command::violations(self.parts.as_ref(), definition, answers)
    }

    fn apply(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
        answers: &AnswerSet,
    ) -> Result<(), CommandError> {
        let parts = self.parts.as_ref().ok_or(CommandError::NotStarted)?;
        let merged = command::merged(parts, answers);
        let group = FormBinder::bind_group(&merged)?;
        let code = group.code.clone();

        definition.insert_group(self.at, group)?;
        self.locator = command::locate_group(definition.definition(), record.record(), &code);
        tracing::debug!(group = code.as_str(), "group inserted");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}

/// Update a page group
///
/// A code change re-keys the group's interviews and every workflow sequence
/// step that referenced the old code.
#[derive(Debug)]
pub(crate) struct UpdateGroupCommand {
    code: GroupCode,
    parts: Option<Parts>,
    existing: Option<PageGroup>,
    locator: TargetLocator,
}

impl UpdateGroupCommand {
    pub(crate) fn new(code: GroupCode) -> Self {
        Self {
            code,
            parts: None,
            existing: None,
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for UpdateGroupCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        let existing = def
            .group(&self.code)
            .cloned()
            .ok_or_else(|| ModelError::NoSuchGroup(self.code.clone()))?;
        let parts = FormBuilder::group_form(def, Some(&existing))?;
        parts.splice_into(definition, record);
        tracing::debug!(group = self.code.as_str(), "group update started");
        self.existing = Some(existing);
        self.parts = Some(parts);
        Ok(())
    }

    fn check(&self, definition: &Definition, answers: &AnswerSet) -> Vec<RuleViolation> {
        command::violations(self.parts.as_ref(), definition, answers)
    }

    fn apply(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
        answers: &AnswerSet,
    ) -> Result<(), CommandError> {
        let parts = self.parts.as_ref().ok_or(CommandError::NotStarted)?;
        let existing = self.existing.as_ref().ok_or(CommandError::NotStarted)?;

        let merged = command::merged(parts, answers);
        let group = FormBinder::bind_group(&merged)?;
        let new_code = group.code.clone();
        let recoded = new_code != existing.code;

        definition.replace_group(&existing.code, group)?;
        if recoded {
            definition.rekey_workflow_steps(&existing.code, &new_code);
            record.rekey_interviews(&existing.code, &new_code);
        }

        self.locator = command::locate_group(definition.definition(), record.record(), &new_code);
        tracing::debug!(group = new_code.as_str(), recoded, "group update applied");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}

/// Delete a page group after acknowledgment
///
/// Cascades: the group's interviews are removed (and with them their
/// answers) and its code is stripped from every workflow sequence. Member
/// pages stay in the definition.
#[derive(Debug)]
pub(crate) struct DeleteGroupCommand {
    code: GroupCode,
    parts: Option<Parts>,
    locator: TargetLocator,
}

impl DeleteGroupCommand {
    pub(crate) fn new(code: GroupCode) -> Self {
        Self {
            code,
            parts: None,
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for DeleteGroupCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        if def.group(&self.code).is_none() {
            return Err(ModelError::NoSuchGroup(self.code.clone()).into());
        }
        let label = format!("Delete group {}", self.code);
        let parts = FormBuilder::delete_form(def, &label)?;
        parts.splice_into(definition, record);
        tracing::debug!(group = self.code.as_str(), "group delete started");
        self.parts = Some(parts);
        Ok(())
    }

    fn check(&self, definition: &Definition, answers: &AnswerSet) -> Vec<RuleViolation> {
        command::violations(self.parts.as_ref(), definition, answers)
    }

    fn apply(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
        _answers: &AnswerSet,
    ) -> Result<(), CommandError> {
        if self.parts.is_none() {
            return Err(CommandError::NotStarted);
        }
        record.remove_interviews_of(&self.code);
        definition.strip_code_from_workflows(&self.code);
        definition.remove_group(&self.code)?;

        self.locator = TargetLocator::detached();
        tracing::debug!(group = self.code.as_str(), "group deleted");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}

/// Reorder a group within the definition's display order
#[derive(Debug)]
pub(crate) struct ReorderGroupCommand {
    from: usize,
    to: usize,
    parts: Option<Parts>,
    locator: TargetLocator,
}

impl ReorderGroupCommand {
    pub(crate) fn new(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            parts: None,
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for ReorderGroupCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        let len = def.groups.len();
        for position in [self.from, self.to] {
            if position >= len {
                return Err(ModelError::IndexOutOfRange {
                    collection: "groups",
                    index: position,
                    len,
                }
                .into());
            }
        }
        let parts = FormBuilder::reorder_form(def)?;
        parts.splice_into(definition, record);
        self.parts = Some(parts);
        Ok(())
    }

    fn check(&self, definition: &Definition, answers: &AnswerSet) -> Vec<RuleViolation> {
        command::violations(self.parts.as_ref(), definition, answers)
    }

    fn apply(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
        _answers: &AnswerSet,
    ) -> Result<(), CommandError> {
        if self.parts.is_none() {
            return Err(CommandError::NotStarted);
        }
        definition.move_group(self.from, self.to)?;

        let moved = definition.definition().groups.get(self.to).map(|g| g.code.clone());
        self.locator = moved
            .map(|code| command::locate_group(definition.definition(), record.record(), &code))
            .unwrap_or_default();
        tracing::debug!(from = self.from, to = self.to, "group reordered");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}
