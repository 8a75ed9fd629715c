//! Workflow commands: insert, update, delete, reorder
//!
//! Workflows never own answers, so these commands leave the record alone
//! except for the spliced edit interview. What they do maintain is the
//! derivation graph: derived workflows follow their root through renames,
//! sequence changes, and deletion.

use crate::command::{self, EditCommand};
use crate::error::CommandError;
use crate::locator::TargetLocator;
use quill_forms::{FormBinder, FormBuilder, Parts};
use quill_model::{
    AnswerSet, Definition, DefinitionDraft, ModelError, RecordDraft, RuleViolation, Workflow,
    WorkflowName,
};

/// Insert a new workflow
#[derive(Debug)]
pub(crate) struct InsertWorkflowCommand {
    at: Option<usize>,
    parts: Option<Parts>,
}

impl InsertWorkflowCommand {
    pub(crate) fn new(at: Option<usize>) -> Self {
        Self { at, parts: None }
    }
}

impl EditCommand for InsertWorkflowCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let parts = FormBuilder::workflow_form(definition.definition(), None)?;
        parts.splice_into(definition, record);
        tracing::debug!("workflow insert started");
        self.parts = Some(parts);
        Ok(())
    }

    fn check(&self, definition: &Definition, answers: &AnswerSet) -> Vec<RuleViolation> {
        command::violations(self.parts.as_ref(), definition, answers)
    }

    fn apply(
        &mut self,
        definition: &mut DefinitionDraft,
        _record: &mut RecordDraft,
        answers: &AnswerSet,
    ) -> Result<(), CommandError> {
        let parts = self.parts.as_ref().ok_or(CommandError::NotStarted)?;
        let merged = command::merged(parts, answers);
        let workflow = FormBinder::bind_workflow(&merged, None)?;
        let name = workflow.name.clone();

        definition.insert_workflow(self.at, workflow)?;
        tracing::debug!(workflow = name.as_str(), "workflow inserted");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        TargetLocator::detached()
    }
}

/// Update a workflow
///
/// Updating a root propagates to its derived workflows: a rename re-points
/// their derivation links, and the new sequence is re-imposed on them so
/// each derived sequence keeps only steps the root still has, in root
/// order.
#[derive(Debug)]
pub(crate) struct UpdateWorkflowCommand {
    name: WorkflowName,
    specifier: String,
    parts: Option<Parts>,
    existing: Option<Workflow>,
}

impl UpdateWorkflowCommand {
    pub(crate) fn new(name: WorkflowName, specifier: String) -> Self {
        Self {
            name,
            specifier,
            parts: None,
            existing: None,
        }
    }
}

impl EditCommand for UpdateWorkflowCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        let existing = def
            .workflow(&self.name, &self.specifier)
            .cloned()
            .ok_or_else(|| ModelError::NoSuchWorkflow(self.name.clone()))?;
        let parts = FormBuilder::workflow_form(def, Some(&existing))?;
        parts.splice_into(definition, record);
        tracing::debug!(workflow = self.name.as_str(), "workflow update started");
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
        _record: &mut RecordDraft,
        answers: &AnswerSet,
    ) -> Result<(), CommandError> {
        let parts = self.parts.as_ref().ok_or(CommandError::NotStarted)?;
        let existing = self.existing.as_ref().ok_or(CommandError::NotStarted)?;

        let merged = command::merged(parts, answers);
        let workflow = FormBinder::bind_workflow(&merged, Some(existing))?;
        let new_name = workflow.name.clone();
        let new_sequence = workflow.sequence.clone();
        let renamed = new_name != existing.name;

        definition.replace_workflow(&existing.name, &existing.specifier, workflow)?;
        if existing.is_root() {
            if renamed {
                definition.repoint_derived_links(&existing.name, &new_name);
            }
            definition.rebuild_derived_of(&new_name, &new_sequence);
        }

        tracing::debug!(workflow = new_name.as_str(), renamed, "workflow update applied");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        TargetLocator::detached()
    }
}

/// Delete a workflow after acknowledgment
///
/// Deleting a root orphans its derived workflows: they survive with their
/// current sequences but their derivation links are cleared.
#[derive(Debug)]
pub(crate) struct DeleteWorkflowCommand {
    name: WorkflowName,
    specifier: String,
    parts: Option<Parts>,
    was_root: bool,
}

impl DeleteWorkflowCommand {
    pub(crate) fn new(name: WorkflowName, specifier: String) -> Self {
        Self {
            name,
            specifier,
            parts: None,
            was_root: false,
        }
    }
}

impl EditCommand for DeleteWorkflowCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        let existing = def
            .workflow(&self.name, &self.specifier)
            .ok_or_else(|| ModelError::NoSuchWorkflow(self.name.clone()))?;
        self.was_root = existing.is_root();

        let label = format!("Delete workflow {}", self.name);
        let parts = FormBuilder::delete_form(def, &label)?;
        parts.splice_into(definition, record);
        tracing::debug!(workflow = self.name.as_str(), "workflow delete started");
        self.parts = Some(parts);
        Ok(())
    }

    fn check(&self, definition: &Definition, answers: &AnswerSet) -> Vec<RuleViolation> {
        command::violations(self.parts.as_ref(), definition, answers)
    }

    fn apply(
        &mut self,
        definition: &mut DefinitionDraft,
        _record: &mut RecordDraft,
        _answers: &AnswerSet,
    ) -> Result<(), CommandError> {
        if self.parts.is_none() {
            return Err(CommandError::NotStarted);
        }
        definition.remove_workflow(&self.name, &self.specifier)?;
        if self.was_root {
            definition.detach_derived_of(&self.name);
        }
        tracing::debug!(workflow = self.name.as_str(), "workflow deleted");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        TargetLocator::detached()
    }
}

/// Reorder a workflow within the definition's display order
#[derive(Debug)]
pub(crate) struct ReorderWorkflowCommand {
    from: usize,
    to: usize,
    parts: Option<Parts>,
}

impl ReorderWorkflowCommand {
    pub(crate) fn new(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            parts: None,
        }
    }
}

impl EditCommand for ReorderWorkflowCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        let len = def.workflows.len();
        for position in [self.from, self.to] {
            if position >= len {
                return Err(ModelError::IndexOutOfRange {
                    collection: "workflows",
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
        _record: &mut RecordDraft,
        _answers: &AnswerSet,
    ) -> Result<(), CommandError> {
        if self.parts.is_none() {
            return Err(CommandError::NotStarted);
        }
        definition.move_workflow(self.from, self.to)?;
        tracing::debug!(from = self.from, to = self.to, "workflow reordered");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        TargetLocator::detached()
    }
}
