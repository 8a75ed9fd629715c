//! Page commands: insert, update, delete, reorder

use crate::command::{self, EditCommand};
use crate::error::CommandError;
use crate::locator::TargetLocator;
use quill_forms::{FormBinder, FormBuilder, Parts};
use quill_model::{
    AnswerSet, Definition, DefinitionDraft, GroupCode, ModelError, Page, PageName, RecordDraft,
    RuleViolation, VariableName,
};

/// Insert a new page, optionally placed into a group's sequence
///
/// With a group, `at` positions the page within that group's sequence and
/// the page itself is appended to the definition's page order; without one,
/// `at` positions the page in the definition's page order.
#[derive(Debug)]
pub(crate) struct InsertPageCommand {
    group: Option<GroupCode>,
    at: Option<usize>,
    parts: Option<Parts>,
    locator: TargetLocator,
}

impl InsertPageCommand {
    pub(crate) fn new(group: Option<GroupCode>, at: Option<usize>) -> Self {
        Self {
            group,
            at,
            parts: None,
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for InsertPageCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        if let Some(code) = &self.group {
            if def.group(code).is_none() {
                return Err(ModelError::NoSuchGroup(code.clone()).into());
            }
        }
        let parts = FormBuilder::page_form(def, None)?;
        parts.splice_into(definition, record);
        tracing::debug!("page insert started");
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
        let page = FormBinder::bind_page(&merged, None)?;
        let name = page.name.clone();

        match &self.group {
            Some(code) => {
                definition.insert_page(None, page)?;
                definition.add_page_to_group(code, self.at, name.clone())?;
            }
            None => definition.insert_page(self.at, page)?,
        }

        self.locator = command::locate_page(definition.definition(), record.record(), &name);
        tracing::debug!(page = name.as_str(), "page inserted");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}

/// Update a page's name and title, keeping its items
///
/// A rename re-points includes of the page and group membership lists.
#[derive(Debug)]
pub(crate) struct UpdatePageCommand {
    name: PageName,
    parts: Option<Parts>,
    existing: Option<Page>,
    locator: TargetLocator,
}

impl UpdatePageCommand {
    pub(crate) fn new(name: PageName) -> Self {
        Self {
            name,
            parts: None,
            existing: None,
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for UpdatePageCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        let existing = def
            .page(&self.name)
            .cloned()
            .ok_or_else(|| ModelError::NoSuchPage(self.name.clone()))?;
        let parts = FormBuilder::page_form(def, Some(&existing))?;
        parts.splice_into(definition, record);
        tracing::debug!(page = self.name.as_str(), "page update started");
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
        let page = FormBinder::bind_page(&merged, Some(existing))?;
        let new_name = page.name.clone();
        let renamed = new_name != existing.name;

        definition.replace_page(&existing.name, page)?;
        if renamed {
            definition.repoint_includes(&existing.name, &new_name);
            definition.repoint_group_pages(&existing.name, &new_name);
        }

        self.locator = command::locate_page(definition.definition(), record.record(), &new_name);
        tracing::debug!(page = new_name.as_str(), renamed, "page update applied");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}

/// Delete a page after acknowledgment
///
/// Cascades: includes of the page and group references are removed, the
/// page's own fields lose their answers and their rule-scope entries.
#[derive(Debug)]
pub(crate) struct DeletePageCommand {
    name: PageName,
    parts: Option<Parts>,
    own_fields: Vec<VariableName>,
    group: Option<GroupCode>,
    locator: TargetLocator,
}

impl DeletePageCommand {
    pub(crate) fn new(name: PageName) -> Self {
        Self {
            name,
            parts: None,
            own_fields: Vec::new(),
            group: None,
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for DeletePageCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        let page = def
            .page(&self.name)
            .ok_or_else(|| ModelError::NoSuchPage(self.name.clone()))?;
        self.own_fields = page.own_fields().map(|f| f.name.clone()).collect();
        self.group = def.group_of_page(&self.name).map(|g| g.code.clone());

        let label = format!("Delete page {}", self.name);
        let parts = FormBuilder::delete_form(def, &label)?;
        parts.splice_into(definition, record);
        tracing::debug!(page = self.name.as_str(), "page delete started");
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
        definition.strip_includes_of(&self.name);
        definition.remove_page_from_groups(&self.name);
        definition.remove_page(&self.name)?;
        definition.prune_rule_scopes(&self.own_fields);
        record.remove_answers(&self.own_fields);

        self.locator = match &self.group {
            Some(code) => {
                command::locate_group(definition.definition(), record.record(), code)
            }
            None => TargetLocator::detached(),
        };
        tracing::debug!(page = self.name.as_str(), "page deleted");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}

/// Reorder a page within its group's sequence
#[derive(Debug)]
pub(crate) struct ReorderPageCommand {
    group: GroupCode,
    from: usize,
    to: usize,
    parts: Option<Parts>,
    locator: TargetLocator,
}

impl ReorderPageCommand {
    pub(crate) fn new(group: GroupCode, from: usize, to: usize) -> Self {
        Self {
            group,
            from,
            to,
            parts: None,
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for ReorderPageCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        let group = def
            .group(&self.group)
            .ok_or_else(|| ModelError::NoSuchGroup(self.group.clone()))?;
        let len = group.pages.len();
        for position in [self.from, self.to] {
            if position >= len {
                return Err(ModelError::IndexOutOfRange {
                    collection: "group pages",
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
        definition.move_page_in_group(&self.group, self.from, self.to)?;

        let moved = definition
            .definition()
            .group(&self.group)
            .and_then(|g| g.pages.get(self.to).cloned());
        let mut locator =
            command::locate_group(definition.definition(), record.record(), &self.group);
        locator.page = moved.and_then(|p| definition.definition().page_index(&p));
        self.locator = locator;
        tracing::debug!(group = self.group.as_str(), from = self.from, to = self.to, "page reordered");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}
