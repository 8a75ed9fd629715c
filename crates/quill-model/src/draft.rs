//! Copy-on-write drafts over the aggregates
//!
//! A draft clones an aggregate snapshot (cheap, structural sharing), exposes
//! the targeted mutations commands are written in terms of, and `freeze()`s
//! back into a validated value with a bumped version. Drafts are the only
//! mutation route; nothing outside a command's `start`/`apply` ever holds
//! one.

use crate::definition::Definition;
use crate::error::ModelError;
use crate::field::Field;
use crate::group::PageGroup;
use crate::name::{GroupCode, PageName, VariableName, WorkflowName};
use crate::page::{Page, PageItem};
use crate::record::{Interview, Record};
use crate::rules::CrossRule;
use crate::value::AnswerSet;
use crate::workflow::Workflow;
use im::Vector;

fn move_within<T: Clone>(
    items: &mut Vector<T>,
    from: usize,
    to: usize,
    collection: &'static str,
) -> Result<(), ModelError> {
    let len = items.len();
    if from >= len {
        return Err(ModelError::IndexOutOfRange {
            collection,
            index: from,
            len,
        });
    }
    if to >= len {
        return Err(ModelError::IndexOutOfRange {
            collection,
            index: to,
            len,
        });
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

/// Mutable view over a [`Definition`] snapshot
#[derive(Debug, Clone)]
pub struct DefinitionDraft {
    definition: Definition,
}

impl DefinitionDraft {
    /// Draft over a snapshot
    #[must_use]
    pub fn new(snapshot: &Definition) -> Self {
        Self {
            definition: snapshot.clone(),
        }
    }

    /// Current (possibly mutated) state
    #[inline]
    #[must_use]
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Validate and seal the draft, bumping the version
    ///
    /// # Errors
    /// Fails when the mutated state breaks a definition invariant.
    pub fn freeze(mut self) -> Result<Definition, ModelError> {
        self.definition.validate()?;
        self.definition.version += 1;
        Ok(self.definition)
    }

    fn page_mut(&mut self, name: &PageName) -> Result<&mut Page, ModelError> {
        self.definition
            .pages
            .iter_mut()
            .find(|p| &p.name == name)
            .ok_or_else(|| ModelError::NoSuchPage(name.clone()))
    }

    // --- fields ---

    /// Insert a field into a page's item list (`None` appends)
    ///
    /// # Errors
    /// Fails on an unknown page or an out-of-range position.
    pub fn insert_field(
        &mut self,
        page: &PageName,
        at: Option<usize>,
        field: Field,
    ) -> Result<(), ModelError> {
        let page = self.page_mut(page)?;
        let len = page.items.len();
        let at = at.unwrap_or(len);
        if at > len {
            return Err(ModelError::IndexOutOfRange {
                collection: "page items",
                index: at,
                len,
            });
        }
        page.items.insert(at, PageItem::Field(field));
        Ok(())
    }

    /// Replace the field currently named `name`, keeping its slot
    ///
    /// # Errors
    /// Fails when no page owns such a field.
    pub fn replace_field(
        &mut self,
        name: &VariableName,
        field: Field,
    ) -> Result<Field, ModelError> {
        for page in self.definition.pages.iter_mut() {
            if let Some(index) = page.field_position(name) {
                let old = page.items.set(index, PageItem::Field(field));
                if let PageItem::Field(old) = old {
                    return Ok(old);
                }
                return Err(ModelError::NoSuchField(name.clone()));
            }
        }
        Err(ModelError::NoSuchField(name.clone()))
    }

    /// Remove a field from its owning page
    ///
    /// # Errors
    /// Fails when no page owns such a field.
    pub fn remove_field(&mut self, name: &VariableName) -> Result<Field, ModelError> {
        for page in self.definition.pages.iter_mut() {
            if let Some(index) = page.field_position(name) {
                if let PageItem::Field(field) = page.items.remove(index) {
                    return Ok(field);
                }
                return Err(ModelError::NoSuchField(name.clone()));
            }
        }
        Err(ModelError::NoSuchField(name.clone()))
    }

    /// Move the field at flat position `from` to flat position `to` in a
    /// page's include-resolved field order
    ///
    /// The moved field adopts the container of the field that occupied the
    /// destination position, so crossing an include boundary transfers
    /// ownership while the flat order of all other fields is preserved.
    /// Landing on the first or last slot of a crossed-into container clears
    /// the field's section; anywhere else the section is re-derived from
    /// the physically preceding field so section runs stay contiguous.
    ///
    /// # Errors
    /// Fails on an unknown page or out-of-range flat positions.
    pub fn move_field_flat(
        &mut self,
        host: &PageName,
        from: usize,
        to: usize,
    ) -> Result<(), ModelError> {
        let slots: Vec<(PageName, usize)> = self
            .definition
            .flat_fields(host)?
            .iter()
            .map(|s| (s.owner.clone(), s.index_in_owner))
            .collect();
        let len = slots.len();
        if from >= len {
            return Err(ModelError::IndexOutOfRange {
                collection: "flat fields",
                index: from,
                len,
            });
        }
        if to >= len {
            return Err(ModelError::IndexOutOfRange {
                collection: "flat fields",
                index: to,
                len,
            });
        }
        if from == to {
            return Ok(());
        }
        let (src_page, src_index) = slots[from].clone();
        let (dest_page, dest_index) = slots[to].clone();

        let item = {
            let page = self.page_mut(&src_page)?;
            page.items.remove(src_index)
        };
        let mut field = match item {
            PageItem::Field(field) => field,
            include @ PageItem::Include { .. } => {
                let page = self.page_mut(&src_page)?;
                page.items.insert(src_index, include);
                return Err(ModelError::IndexOutOfRange {
                    collection: "flat fields",
                    index: from,
                    len,
                });
            }
        };

        let mut insert_at = dest_index;
        if to > from {
            insert_at += 1;
        }
        if dest_page == src_page && src_index < dest_index {
            insert_at -= 1;
        }

        let crossed = dest_page != src_page;
        {
            let page = self.page_mut(&dest_page)?;
            let landing_last = insert_at == page.items.len();
            field.section = if insert_at == 0 || (crossed && landing_last) {
                None
            } else {
                match page.items.get(insert_at - 1) {
                    Some(PageItem::Field(prev)) => prev.section.clone(),
                    _ => None,
                }
            };
            page.items.insert(insert_at, PageItem::Field(field));
        }
        Ok(())
    }

    // --- cross rules ---

    /// Append a cross-field rule
    pub fn push_rule(&mut self, rule: CrossRule) {
        self.definition.rules.push_back(rule);
    }

    /// Rewrite rule scopes after a field rename
    pub fn rekey_rule_scopes(&mut self, old: &VariableName, new: &VariableName) {
        for rule in self.definition.rules.iter_mut() {
            for name in rule.scope.iter_mut() {
                if name == old {
                    *name = new.clone();
                }
            }
        }
    }

    /// Drop removed fields from rule scopes; rules left with an empty scope
    /// are dropped entirely
    pub fn prune_rule_scopes(&mut self, removed: &[VariableName]) {
        for rule in self.definition.rules.iter_mut() {
            rule.scope.retain(|name| !removed.contains(name));
        }
        self.definition.rules.retain(|rule| !rule.scope.is_empty());
    }

    // --- pages ---

    /// Insert a page into display order (`None` appends)
    ///
    /// # Errors
    /// Fails on an out-of-range position.
    pub fn insert_page(&mut self, at: Option<usize>, page: Page) -> Result<(), ModelError> {
        let len = self.definition.pages.len();
        let at = at.unwrap_or(len);
        if at > len {
            return Err(ModelError::IndexOutOfRange {
                collection: "pages",
                index: at,
                len,
            });
        }
        self.definition.pages.insert(at, page);
        Ok(())
    }

    /// Replace the page currently named `name`, keeping its slot
    ///
    /// # Errors
    /// Fails on an unknown page.
    pub fn replace_page(&mut self, name: &PageName, page: Page) -> Result<Page, ModelError> {
        let index = self
            .definition
            .page_index(name)
            .ok_or_else(|| ModelError::NoSuchPage(name.clone()))?;
        Ok(self.definition.pages.set(index, page))
    }

    /// Remove a page from display order (references are left to the caller)
    ///
    /// # Errors
    /// Fails on an unknown page.
    pub fn remove_page(&mut self, name: &PageName) -> Result<Page, ModelError> {
        let index = self
            .definition
            .page_index(name)
            .ok_or_else(|| ModelError::NoSuchPage(name.clone()))?;
        Ok(self.definition.pages.remove(index))
    }

    /// Rewrite include items after a page rename
    pub fn repoint_includes(&mut self, old: &PageName, new: &PageName) {
        for page in self.definition.pages.iter_mut() {
            for item in page.items.iter_mut() {
                if let PageItem::Include { page: included } = item {
                    if included == old {
                        *included = new.clone();
                    }
                }
            }
        }
    }

    /// Drop include items referencing a removed page
    pub fn strip_includes_of(&mut self, removed: &PageName) {
        for page in self.definition.pages.iter_mut() {
            page.items
                .retain(|item| item.as_include() != Some(removed));
        }
    }

    /// Rewrite group membership lists after a page rename
    pub fn repoint_group_pages(&mut self, old: &PageName, new: &PageName) {
        for group in self.definition.groups.iter_mut() {
            for page in group.pages.iter_mut() {
                if page == old {
                    *page = new.clone();
                }
            }
        }
    }

    /// Drop a removed page from every group membership list
    pub fn remove_page_from_groups(&mut self, removed: &PageName) {
        for group in self.definition.groups.iter_mut() {
            group.pages.retain(|page| page != removed);
        }
    }

    /// Reorder a page within its group's sequence
    ///
    /// # Errors
    /// Fails on an unknown group or out-of-range positions.
    pub fn move_page_in_group(
        &mut self,
        code: &GroupCode,
        from: usize,
        to: usize,
    ) -> Result<(), ModelError> {
        let group = self
            .definition
            .groups
            .iter_mut()
            .find(|g| &g.code == code)
            .ok_or_else(|| ModelError::NoSuchGroup(code.clone()))?;
        move_within(&mut group.pages, from, to, "group pages")
    }

    /// Add a page to a group's sequence (`None` appends)
    ///
    /// # Errors
    /// Fails on an unknown group or an out-of-range position.
    pub fn add_page_to_group(
        &mut self,
        code: &GroupCode,
        at: Option<usize>,
        page: PageName,
    ) -> Result<(), ModelError> {
        let group = self
            .definition
            .groups
            .iter_mut()
            .find(|g| &g.code == code)
            .ok_or_else(|| ModelError::NoSuchGroup(code.clone()))?;
        let len = group.pages.len();
        let at = at.unwrap_or(len);
        if at > len {
            return Err(ModelError::IndexOutOfRange {
                collection: "group pages",
                index: at,
                len,
            });
        }
        group.pages.insert(at, page);
        Ok(())
    }

    // --- groups ---

    /// Insert a group into display order (`None` appends)
    ///
    /// # Errors
    /// Fails on an out-of-range position.
    pub fn insert_group(&mut self, at: Option<usize>, group: PageGroup) -> Result<(), ModelError> {
        let len = self.definition.groups.len();
        let at = at.unwrap_or(len);
        if at > len {
            return Err(ModelError::IndexOutOfRange {
                collection: "groups",
                index: at,
                len,
            });
        }
        self.definition.groups.insert(at, group);
        Ok(())
    }

    /// Replace the group currently coded `code`, keeping its slot
    ///
    /// # Errors
    /// Fails on an unknown group.
    pub fn replace_group(
        &mut self,
        code: &GroupCode,
        group: PageGroup,
    ) -> Result<PageGroup, ModelError> {
        let index = self
            .definition
            .group_index(code)
            .ok_or_else(|| ModelError::NoSuchGroup(code.clone()))?;
        Ok(self.definition.groups.set(index, group))
    }

    /// Remove a group from display order (references are left to the caller)
    ///
    /// # Errors
    /// Fails on an unknown group.
    pub fn remove_group(&mut self, code: &GroupCode) -> Result<PageGroup, ModelError> {
        let index = self
            .definition
            .group_index(code)
            .ok_or_else(|| ModelError::NoSuchGroup(code.clone()))?;
        Ok(self.definition.groups.remove(index))
    }

    /// Reorder a group within display order
    ///
    /// # Errors
    /// Fails on out-of-range positions.
    pub fn move_group(&mut self, from: usize, to: usize) -> Result<(), ModelError> {
        move_within(&mut self.definition.groups, from, to, "groups")
    }

    /// Rewrite workflow sequences after a group code rename
    pub fn rekey_workflow_steps(&mut self, old: &GroupCode, new: &GroupCode) {
        for workflow in self.definition.workflows.iter_mut() {
            for code in workflow.sequence.iter_mut() {
                if code == old {
                    *code = new.clone();
                }
            }
        }
    }

    /// Drop a removed group's code from every workflow sequence
    pub fn strip_code_from_workflows(&mut self, removed: &GroupCode) {
        for workflow in self.definition.workflows.iter_mut() {
            workflow.sequence.retain(|code| code != removed);
        }
    }

    // --- workflows ---

    /// Insert a workflow into display order (`None` appends)
    ///
    /// # Errors
    /// Fails on an out-of-range position.
    pub fn insert_workflow(&mut self, at: Option<usize>, workflow: Workflow) -> Result<(), ModelError> {
        let len = self.definition.workflows.len();
        let at = at.unwrap_or(len);
        if at > len {
            return Err(ModelError::IndexOutOfRange {
                collection: "workflows",
                index: at,
                len,
            });
        }
        self.definition.workflows.insert(at, workflow);
        Ok(())
    }

    /// Replace the workflow with this identity pair, keeping its slot
    ///
    /// # Errors
    /// Fails on an unknown workflow.
    pub fn replace_workflow(
        &mut self,
        name: &WorkflowName,
        specifier: &str,
        workflow: Workflow,
    ) -> Result<Workflow, ModelError> {
        let index = self
            .definition
            .workflow_index(name, specifier)
            .ok_or_else(|| ModelError::NoSuchWorkflow(name.clone()))?;
        Ok(self.definition.workflows.set(index, workflow))
    }

    /// Remove a workflow from display order
    ///
    /// # Errors
    /// Fails on an unknown workflow.
    pub fn remove_workflow(
        &mut self,
        name: &WorkflowName,
        specifier: &str,
    ) -> Result<Workflow, ModelError> {
        let index = self
            .definition
            .workflow_index(name, specifier)
            .ok_or_else(|| ModelError::NoSuchWorkflow(name.clone()))?;
        Ok(self.definition.workflows.remove(index))
    }

    /// Reorder a workflow within display order
    ///
    /// # Errors
    /// Fails on out-of-range positions.
    pub fn move_workflow(&mut self, from: usize, to: usize) -> Result<(), ModelError> {
        move_within(&mut self.definition.workflows, from, to, "workflows")
    }

    /// Detach every workflow derived from a removed root
    pub fn detach_derived_of(&mut self, root: &WorkflowName) {
        for workflow in self.definition.workflows.iter_mut() {
            if workflow.derived_from.as_ref() == Some(root) {
                workflow.derived_from = None;
            }
        }
    }

    /// Rewrite derivation links after a root workflow rename
    pub fn repoint_derived_links(&mut self, old: &WorkflowName, new: &WorkflowName) {
        for workflow in self.definition.workflows.iter_mut() {
            if workflow.derived_from.as_ref() == Some(old) {
                workflow.derived_from = Some(new.clone());
            }
        }
    }

    /// Rebuild the sequences of workflows derived from an updated root,
    /// keeping only codes the root still carries
    pub fn rebuild_derived_of(&mut self, root: &WorkflowName, root_sequence: &Vector<GroupCode>) {
        for workflow in self.definition.workflows.iter_mut() {
            if workflow.derived_from.as_ref() == Some(root) {
                workflow.sequence = workflow.retained_against(root_sequence);
            }
        }
    }

    // --- edit-form splicing ---

    /// Splice an edit-form into the definition: its parts page, its hosting
    /// group, and its rules (all in the reserved `@` namespace)
    pub fn splice_edit_form(
        &mut self,
        page: Page,
        group: PageGroup,
        rules: impl IntoIterator<Item = CrossRule>,
    ) {
        self.definition.pages.push_back(page);
        self.definition.groups.push_back(group);
        for rule in rules {
            self.definition.rules.push_back(rule);
        }
    }

    /// Remove every reserved-namespace page, group and rule
    pub fn purge_edit_form(&mut self) {
        self.definition.pages.retain(|page| !page.name.is_reserved());
        self.definition.groups.retain(|group| !group.code.is_reserved());
        self.definition.rules.retain(|rule| !rule.name.starts_with('@'));
    }
}

/// Mutable view over a [`Record`] snapshot
#[derive(Debug, Clone)]
pub struct RecordDraft {
    record: Record,
}

impl RecordDraft {
    /// Draft over a snapshot
    #[must_use]
    pub fn new(snapshot: &Record) -> Self {
        Self {
            record: snapshot.clone(),
        }
    }

    /// Current (possibly mutated) state
    #[inline]
    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Validate against the paired definition and seal, bumping the version
    ///
    /// # Errors
    /// Fails when an interview or answer no longer matches the definition.
    pub fn freeze(mut self, definition: &Definition) -> Result<Record, ModelError> {
        self.record.validate_against(definition)?;
        self.record.version += 1;
        Ok(self.record)
    }

    /// Append the edit-form interview carrying the form's default answers
    pub fn splice_edit_interview(&mut self, group: GroupCode, answers: AnswerSet) {
        let mut interview = Interview::new(group);
        interview.answers = answers;
        self.record.interviews.push_back(interview);
    }

    /// Remove every reserved-namespace interview
    pub fn purge_edit_interviews(&mut self) {
        self.record
            .interviews
            .retain(|interview| !interview.group.is_reserved());
    }

    /// Remove all answers for the given fields, across interviews
    pub fn remove_answers(&mut self, fields: &[VariableName]) {
        for interview in self.record.interviews.iter_mut() {
            for field in fields {
                interview.answers.remove(field);
            }
        }
    }

    /// Re-key answers after a field rename, preserving values
    pub fn rename_answers(&mut self, old: &VariableName, new: &VariableName) {
        for interview in self.record.interviews.iter_mut() {
            if let Some(value) = interview.answers.remove(old) {
                interview.answers.set(new.clone(), value);
            }
        }
    }

    /// Re-key interviews after a group code rename
    pub fn rekey_interviews(&mut self, old: &GroupCode, new: &GroupCode) {
        for interview in self.record.interviews.iter_mut() {
            if &interview.group == old {
                interview.group = new.clone();
            }
        }
    }

    /// Remove every interview answering a removed group
    pub fn remove_interviews_of(&mut self, removed: &GroupCode) {
        self.record
            .interviews
            .retain(|interview| &interview.group != removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{DefinitionBuilder, FieldBuilder, PageBuilder};
    use crate::field::FieldKind;
    use crate::language::{LanguageCode, Text};
    use crate::name::SectionName;
    use pretty_assertions::assert_eq;

    fn lang(s: &str) -> LanguageCode {
        LanguageCode::parse(s).unwrap()
    }

    fn var(s: &str) -> VariableName {
        VariableName::parse(s).unwrap()
    }

    fn pn(s: &str) -> PageName {
        PageName::parse(s).unwrap()
    }

    fn field(name: &str, section: Option<&str>) -> Field {
        FieldBuilder::new(name)
            .kind(FieldKind::Text)
            .wording(Text::with(lang("en"), name))
            .section(section.map(|s| SectionName::parse(s).unwrap()))
            .build()
            .unwrap()
    }

    /// Host page `visit` with fields f0 f1 f2, an include of `vitals`
    /// (fields f3 f4), then fields f5 f6 f7.
    fn definition_with_include() -> Definition {
        let visit = PageBuilder::new("visit")
            .title(Text::with(lang("en"), "Visit"))
            .field(field("f0", None))
            .field(field("f1", None))
            .field(field("f2", None))
            .include(pn("vitals"))
            .field(field("f5", None))
            .field(field("f6", None))
            .field(field("f7", None))
            .build()
            .unwrap();
        let vitals = PageBuilder::new("vitals")
            .title(Text::with(lang("en"), "Vitals"))
            .field(field("f3", Some("measures")))
            .field(field("f4", Some("measures")))
            .build()
            .unwrap();
        DefinitionBuilder::new("demo")
            .language(lang("en"))
            .page(visit)
            .page(vitals)
            .build()
            .unwrap()
    }

    fn flat_names(definition: &Definition) -> Vec<String> {
        definition
            .flat_fields(&pn("visit"))
            .unwrap()
            .iter()
            .map(|s| s.field.name.as_str().to_string())
            .collect()
    }

    #[test]
    fn flat_move_down_crosses_into_include() {
        let mut draft = DefinitionDraft::new(&definition_with_include());
        draft.move_field_flat(&pn("visit"), 2, 3).unwrap();
        let frozen = draft.freeze().unwrap();

        assert_eq!(flat_names(&frozen), [
            "f0", "f1", "f3", "f2", "f4", "f5", "f6", "f7"
        ]);
        // Ownership transferred to the included page, landing mid-container
        // so the section run is joined.
        let (owner, moved) = frozen.find_field(&var("f2")).unwrap();
        assert_eq!(owner.as_str(), "vitals");
        assert_eq!(
            moved.section,
            Some(SectionName::parse("measures").unwrap())
        );
    }

    #[test]
    fn flat_move_to_container_edge_clears_section() {
        let mut draft = DefinitionDraft::new(&definition_with_include());
        draft.move_field_flat(&pn("visit"), 2, 4).unwrap();
        let frozen = draft.freeze().unwrap();

        assert_eq!(flat_names(&frozen), [
            "f0", "f1", "f3", "f4", "f2", "f5", "f6", "f7"
        ]);
        let (owner, moved) = frozen.find_field(&var("f2")).unwrap();
        assert_eq!(owner.as_str(), "vitals");
        assert_eq!(moved.section, None);
    }

    #[test]
    fn flat_move_up_leaves_include() {
        let mut draft = DefinitionDraft::new(&definition_with_include());
        draft.move_field_flat(&pn("visit"), 3, 2).unwrap();
        let frozen = draft.freeze().unwrap();

        assert_eq!(flat_names(&frozen), [
            "f0", "f1", "f3", "f2", "f4", "f5", "f6", "f7"
        ]);
        let (owner, moved) = frozen.find_field(&var("f3")).unwrap();
        assert_eq!(owner.as_str(), "visit");
        assert_eq!(moved.section, None);
    }

    #[test]
    fn flat_move_within_page_repairs_section_from_neighbour() {
        let mut draft = DefinitionDraft::new(&definition_with_include());
        // f4 stays inside vitals, moving before f3: lands on the container's
        // first slot, so no preceding field and the section clears.
        draft.move_field_flat(&pn("visit"), 4, 3).unwrap();
        let frozen = draft.freeze().unwrap();

        assert_eq!(flat_names(&frozen), [
            "f0", "f1", "f2", "f4", "f3", "f5", "f6", "f7"
        ]);
        let (_, moved) = frozen.find_field(&var("f4")).unwrap();
        assert_eq!(moved.section, None);
    }

    #[test]
    fn prune_drops_rules_left_scopeless() {
        let mut draft = DefinitionDraft::new(&definition_with_include());
        draft.push_rule(
            CrossRule::new(
                "pair",
                crate::rules::RuleKind::Required,
                crate::rules::RuleTrigger::OnApply,
            )
            .over(var("f0"))
            .over(var("f1")),
        );
        draft.push_rule(
            CrossRule::new(
                "solo",
                crate::rules::RuleKind::Required,
                crate::rules::RuleTrigger::OnApply,
            )
            .over(var("f1")),
        );

        draft.prune_rule_scopes(&[var("f1")]);
        let frozen = draft.freeze().unwrap();
        assert_eq!(frozen.rules.len(), 1);
        assert_eq!(frozen.rules[0].name, "pair");
        assert_eq!(frozen.rules[0].scope, Vector::unit(var("f0")));
    }

    #[test]
    fn splice_then_purge_restores_shape() {
        let original = definition_with_include();
        let mut draft = DefinitionDraft::new(&original);

        let parts_page = PageBuilder::named(PageName::reserved("parts"))
            .title(Text::with(lang("en"), "Edit"))
            .field(
                FieldBuilder::named(VariableName::reserved("name"))
                    .kind(FieldKind::Text)
                    .wording(Text::with(lang("en"), "Name"))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let mut group = PageGroup::new(
            GroupCode::reserved("edit"),
            Text::with(lang("en"), "Edit"),
        );
        group.pages.push_back(PageName::reserved("parts"));
        draft.splice_edit_form(parts_page, group, [CrossRule::new(
            "@required",
            crate::rules::RuleKind::Required,
            crate::rules::RuleTrigger::OnApply,
        )
        .over(VariableName::reserved("name"))]);

        assert_eq!(draft.definition().pages.len(), 3);
        assert!(draft.definition().has_field("@name"));

        draft.purge_edit_form();
        let frozen = draft.freeze().unwrap();
        assert_eq!(frozen.pages, original.pages);
        assert_eq!(frozen.groups, original.groups);
        assert_eq!(frozen.rules, original.rules);
        assert_eq!(frozen.version, original.version + 1);
    }

    #[test]
    fn record_rename_preserves_values() {
        let mut record = Record::new("p01");
        let mut interview = Interview::new(GroupCode::parse("baseline").unwrap());
        interview
            .answers
            .set(var("old_name"), crate::value::Value::Number(3.0));
        record.interviews.push_back(interview);

        let mut draft = RecordDraft::new(&record);
        draft.rename_answers(&var("old_name"), &var("new_name"));
        assert_eq!(
            draft.record().answer(&var("new_name")),
            Some(&crate::value::Value::Number(3.0))
        );
        assert_eq!(draft.record().answer(&var("old_name")), None);
    }

    #[test]
    fn move_within_bounds_checked() {
        let mut items: Vector<u8> = Vector::from(vec![1, 2, 3]);
        assert!(move_within(&mut items, 0, 3, "items").is_err());
        move_within(&mut items, 0, 2, "items").unwrap();
        assert_eq!(items, Vector::from(vec![2, 3, 1]));
    }

    proptest::proptest! {
        #[test]
        fn flat_move_preserves_the_field_multiset(from in 0usize..8, to in 0usize..8) {
            let mut draft = DefinitionDraft::new(&definition_with_include());
            draft.move_field_flat(&pn("visit"), from, to).unwrap();
            let frozen = draft.freeze().unwrap();

            let mut names = flat_names(&frozen);
            names.sort_unstable();
            let expected: Vec<String> = (0..8).map(|i| format!("f{i}")).collect();
            proptest::prop_assert_eq!(names, expected);
        }
    }
}
