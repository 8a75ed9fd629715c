//! Field commands: insert, update, delete, reorder

use crate::command::{self, EditCommand};
use crate::error::CommandError;
use crate::locator::TargetLocator;
use quill_forms::{FormBinder, FormBuilder, Parts};
use quill_model::{
    AnswerSet, Definition, DefinitionDraft, Field, ModelError, PageName, RecordDraft,
    RuleViolation, VariableName,
};

/// Insert a new field into a page
///
/// Shares the update flow: a blank shell's form (no defaults beyond the
/// baseline, no uniqueness exemption), bound and placed at `apply`.
#[derive(Debug)]
pub(crate) struct InsertFieldCommand {
    page: PageName,
    at: Option<usize>,
    parts: Option<Parts>,
    locator: TargetLocator,
}

impl InsertFieldCommand {
    pub(crate) fn new(page: PageName, at: Option<usize>) -> Self {
        Self {
            page,
            at,
            parts: None,
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for InsertFieldCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        if def.page(&self.page).is_none() {
            return Err(ModelError::NoSuchPage(self.page.clone()).into());
        }
        let parts = FormBuilder::field_form(def, None)?;
        parts.splice_into(definition, record);
        tracing::debug!(page = self.page.as_str(), "field insert started");
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
        let field = FormBinder::bind_field(&merged, None)?;
        let name = field.name.clone();

        definition.insert_field(&self.page, self.at, field)?;
        self.locator = command::locate_field(
            definition.definition(),
            record.record(),
            &self.page,
            Some(&name),
        );
        tracing::debug!(field = name.as_str(), page = self.page.as_str(), "field inserted");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}

/// Update an existing field
///
/// Rebinds the whole field from the merged answers; a rename re-keys rule
/// scopes and recorded answers, a changed value kind drops the answers.
#[derive(Debug)]
pub(crate) struct UpdateFieldCommand {
    name: VariableName,
    parts: Option<Parts>,
    existing: Option<Field>,
    host: Option<PageName>,
    locator: TargetLocator,
}

impl UpdateFieldCommand {
    pub(crate) fn new(name: VariableName) -> Self {
        Self {
            name,
            parts: None,
            existing: None,
            host: None,
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for UpdateFieldCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        let (host, field) = def
            .find_field(&self.name)
            .map(|(host, field)| (host.clone(), field.clone()))
            .ok_or_else(|| ModelError::NoSuchField(self.name.clone()))?;
        let parts = FormBuilder::field_form(def, Some(&field))?;
        parts.splice_into(definition, record);
        tracing::debug!(field = self.name.as_str(), "field update started");
        self.host = Some(host);
        self.existing = Some(field);
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
        let host = self.host.clone().ok_or(CommandError::NotStarted)?;

        let merged = command::merged(parts, answers);
        let field = FormBinder::bind_field(&merged, existing.section.clone())?;
        let new_name = field.name.clone();
        let renamed = new_name != existing.name;
        let kind_changed = field.primary_kind().code() != existing.primary_kind().code();

        definition.replace_field(&existing.name, field)?;
        if renamed {
            definition.rekey_rule_scopes(&existing.name, &new_name);
            record.rename_answers(&existing.name, &new_name);
        }
        if kind_changed {
            record.remove_answers(std::slice::from_ref(&new_name));
        }

        self.locator = command::locate_field(
            definition.definition(),
            record.record(),
            &host,
            Some(&new_name),
        );
        tracing::debug!(
            field = new_name.as_str(),
            renamed,
            kind_changed,
            "field update applied"
        );
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}

/// Delete `count` consecutive fields starting at a page item position
///
/// The range must not run into a page include. Cascades: the fields'
/// answers are removed everywhere and their names pruned from rule scopes
/// (rules left with an empty scope are dropped).
#[derive(Debug)]
pub(crate) struct DeleteFieldCommand {
    page: PageName,
    at: usize,
    count: usize,
    parts: Option<Parts>,
    doomed: Vec<VariableName>,
    locator: TargetLocator,
}

impl DeleteFieldCommand {
    pub(crate) fn new(page: PageName, at: usize, count: usize) -> Self {
        Self {
            page,
            at,
            count,
            parts: None,
            doomed: Vec::new(),
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for DeleteFieldCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        let page = def
            .page(&self.page)
            .ok_or_else(|| ModelError::NoSuchPage(self.page.clone()))?;
        let len = page.items.len();
        if self.at + self.count > len {
            return Err(ModelError::IndexOutOfRange {
                collection: "page items",
                index: self.at + self.count,
                len,
            }
            .into());
        }
        let mut doomed = Vec::with_capacity(self.count);
        for offset in 0..self.count {
            let index = self.at + offset;
            match page.items.get(index).and_then(|item| item.as_field()) {
                Some(field) => doomed.push(field.name.clone()),
                None => return Err(CommandError::RangeCrossesInclude(index)),
            }
        }

        let label = if self.count == 1 {
            format!("Delete field {}", doomed[0])
        } else {
            format!("Delete {} fields", self.count)
        };
        let parts = FormBuilder::delete_form(def, &label)?;
        parts.splice_into(definition, record);
        tracing::debug!(page = self.page.as_str(), count = self.count, "field delete started");
        self.doomed = doomed;
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
        for name in &self.doomed {
            definition.remove_field(name)?;
        }
        definition.prune_rule_scopes(&self.doomed);
        record.remove_answers(&self.doomed);

        self.locator =
            command::locate_field(definition.definition(), record.record(), &self.page, None);
        tracing::debug!(page = self.page.as_str(), count = self.doomed.len(), "fields deleted");
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}

/// Move a field between flat positions of a page
///
/// The flat index walks include boundaries; the draft operation transfers
/// container ownership and repairs section runs.
#[derive(Debug)]
pub(crate) struct ReorderFieldCommand {
    page: PageName,
    from: usize,
    to: usize,
    parts: Option<Parts>,
    locator: TargetLocator,
}

impl ReorderFieldCommand {
    pub(crate) fn new(page: PageName, from: usize, to: usize) -> Self {
        Self {
            page,
            from,
            to,
            parts: None,
            locator: TargetLocator::default(),
        }
    }
}

impl EditCommand for ReorderFieldCommand {
    fn start(
        &mut self,
        definition: &mut DefinitionDraft,
        record: &mut RecordDraft,
    ) -> Result<(), CommandError> {
        let def = definition.definition();
        let len = def.flat_fields(&self.page)?.len();
        for position in [self.from, self.to] {
            if position >= len {
                return Err(ModelError::IndexOutOfRange {
                    collection: "flat fields",
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
        definition.move_field_flat(&self.page, self.from, self.to)?;
        let mut locator =
            command::locate_page(definition.definition(), record.record(), &self.page);
        locator.field = Some(self.to);
        self.locator = locator;
        tracing::debug!(
            page = self.page.as_str(),
            from = self.from,
            to = self.to,
            "field reordered"
        );
        Ok(())
    }

    fn locator(&self) -> TargetLocator {
        self.locator.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, page_name, var};
    use pretty_assertions::assert_eq;
    use quill_forms::parts;
    use quill_model::{CrossRule, RuleKind, RuleTrigger, Text, Value};

    fn insert_answers(name: &str) -> AnswerSet {
        AnswerSet::new()
            .with(parts::field_name(), Value::Text(name.into()))
            .with(
                parts::wording(1),
                Value::Localized(Text::with(fixtures::lang("en"), "Asked somehow")),
            )
    }

    #[test]
    fn insert_rejects_duplicate_names_until_renamed() {
        let definition = fixtures::definition();
        let record = fixtures::record();
        let mut command = InsertFieldCommand::new(page_name("intake"), None);
        let view = fixtures::started_view(&mut command, &definition, &record);

        let taken = insert_answers("patient_id");
        let violations = command.check(&view, &taken);
        assert!(violations.iter().any(|v| v.key == "unique"));
        assert!(!command.can_apply(&view, &taken));

        assert!(command.can_apply(&view, &insert_answers("height")));
    }

    #[test]
    fn insert_requires_name_and_wording() {
        let definition = fixtures::definition();
        let record = fixtures::record();
        let mut command = InsertFieldCommand::new(page_name("intake"), None);
        let view = fixtures::started_view(&mut command, &definition, &record);

        let blank = AnswerSet::new();
        let keys: Vec<_> = command
            .check(&view, &blank)
            .into_iter()
            .map(|v| v.key)
            .collect();
        assert!(keys.contains(&"required".to_string()));
        assert!(keys.contains(&"languages".to_string()));
    }

    #[test]
    fn insert_places_field_at_position() {
        let definition = fixtures::definition();
        let record = fixtures::record();
        let mut command = InsertFieldCommand::new(page_name("intake"), Some(1));
        let (new_def, _) =
            fixtures::run(&mut command, &definition, &record, &insert_answers("height"));

        let intake = new_def.page(&page_name("intake")).unwrap();
        let names: Vec<_> = intake.own_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["patient_id", "height", "weight"]);
        assert_eq!(command.locator().field, Some(1));
        assert_eq!(command.locator().page, Some(0));
    }

    #[test]
    fn untouched_update_reproduces_the_field() {
        let definition = fixtures::definition();
        let record = fixtures::record();
        let before = definition
            .find_field(&var("weight"))
            .map(|(_, f)| f.clone())
            .unwrap();

        let mut command = UpdateFieldCommand::new(var("weight"));
        let (new_def, _) = fixtures::run(&mut command, &definition, &record, &AnswerSet::new());

        let after = new_def
            .find_field(&var("weight"))
            .map(|(_, f)| f.clone())
            .unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn update_rename_rekeys_answers_and_rule_scopes() {
        let mut draft = quill_model::DefinitionDraft::new(&fixtures::definition());
        draft.push_rule(
            CrossRule::new("weight_required", RuleKind::Required, RuleTrigger::OnApply)
                .over(var("weight")),
        );
        let definition = draft.freeze().unwrap();
        let record = fixtures::record();

        let answers = AnswerSet::new().with(parts::field_name(), Value::Text("body_weight".into()));
        let mut command = UpdateFieldCommand::new(var("weight"));
        let (new_def, new_rec) = fixtures::run(&mut command, &definition, &record, &answers);

        assert!(new_def.has_field("body_weight"));
        assert!(!new_def.has_field("weight"));
        assert!(new_def.rules[0].watches(&var("body_weight")));
        assert_eq!(new_rec.answer(&var("body_weight")), Some(&Value::Number(70.0)));
        assert_eq!(new_rec.answer(&var("weight")), None);
    }

    #[test]
    fn update_kind_change_drops_answers() {
        let definition = fixtures::definition();
        let record = fixtures::record();
        let answers = AnswerSet::new().with(parts::type_code(1), Value::Choice("text".into()));

        let mut command = UpdateFieldCommand::new(var("weight"));
        let (new_def, new_rec) = fixtures::run(&mut command, &definition, &record, &answers);

        let (_, field) = new_def.find_field(&var("weight")).unwrap();
        assert_eq!(field.primary_kind().code(), "text");
        assert_eq!(new_rec.answer(&var("weight")), None);
        assert_eq!(new_rec.answer(&var("patient_id")), Some(&Value::Text("P-001".into())));
    }

    #[test]
    fn delete_two_fields_clears_page_and_answers() {
        let definition = fixtures::definition();
        let record = fixtures::record();
        let mut command = DeleteFieldCommand::new(page_name("intake"), 0, 2);
        let (new_def, new_rec) = fixtures::run(&mut command, &definition, &record, &AnswerSet::new());

        let intake = new_def.page(&page_name("intake")).unwrap();
        assert!(intake.is_empty());
        assert_eq!(new_rec.answer(&var("patient_id")), None);
        assert_eq!(new_rec.answer(&var("weight")), None);
        assert_eq!(new_rec.answer(&var("pulse")), Some(&Value::Number(64.0)));
        assert_eq!(command.locator().field, None);
        assert_eq!(command.locator().page, Some(0));
    }

    #[test]
    fn delete_range_must_not_cross_an_include() {
        let definition = fixtures::definition();
        let record = fixtures::record();
        let mut command = DeleteFieldCommand::new(page_name("exam"), 0, 2);

        let mut def_draft = quill_model::DefinitionDraft::new(&definition);
        let mut rec_draft = quill_model::RecordDraft::new(&record);
        let err = command.start(&mut def_draft, &mut rec_draft).unwrap_err();
        assert_eq!(err, CommandError::RangeCrossesInclude(1));
    }

    #[test]
    fn delete_prunes_rule_scopes() {
        let mut draft = quill_model::DefinitionDraft::new(&fixtures::definition());
        draft.push_rule(
            CrossRule::new("intake_done", RuleKind::Required, RuleTrigger::OnApply)
                .over(var("patient_id"))
                .over(var("pulse")),
        );
        let definition = draft.freeze().unwrap();
        let record = fixtures::record();

        let mut command = DeleteFieldCommand::new(page_name("intake"), 0, 2);
        let (new_def, _) = fixtures::run(&mut command, &definition, &record, &AnswerSet::new());

        assert_eq!(new_def.rules.len(), 1);
        assert!(!new_def.rules[0].watches(&var("patient_id")));
        assert!(new_def.rules[0].watches(&var("pulse")));
    }

    #[test]
    fn reorder_swaps_sibling_fields() {
        let definition = fixtures::definition();
        let record = fixtures::record();
        let mut command = ReorderFieldCommand::new(page_name("intake"), 0, 1);
        let (new_def, _) = fixtures::run(&mut command, &definition, &record, &AnswerSet::new());

        let names: Vec<_> = new_def
            .flat_fields(&page_name("intake"))
            .unwrap()
            .iter()
            .map(|slot| slot.field.name.as_str().to_string())
            .collect();
        assert_eq!(names, ["weight", "patient_id"]);
        assert_eq!(command.locator().field, Some(1));
    }

    #[test]
    fn reorder_is_vacuously_applicable() {
        let definition = fixtures::definition();
        let record = fixtures::record();
        let mut command = ReorderFieldCommand::new(page_name("intake"), 0, 1);
        let view = fixtures::started_view(&mut command, &definition, &record);
        assert!(command.can_apply(&view, &AnswerSet::new()));
    }
}
