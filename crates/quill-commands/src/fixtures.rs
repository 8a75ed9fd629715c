//! Shared test fixtures: a small clinical questionnaire and a respondent

use crate::command::EditCommand;
use quill_model::{
    AnswerSet, Definition, DefinitionBuilder, DefinitionDraft, FieldBuilder, FieldKind, FieldRule,
    GroupBuilder, GroupCode, Interview, LanguageCode, PageBuilder, PageName, Record, RecordDraft,
    SectionName, Text, Value, VariableName, WorkflowBuilder, WorkflowName,
};

pub(crate) fn lang(s: &str) -> LanguageCode {
    LanguageCode::parse(s).unwrap()
}

pub(crate) fn var(s: &str) -> VariableName {
    VariableName::parse(s).unwrap()
}

pub(crate) fn page_name(s: &str) -> PageName {
    PageName::parse(s).unwrap()
}

pub(crate) fn group_code(s: &str) -> GroupCode {
    GroupCode::parse(s).unwrap()
}

pub(crate) fn en_text(s: &str) -> Text {
    Text::with(lang("en"), s)
}

/// Two pages in one group: `intake` with two own fields, `exam` including
/// `vitals` (whose fields share a section) between two own fields. One root
/// workflow plus a derived variant.
pub(crate) fn definition() -> Definition {
    let measures = SectionName::parse("measures").unwrap();
    DefinitionBuilder::new("clinical")
        .language(lang("en"))
        .page(
            PageBuilder::new("intake")
                .title(en_text("Intake"))
                .field(
                    FieldBuilder::new("patient_id")
                        .kind(FieldKind::Text)
                        .wording(en_text("Patient identifier"))
                        .rule(FieldRule::Required)
                        .rule(FieldRule::Unique)
                        .build()
                        .unwrap(),
                )
                .field(
                    FieldBuilder::new("weight")
                        .kind(FieldKind::Number)
                        .wording(en_text("Weight"))
                        .rule(FieldRule::Required)
                        .units(Some("kg".into()))
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        )
        .page(
            PageBuilder::new("vitals")
                .title(en_text("Vitals"))
                .field(
                    FieldBuilder::new("pulse")
                        .kind(FieldKind::Number)
                        .wording(en_text("Pulse"))
                        .section(Some(measures.clone()))
                        .build()
                        .unwrap(),
                )
                .field(
                    FieldBuilder::new("bp")
                        .kind(FieldKind::Text)
                        .wording(en_text("Blood pressure"))
                        .section(Some(measures))
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        )
        .page(
            PageBuilder::new("exam")
                .title(en_text("Examination"))
                .field(
                    FieldBuilder::new("note")
                        .kind(FieldKind::Text)
                        .wording(en_text("Examination note"))
                        .build()
                        .unwrap(),
                )
                .include(page_name("vitals"))
                .field(
                    FieldBuilder::new("temp")
                        .kind(FieldKind::Number)
                        .wording(en_text("Temperature"))
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        )
        .group(
            GroupBuilder::new("visit")
                .label(en_text("Visit"))
                .page(page_name("intake"))
                .page(page_name("exam"))
                .build()
                .unwrap(),
        )
        .workflow(WorkflowBuilder::new("standard", "").step(group_code("visit")).build().unwrap())
        .workflow(
            WorkflowBuilder::new("standard", "short")
                .step(group_code("visit"))
                .derived_from(Some(WorkflowName::parse("standard").unwrap()))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

/// A respondent with identity and one answered visit
pub(crate) fn record() -> Record {
    let mut interview = Interview::new(group_code("visit"));
    interview.answers.set(var("patient_id"), Value::Text("P-001".into()));
    interview.answers.set(var("weight"), Value::Number(70.0));
    interview.answers.set(var("pulse"), Value::Number(64.0));

    let mut record = Record::new("R-100");
    record.nonce = 7;
    record.interviews.push_back(interview);
    record
}

/// Start against the snapshot and freeze the parts-augmented visible state
pub(crate) fn started_view(
    command: &mut dyn EditCommand,
    definition: &Definition,
    record: &Record,
) -> Definition {
    let mut def_draft = DefinitionDraft::new(definition);
    let mut rec_draft = RecordDraft::new(record);
    command.start(&mut def_draft, &mut rec_draft).unwrap();
    def_draft.freeze().unwrap()
}

/// Drive a command through the session's apply mechanics: start against one
/// pair of drafts, apply against fresh drafts of the same snapshot, freeze
pub(crate) fn run(
    command: &mut dyn EditCommand,
    definition: &Definition,
    record: &Record,
    answers: &AnswerSet,
) -> (Definition, Record) {
    let mut def_draft = DefinitionDraft::new(definition);
    let mut rec_draft = RecordDraft::new(record);
    command.start(&mut def_draft, &mut rec_draft).unwrap();

    let mut def_draft = DefinitionDraft::new(definition);
    let mut rec_draft = RecordDraft::new(record);
    command
        .apply(&mut def_draft, &mut rec_draft, answers)
        .unwrap();
    let new_def = def_draft.freeze().unwrap();
    let new_rec = rec_draft.freeze(&new_def).unwrap();
    (new_def, new_rec)
}
