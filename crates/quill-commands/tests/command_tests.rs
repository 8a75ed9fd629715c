//! Multi-command chains over the shared health-survey fixtures

use pretty_assertions::assert_eq;
use quill_commands::CommandSpec;
use quill_forms::parts;
use quill_model::{AnswerSet, Definition, DefinitionDraft, Record, RecordDraft, Value};
use quill_test_utils::{
    en, group_code, page_name, sample_definition, sample_record, var, workflow_name,
};

/// Drive one spec the way an external caller would: start, gate on the
/// form's rules, apply against fresh drafts of the pre-edit snapshot.
fn run(
    definition: &Definition,
    record: &Record,
    spec: CommandSpec,
    answers: &AnswerSet,
) -> anyhow::Result<(Definition, Record)> {
    let mut command = spec.build();
    let mut def_draft = DefinitionDraft::new(definition);
    let mut rec_draft = RecordDraft::new(record);
    command.start(&mut def_draft, &mut rec_draft)?;
    let visible = def_draft.freeze()?;
    anyhow::ensure!(
        command.can_apply(&visible, answers),
        "form rules reject the answers"
    );

    let mut def_draft = DefinitionDraft::new(definition);
    let mut rec_draft = RecordDraft::new(record);
    command.apply(&mut def_draft, &mut rec_draft, answers)?;
    let frozen = def_draft.freeze()?;
    let record = rec_draft.freeze(&frozen)?;
    Ok((frozen, record))
}

fn flat_names(definition: &Definition, page: &str) -> anyhow::Result<Vec<String>> {
    Ok(definition
        .flat_fields(&page_name(page))?
        .iter()
        .map(|slot| slot.field.name.as_str().to_string())
        .collect())
}

#[test]
fn renames_propagate_through_a_restructuring_chain() -> anyhow::Result<()> {
    let definition = sample_definition();
    let record = sample_record();

    let rename_field = AnswerSet::new().with(parts::field_name(), Value::Text("gait".into()));
    let (definition, record) = run(
        &definition,
        &record,
        CommandSpec::UpdateField {
            name: var("mobility"),
        },
        &rename_field,
    )?;
    assert_eq!(
        record.answer(&var("gait")),
        Some(&Value::Text("walks unaided".into()))
    );

    let rename_page = AnswerSet::new().with(parts::page_name(), Value::Text("assessment".into()));
    let (definition, record) = run(
        &definition,
        &record,
        CommandSpec::UpdatePage {
            name: page_name("survey"),
        },
        &rename_page,
    )?;
    let (owner, _) = definition.find_field(&var("gait")).unwrap();
    assert_eq!(owner.as_str(), "assessment");

    let ack = AnswerSet::new().with(parts::delete_ack(), Value::Flag(true));
    let (definition, record) = run(
        &definition,
        &record,
        CommandSpec::DeletePage {
            name: page_name("labs"),
        },
        &ack,
    )?;
    assert!(record.answer(&var("glucose")).is_none());
    assert_eq!(
        record.answer(&var("gait")),
        Some(&Value::Text("walks unaided".into()))
    );
    assert_eq!(
        flat_names(&definition, "assessment")?,
        ["gait", "pain", "fatigue", "sleep", "appetite", "mood"]
    );
    Ok(())
}

#[test]
fn group_recode_then_root_rewrite_keeps_derivations_aligned() -> anyhow::Result<()> {
    let definition = sample_definition();
    let record = sample_record();

    let recode = AnswerSet::new().with(parts::group_code(), Value::Text("exam".into()));
    let (definition, record) = run(
        &definition,
        &record,
        CommandSpec::UpdateGroup {
            code: group_code("checkup"),
        },
        &recode,
    )?;
    assert_eq!(record.interview(0).unwrap().group, group_code("exam"));
    for workflow in definition.workflows.iter() {
        assert!(workflow.sequence.contains(&group_code("exam")));
        assert!(!workflow.sequence.contains(&group_code("checkup")));
    }

    let empty_root = AnswerSet::new().with(parts::workflow_sequence(), Value::List(Vec::new()));
    let (definition, _) = run(
        &definition,
        &record,
        CommandSpec::UpdateWorkflow {
            name: workflow_name("full"),
            specifier: String::new(),
        },
        &empty_root,
    )?;
    let root = definition.workflow(&workflow_name("full"), "").unwrap();
    assert!(root.sequence.is_empty());
    let brief = definition.workflow(&workflow_name("full"), "brief").unwrap();
    assert!(brief.sequence.is_empty());
    assert_eq!(brief.derived_from.as_ref(), Some(&workflow_name("full")));
    Ok(())
}

#[test]
fn an_insert_then_delete_round_trip_is_field_neutral() -> anyhow::Result<()> {
    let definition = sample_definition();
    let record = sample_record();
    let before = flat_names(&definition, "history")?;

    let new_field = AnswerSet::new()
        .with(parts::field_name(), Value::Text("bmi".into()))
        .with(parts::wording(1), Value::Localized(en("Body mass index")))
        .with(parts::units(), Value::Text("kg/m2".into()));
    let (definition, record) = run(
        &definition,
        &record,
        CommandSpec::InsertField {
            page: page_name("history"),
            at: Some(1),
        },
        &new_field,
    )?;
    assert_eq!(flat_names(&definition, "history")?, ["age", "bmi", "allergies"]);
    let (_, bmi) = definition.find_field(&var("bmi")).unwrap();
    assert_eq!(bmi.units.as_deref(), Some("kg/m2"));

    let ack = AnswerSet::new().with(parts::delete_ack(), Value::Flag(true));
    let (definition, record) = run(
        &definition,
        &record,
        CommandSpec::DeleteField {
            page: page_name("history"),
            at: 1,
            count: 1,
        },
        &ack,
    )?;
    assert_eq!(flat_names(&definition, "history")?, before);
    assert_eq!(record.answer(&var("age")), Some(&Value::Number(52.0)));
    Ok(())
}
