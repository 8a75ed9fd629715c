//! Testing utilities for the Quill workspace
//!
//! Shared fixtures: a health survey whose `survey` page carries eight flat
//! fields with two arriving through an include, a page-group, a root
//! workflow with a derived variant, and a fresh respondent record.

#![allow(missing_docs)]

use quill_model::{
    Definition, DefinitionBuilder, Field, FieldBuilder, FieldKind, FieldRule, GroupBuilder,
    GroupCode, Interview, LanguageCode, PageBuilder, PageName, Record, SectionName, Text, Value,
    VariableName, WorkflowBuilder, WorkflowName,
};

pub fn lang(code: &str) -> LanguageCode {
    LanguageCode::parse(code).unwrap()
}

pub fn var(name: &str) -> VariableName {
    VariableName::parse(name).unwrap()
}

pub fn page_name(name: &str) -> PageName {
    PageName::parse(name).unwrap()
}

pub fn group_code(code: &str) -> GroupCode {
    GroupCode::parse(code).unwrap()
}

pub fn workflow_name(name: &str) -> WorkflowName {
    WorkflowName::parse(name).unwrap()
}

pub fn section(name: &str) -> SectionName {
    SectionName::parse(name).unwrap()
}

pub fn en(text: &str) -> Text {
    Text::with(lang("en"), text)
}

pub fn text_field(name: &str, wording: &str) -> Field {
    FieldBuilder::new(name)
        .kind(FieldKind::Text)
        .wording(en(wording))
        .build()
        .unwrap()
}

pub fn number_field(name: &str, wording: &str) -> Field {
    FieldBuilder::new(name)
        .kind(FieldKind::Number)
        .wording(en(wording))
        .build()
        .unwrap()
}

fn sectioned_number(name: &str, wording: &str, sec: &SectionName) -> Field {
    FieldBuilder::new(name)
        .kind(FieldKind::Number)
        .wording(en(wording))
        .section(Some(sec.clone()))
        .build()
        .unwrap()
}

/// A health survey: `history` (two fields), `labs` (two sectioned fields),
/// and `survey` whose flat field list is eight long with flat positions 2
/// and 3 coming from the included `labs` page. One group, one root workflow
/// with a derived `brief` variant.
pub fn sample_definition() -> Definition {
    let chem = section("chem");
    DefinitionBuilder::new("health_survey")
        .language(lang("en"))
        .page(
            PageBuilder::new("history")
                .title(en("History"))
                .field(
                    FieldBuilder::new("age")
                        .kind(FieldKind::Number)
                        .wording(en("Age"))
                        .rule(FieldRule::Required)
                        .build()
                        .unwrap(),
                )
                .field(text_field("allergies", "Known allergies"))
                .build()
                .unwrap(),
        )
        .page(
            PageBuilder::new("labs")
                .title(en("Laboratory"))
                .field(sectioned_number("glucose", "Glucose", &chem))
                .field(sectioned_number("sodium", "Sodium", &chem))
                .build()
                .unwrap(),
        )
        .page(
            PageBuilder::new("survey")
                .title(en("Survey"))
                .field(text_field("mobility", "Mobility"))
                .field(number_field("pain", "Pain level"))
                .include(page_name("labs"))
                .field(number_field("fatigue", "Fatigue"))
                .field(number_field("sleep", "Hours of sleep"))
                .field(number_field("appetite", "Appetite"))
                .field(text_field("mood", "Mood"))
                .build()
                .unwrap(),
        )
        .group(
            GroupBuilder::new("checkup")
                .label(en("Checkup"))
                .page(page_name("history"))
                .page(page_name("survey"))
                .build()
                .unwrap(),
        )
        .workflow(
            WorkflowBuilder::new("full", "")
                .step(group_code("checkup"))
                .build()
                .unwrap(),
        )
        .workflow(
            WorkflowBuilder::new("full", "brief")
                .step(group_code("checkup"))
                .derived_from(Some(workflow_name("full")))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

/// A fresh respondent (identity nonce still zero) with one checkup underway
pub fn sample_record() -> Record {
    let mut interview = Interview::new(group_code("checkup"));
    interview.answers.set(var("age"), Value::Number(52.0));
    interview.answers.set(var("mobility"), Value::Text("walks unaided".into()));
    interview.answers.set(var("glucose"), Value::Number(5.4));

    let mut record = Record::new("R-2041");
    record.interviews.push_back(interview);
    record
}
