//! Session lifecycle tests over the shared health-survey fixtures

use pretty_assertions::assert_eq;
use quill_commands::CommandSpec;
use quill_forms::parts;
use quill_model::{AnswerSet, FieldKind, Interview, Record, Value};
use quill_session::{EditOutcome, EditSession, SessionError, SessionStatus};
use quill_test_utils::{en, group_code, page_name, sample_definition, sample_record, section, var};
use std::sync::Arc;
use tokio::sync::oneshot::error::TryRecvError;

fn session() -> EditSession {
    EditSession::new(Arc::new(sample_definition()), Arc::new(sample_record()))
}

#[test]
fn start_then_cancel_restores_reference_identical_aggregates() {
    let mut session = session();
    let before_def = Arc::clone(session.definition());
    let before_rec = Arc::clone(session.record());

    session
        .start(CommandSpec::UpdateField { name: var("pain") })
        .unwrap();
    assert_eq!(session.status(), SessionStatus::Pending);
    assert!(!Arc::ptr_eq(session.definition(), &before_def));
    assert!(session.definition().has_field("@name"));

    session.cancel().unwrap();
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(Arc::ptr_eq(session.definition(), &before_def));
    assert!(Arc::ptr_eq(session.record(), &before_rec));
}

#[test]
fn second_start_while_pending_fails_before_any_mutation() {
    let mut session = session();
    session
        .start(CommandSpec::UpdatePage {
            name: page_name("survey"),
        })
        .unwrap();
    let visible_def = Arc::clone(session.definition());
    let visible_rec = Arc::clone(session.record());

    let error = session
        .start(CommandSpec::UpdateField { name: var("pain") })
        .unwrap_err();
    assert_eq!(error, SessionError::AlreadyPending);
    assert!(Arc::ptr_eq(session.definition(), &visible_def));
    assert!(Arc::ptr_eq(session.record(), &visible_rec));
    assert_eq!(session.status(), SessionStatus::Pending);
}

#[test]
fn required_parts_gate_can_apply() {
    let mut session = session();
    session
        .start(CommandSpec::InsertField {
            page: page_name("history"),
            at: None,
        })
        .unwrap();

    assert!(!session.can_apply(&AnswerSet::new()).unwrap());

    let answers = AnswerSet::new()
        .with(parts::field_name(), Value::Text("bmi".into()))
        .with(parts::wording(1), Value::Localized(en("Body mass index")));
    assert!(session.can_apply(&answers).unwrap());
}

#[test]
fn uniqueness_violations_are_keyed_unique() {
    let mut session = session();
    session
        .start(CommandSpec::InsertField {
            page: page_name("history"),
            at: None,
        })
        .unwrap();

    let answers = AnswerSet::new()
        .with(parts::field_name(), Value::Text("age".into()))
        .with(parts::wording(1), Value::Localized(en("Age again")));
    assert!(!session.can_apply(&answers).unwrap());
    let violations = session.violations(&answers).unwrap();
    assert!(violations.iter().any(|v| v.key == "unique"));
}

#[test]
fn untouched_update_form_reapplies_identically() {
    let mut session = session();
    let original = session
        .definition()
        .find_field(&var("mobility"))
        .map(|(_, field)| field.clone())
        .unwrap();

    session
        .start(CommandSpec::UpdateField {
            name: var("mobility"),
        })
        .unwrap();
    assert!(session.can_apply(&AnswerSet::new()).unwrap());
    session.apply(&AnswerSet::new()).unwrap();

    let (_, after) = session.definition().find_field(&var("mobility")).unwrap();
    assert_eq!(after, &original);
    assert!(!session.definition().has_field("@name"));
    assert_eq!(session.status(), SessionStatus::Idle);
}

#[test]
fn delete_with_count_empties_the_page_and_its_answers() {
    let mut interview = Interview::new(group_code("checkup"));
    interview.answers.set(var("age"), Value::Number(52.0));
    interview
        .answers
        .set(var("allergies"), Value::Text("penicillin".into()));
    let mut record = Record::new("R-7");
    record.interviews.push_back(interview);

    let mut session = EditSession::new(Arc::new(sample_definition()), Arc::new(record));
    session
        .start(CommandSpec::DeleteField {
            page: page_name("history"),
            at: 0,
            count: 2,
        })
        .unwrap();
    session.apply(&AnswerSet::new()).unwrap();

    assert!(session
        .definition()
        .flat_fields(&page_name("history"))
        .unwrap()
        .is_empty());
    assert!(session.record().interview(0).unwrap().answers.is_empty());
}

#[test]
fn reorder_across_the_include_boundary_transfers_membership() {
    let mut session = session();
    session
        .start(CommandSpec::ReorderField {
            page: page_name("survey"),
            from: 4,
            to: 3,
        })
        .unwrap();
    let target = session.apply(&AnswerSet::new()).unwrap();

    let definition = session.definition();
    let flat: Vec<&str> = definition
        .flat_fields(&page_name("survey"))
        .unwrap()
        .iter()
        .map(|slot| slot.field.name.as_str())
        .collect();
    assert_eq!(
        flat,
        ["mobility", "pain", "glucose", "fatigue", "sodium", "sleep", "appetite", "mood"]
    );

    let (owner, moved) = definition.find_field(&var("fatigue")).unwrap();
    assert_eq!(owner.as_str(), "labs");
    assert_eq!(moved.section, Some(section("chem")));
    assert_eq!(target.page, Some(page_name("survey")));
    assert_eq!(target.field, Some(var("fatigue")));
}

#[test]
fn contextual_toggle_wraps_then_unwraps_the_shape() {
    let mut session = session();
    session
        .start(CommandSpec::UpdateField { name: var("pain") })
        .unwrap();
    let wrap = AnswerSet::new().with(parts::contextual_toggle(), Value::Flag(true));
    session.apply(&wrap).unwrap();

    let (_, wrapped) = session.definition().find_field(&var("pain")).unwrap();
    assert!(wrapped.shape.is_contextual());
    assert_eq!(wrapped.shape.instance_count(), 1);

    session
        .start(CommandSpec::UpdateField { name: var("pain") })
        .unwrap();
    let extend = AnswerSet::new()
        .with(parts::contextual_toggle(), Value::Flag(true))
        .with(parts::type_code(2), Value::Choice("text".into()))
        .with(parts::wording(2), Value::Localized(en("Pain notes")));
    session.apply(&extend).unwrap();
    let (_, extended) = session.definition().find_field(&var("pain")).unwrap();
    assert_eq!(extended.shape.instance_count(), 2);

    session
        .start(CommandSpec::UpdateField { name: var("pain") })
        .unwrap();
    let unwrap = AnswerSet::new().with(parts::contextual_toggle(), Value::Flag(false));
    session.apply(&unwrap).unwrap();

    let (_, unwrapped) = session.definition().find_field(&var("pain")).unwrap();
    assert!(!unwrapped.shape.is_contextual());
    assert_eq!(unwrapped.shape.instance_count(), 1);
    assert_eq!(unwrapped.primary_kind(), &FieldKind::Number);
}

#[tokio::test]
async fn outcome_channel_delivers_applied_exactly_once() {
    let mut session = session();
    let receiver = session
        .start(CommandSpec::UpdateField { name: var("pain") })
        .unwrap();
    let target = session.apply(&AnswerSet::new()).unwrap();

    assert_eq!(receiver.await.unwrap(), EditOutcome::Applied { target });
}

#[tokio::test]
async fn outcome_channel_delivers_canceled() {
    let mut session = session();
    let receiver = session
        .start(CommandSpec::DeletePage {
            name: page_name("labs"),
        })
        .unwrap();
    let target = session.cancel().unwrap();

    assert_eq!(receiver.await.unwrap(), EditOutcome::Canceled { target });
}

#[tokio::test]
async fn failed_apply_poisons_the_edit_until_cancel() {
    let mut session = session();
    let mut receiver = session
        .start(CommandSpec::UpdateField {
            name: var("mobility"),
        })
        .unwrap();

    let bad = AnswerSet::new().with(parts::type_code(1), Value::Choice("warp".into()));
    let error = session.apply(&bad).unwrap_err();
    assert!(matches!(error, SessionError::Command(_)));
    assert_eq!(session.status(), SessionStatus::ApplyFailed);
    assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));

    // Even corrected answers are refused; only cancel settles the edit.
    let retry = session.apply(&AnswerSet::new()).unwrap_err();
    assert_eq!(retry, SessionError::ApplyFailed);

    let target = session.cancel().unwrap();
    assert_eq!(receiver.await.unwrap(), EditOutcome::Canceled { target });
    assert_eq!(session.status(), SessionStatus::Idle);
}

#[test]
fn idle_session_refuses_answer_calls() {
    let mut session = session();
    assert_eq!(
        session.apply(&AnswerSet::new()).unwrap_err(),
        SessionError::NotPending
    );
    assert_eq!(session.cancel().unwrap_err(), SessionError::NotPending);
    assert_eq!(
        session.can_apply(&AnswerSet::new()).unwrap_err(),
        SessionError::NotPending
    );
}

#[test]
fn state_for_recomputes_while_idle_and_refuses_while_pending() {
    let mut session = session();
    let target = session.state_for(0).unwrap();
    assert_eq!(target.interview, Some(0));

    session
        .start(CommandSpec::UpdateField { name: var("pain") })
        .unwrap();
    assert_eq!(
        session.state_for(0).unwrap_err(),
        SessionError::StateUnavailable
    );
}

#[test]
fn failed_start_leaves_the_session_idle_and_untouched() {
    let mut session = session();
    let before = Arc::clone(session.definition());

    let error = session
        .start(CommandSpec::UpdateField { name: var("ghost") })
        .unwrap_err();
    assert!(matches!(error, SessionError::Command(_)));
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(Arc::ptr_eq(session.definition(), &before));

    session
        .start(CommandSpec::UpdateField { name: var("pain") })
        .unwrap();
    assert_eq!(session.status(), SessionStatus::Pending);
}
