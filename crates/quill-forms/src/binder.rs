//! Edit-form binding
//!
//! The reverse of form construction: read the finished form's merged answer
//! set and rebuild the edited entity from scratch through the model
//! builders. Nothing is patched in place; the bound entity is exactly what
//! the answers say. Rule families are all-or-nothing: a family is attached
//! iff its toggle answer is truthy, never inherited from the previous
//! version of the field.

use crate::error::FormError;
use crate::parts;
use quill_model::{
    AnswerSet, Condition, DateFormat, DefaultSource, Field, FieldBuilder, FieldKind, FieldRule,
    GroupBuilder, GroupCode, LetterCase, Page, PageBuilder, PageGroup, PageName, RangeBound,
    SectionName, Text, Value, VariableName, Workflow, WorkflowBuilder,
};

/// Rebuilds entities from merged edit-form answers
pub struct FormBinder;

impl FormBinder {
    /// Rebuild a field from its form answers
    ///
    /// `current_section` is the edited field's section before the edit; it
    /// is kept unless the section sub-form was acknowledged. The contextual
    /// toggle decides the shape: unwrapping reads only instance 1, wrapping
    /// a single field starts a one-element instance list.
    ///
    /// # Errors
    /// Fails when a needed part has no usable answer or the rebuilt field
    /// is not a valid domain field.
    pub fn bind_field(
        answers: &AnswerSet,
        current_section: Option<SectionName>,
    ) -> Result<Field, FormError> {
        let raw = required_text(answers, &parts::field_name())?;
        let contextual = flag(answers, &parts::contextual_toggle());
        let instances = if contextual {
            parts::instance_count(answers).max(1)
        } else {
            1
        };

        let mut builder = FieldBuilder::new(raw).contextual(contextual);
        for i in 1..=instances {
            builder = builder
                .kind(bind_kind(answers, i)?)
                .wording(localized(answers, &parts::wording(i))?);
        }
        builder = bind_rule_families(builder, answers)?;
        let field = builder
            .section(bind_section(answers, current_section)?)
            .units(optional_text(answers, &parts::units()))
            .comment(optional_text(answers, &parts::comment()))
            .pinned(flag(answers, &parts::pinned_flag()))
            .kpi(flag(answers, &parts::kpi_flag()))
            .build()?;
        tracing::debug!(field = field.name.as_str(), instances, "field bound");
        Ok(field)
    }

    /// Rebuild a page from its form answers, carrying over the existing
    /// page's items untouched
    ///
    /// # Errors
    /// Fails on a missing name or title part or an invalid page name.
    pub fn bind_page(answers: &AnswerSet, existing: Option<&Page>) -> Result<Page, FormError> {
        let name = required_text(answers, &parts::page_name())?;
        let mut builder =
            PageBuilder::new(name).title(localized(answers, &parts::page_title())?);
        if let Some(page) = existing {
            for item in &page.items {
                builder = builder.item(item.clone());
            }
        }
        Ok(builder.build()?)
    }

    /// Rebuild a page group from its form answers
    ///
    /// # Errors
    /// Fails on a missing code or label part or an unparsable page name in
    /// the member list.
    pub fn bind_group(answers: &AnswerSet) -> Result<PageGroup, FormError> {
        let code = required_text(answers, &parts::group_code())?;
        let mut builder = GroupBuilder::new(code)
            .label(localized(answers, &parts::group_label())?)
            .repeating(flag(answers, &parts::group_repeating()));
        for raw in list(answers, &parts::group_pages()) {
            builder = builder.page(PageName::parse(&raw)?);
        }
        Ok(builder.build()?)
    }

    /// Rebuild a workflow from its form answers, carrying over the existing
    /// workflow's derivation link
    ///
    /// # Errors
    /// Fails on a missing name part or an unparsable group code in the
    /// sequence.
    pub fn bind_workflow(
        answers: &AnswerSet,
        existing: Option<&Workflow>,
    ) -> Result<Workflow, FormError> {
        let name = required_text(answers, &parts::workflow_name())?;
        let specifier = optional_text(answers, &parts::workflow_specifier()).unwrap_or_default();
        let mut builder = WorkflowBuilder::new(name, specifier)
            .derived_from(existing.and_then(|w| w.derived_from.clone()));
        for raw in list(answers, &parts::workflow_sequence()) {
            builder = builder.step(GroupCode::parse(&raw)?);
        }
        Ok(builder.build()?)
    }
}

/// One instance's kind from its type selector and argument parts
///
/// Unanswered optional arguments fall back (day-level dates, minute-level
/// times); scale and score bounds must be answered once their type is
/// selected.
#[allow(clippy::cast_possible_truncation)]
fn bind_kind(answers: &AnswerSet, instance: usize) -> Result<FieldKind, FormError> {
    let selector = parts::type_code(instance);
    let code = required_text(answers, &selector)?;
    let kind = match code.as_str() {
        "text" => FieldKind::Text,
        "number" => FieldKind::Number,
        "flag" => FieldKind::Flag,
        "date" => {
            let part = parts::date_format(instance);
            let format = match optional_text(answers, &part) {
                Some(code) => DateFormat::from_code(&code)
                    .ok_or_else(|| FormError::bad(&part, format!("unknown format {code}")))?,
                None => DateFormat::YearMonthDay,
            };
            FieldKind::Date { format }
        }
        "time" => FieldKind::Time {
            with_seconds: flag(answers, &parts::time_seconds(instance)),
        },
        "choice" => FieldKind::Choice {
            options: list(answers, &parts::choice_options(instance)).into(),
        },
        "scale" => FieldKind::Scale {
            min: number(answers, &parts::scale_min(instance))?.round() as i64,
            max: number(answers, &parts::scale_max(instance))?.round() as i64,
        },
        "score" => FieldKind::Score {
            max: number(answers, &parts::score_max(instance))?.round() as u32,
        },
        other => return Err(FormError::bad(&selector, format!("unknown type code {other}"))),
    };
    Ok(kind)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bind_rule_families(
    mut builder: FieldBuilder,
    answers: &AnswerSet,
) -> Result<FieldBuilder, FormError> {
    if flag(answers, &parts::required_toggle()) {
        builder = builder.rule(FieldRule::Required);
    }
    if flag(answers, &parts::unique_toggle()) {
        builder = builder.rule(FieldRule::Unique);
    }
    if flag(answers, &parts::range_toggle()) {
        builder = builder.rule(FieldRule::InRange {
            min: RangeBound::coerce(&required_text(answers, &parts::range_min())?),
            max: RangeBound::coerce(&required_text(answers, &parts::range_max())?),
        });
    }
    if flag(answers, &parts::length_toggle()) {
        builder = builder.rule(FieldRule::TextLength {
            max: number(answers, &parts::length_max())?.round() as u32,
        });
    }
    if flag(answers, &parts::case_toggle()) {
        let part = parts::case_kind();
        let code = required_text(answers, &part)?;
        let case = LetterCase::from_code(&code)
            .ok_or_else(|| FormError::bad(&part, format!("unknown case {code}")))?;
        builder = builder.rule(FieldRule::Case { case });
    }
    if flag(answers, &parts::precision_toggle()) {
        builder = builder.rule(FieldRule::Precision {
            decimals: number(answers, &parts::precision_decimals())?.round() as u8,
        });
    }
    if flag(answers, &parts::default_toggle()) {
        builder = builder.rule(FieldRule::Default {
            source: bind_default(answers)?,
        });
    }
    if flag(answers, &parts::activation_toggle()) {
        builder = builder.rule(FieldRule::Activation {
            condition: bind_condition(answers)?,
        });
    }
    if flag(answers, &parts::critical_toggle()) {
        builder = builder.rule(FieldRule::CriticalEvent {
            code: required_text(answers, &parts::critical_code())?,
        });
    }
    Ok(builder)
}

fn bind_default(answers: &AnswerSet) -> Result<DefaultSource, FormError> {
    let part = parts::default_source();
    let source = required_text(answers, &part)?;
    let value = required_text(answers, &parts::default_value())?;
    match source.as_str() {
        "constant" => Ok(DefaultSource::Constant(Value::Text(value))),
        "copy" => Ok(DefaultSource::CopyField(VariableName::parse(&value)?)),
        "formula" => Ok(DefaultSource::Formula(value)),
        other => Err(FormError::bad(&part, format!("unknown source {other}"))),
    }
}

/// A blank equals-part means a truthiness condition
fn bind_condition(answers: &AnswerSet) -> Result<Condition, FormError> {
    let field = VariableName::parse(&required_text(answers, &parts::activation_field())?)?;
    match optional_text(answers, &parts::activation_equals()) {
        Some(value) => Ok(Condition::Equals {
            field,
            value: Value::Text(value),
        }),
        None => Ok(Condition::Truthy { field }),
    }
}

/// Keep the current section unless the sub-form was acknowledged
fn bind_section(
    answers: &AnswerSet,
    current: Option<SectionName>,
) -> Result<Option<SectionName>, FormError> {
    if !flag(answers, &parts::section_ack()) {
        return Ok(current);
    }
    let part = parts::section_choice();
    match required_text(answers, &part)?.as_str() {
        "none" => Ok(None),
        "new" => {
            let name = required_text(answers, &parts::section_new_name())?;
            Ok(Some(SectionName::parse(&name)?))
        }
        other => Err(FormError::bad(&part, format!("unknown section choice {other}"))),
    }
}

fn required_text(answers: &AnswerSet, part: &VariableName) -> Result<String, FormError> {
    optional_text(answers, part).ok_or_else(|| FormError::missing(part))
}

fn optional_text(answers: &AnswerSet, part: &VariableName) -> Option<String> {
    let value = answers.get(part)?;
    let text = value.as_text()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn localized(answers: &AnswerSet, part: &VariableName) -> Result<Text, FormError> {
    answers
        .get(part)
        .and_then(Value::as_localized)
        .filter(|text| !text.is_empty())
        .cloned()
        .ok_or_else(|| FormError::missing(part))
}

fn flag(answers: &AnswerSet, part: &VariableName) -> bool {
    answers.get(part).is_some_and(Value::is_truthy)
}

fn number(answers: &AnswerSet, part: &VariableName) -> Result<f64, FormError> {
    let value = answers.get(part).ok_or_else(|| FormError::missing(part))?;
    value
        .as_number()
        .or_else(|| value.as_text().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| FormError::bad(part, "not a number"))
}

fn list(answers: &AnswerSet, part: &VariableName) -> Vec<String> {
    answers
        .get(part)
        .and_then(Value::as_list)
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_model::FieldShape;

    fn lang(s: &str) -> quill_model::LanguageCode {
        quill_model::LanguageCode::parse(s).unwrap()
    }

    fn base_answers() -> AnswerSet {
        AnswerSet::new()
            .with(parts::field_name(), Value::Text("weight".into()))
            .with(
                parts::wording(1),
                Value::Localized(Text::with(lang("en"), "Weight")),
            )
            .with(parts::type_code(1), Value::Choice("number".into()))
    }

    #[test]
    fn binds_a_minimal_field() {
        let field = FormBinder::bind_field(&base_answers(), None).unwrap();
        assert_eq!(field.name.as_str(), "weight");
        assert_eq!(field.primary_kind(), &FieldKind::Number);
        assert!(field.rules.is_empty());
        assert_eq!(field.section, None);
    }

    #[test]
    fn rule_families_follow_their_toggles() {
        let answers = base_answers()
            .with(parts::required_toggle(), Value::Flag(true))
            .with(parts::range_toggle(), Value::Flag(true))
            .with(parts::range_min(), Value::Text("20".into()))
            .with(parts::range_max(), Value::Text("d.o.b + 100".into()))
            .with(parts::unique_toggle(), Value::Flag(false));

        let field = FormBinder::bind_field(&answers, None).unwrap();
        assert!(field.has_rule("required"));
        assert!(!field.has_rule("unique"));
        let range = field.rule("range").unwrap();
        assert_eq!(
            *range,
            FieldRule::InRange {
                min: RangeBound::Number(20.0),
                max: RangeBound::Formula("d.o.b + 100".into()),
            }
        );
    }

    #[test]
    fn contextual_toggle_wraps_and_unwraps() {
        let wrapped = base_answers().with(parts::contextual_toggle(), Value::Flag(true));
        let field = FormBinder::bind_field(&wrapped, None).unwrap();
        assert!(matches!(field.shape, FieldShape::Contextual { .. }));
        assert_eq!(field.shape.instance_count(), 1);

        let two_instances = wrapped
            .with(parts::type_code(2), Value::Choice("text".into()))
            .with(
                parts::wording(2),
                Value::Localized(Text::with(lang("en"), "Second weight")),
            );
        let field = FormBinder::bind_field(&two_instances, None).unwrap();
        assert_eq!(field.shape.instance_count(), 2);

        let unwrapped = two_instances.with(parts::contextual_toggle(), Value::Flag(false));
        let field = FormBinder::bind_field(&unwrapped, None).unwrap();
        assert_eq!(field.primary_kind(), &FieldKind::Number);
        assert!(matches!(field.shape, FieldShape::Single { .. }));
    }

    #[test]
    fn section_kept_unless_acknowledged() {
        let current = Some(SectionName::parse("vitals").unwrap());

        let untouched = base_answers();
        let field = FormBinder::bind_field(&untouched, current.clone()).unwrap();
        assert_eq!(field.section, current);

        let cleared = base_answers()
            .with(parts::section_ack(), Value::Flag(true))
            .with(parts::section_choice(), Value::Choice("none".into()));
        let field = FormBinder::bind_field(&cleared, current.clone()).unwrap();
        assert_eq!(field.section, None);

        let renamed = base_answers()
            .with(parts::section_ack(), Value::Flag(true))
            .with(parts::section_choice(), Value::Choice("new".into()))
            .with(parts::section_new_name(), Value::Text("history".into()));
        let field = FormBinder::bind_field(&renamed, current).unwrap();
        assert_eq!(field.section, Some(SectionName::parse("history").unwrap()));
    }

    #[test]
    fn missing_name_part_is_a_typed_error() {
        let answers = AnswerSet::new()
            .with(parts::type_code(1), Value::Choice("text".into()))
            .with(
                parts::wording(1),
                Value::Localized(Text::with(lang("en"), "Anything")),
            );
        let err = FormBinder::bind_field(&answers, None).unwrap_err();
        assert_eq!(err, FormError::MissingPart("@name".into()));
    }

    #[test]
    fn scale_arguments_are_bound_per_instance() {
        let answers = base_answers()
            .with(parts::type_code(1), Value::Choice("scale".into()))
            .with(parts::scale_min(1), Value::Number(1.0))
            .with(parts::scale_max(1), Value::Number(5.0));
        let field = FormBinder::bind_field(&answers, None).unwrap();
        assert_eq!(field.primary_kind(), &FieldKind::Scale { min: 1, max: 5 });
    }

    #[test]
    fn binds_group_with_member_pages() {
        let answers = AnswerSet::new()
            .with(parts::group_code(), Value::Text("visits".into()))
            .with(
                parts::group_label(),
                Value::Localized(Text::with(lang("en"), "Visits")),
            )
            .with(
                parts::group_pages(),
                Value::List(vec!["intake".into(), "exam".into()]),
            )
            .with(parts::group_repeating(), Value::Flag(true));

        let group = FormBinder::bind_group(&answers).unwrap();
        assert_eq!(group.code.as_str(), "visits");
        assert!(group.repeating);
        assert_eq!(group.pages.len(), 2);
        assert_eq!(group.pages[0].as_str(), "intake");
    }

    #[test]
    fn workflow_binding_preserves_derivation() {
        let root = quill_model::WorkflowName::parse("standard").unwrap();
        let existing = WorkflowBuilder::new("standard", "short")
            .derived_from(Some(root.clone()))
            .build()
            .unwrap();
        let answers = AnswerSet::new()
            .with(parts::workflow_name(), Value::Text("standard".into()))
            .with(parts::workflow_specifier(), Value::Text("short".into()))
            .with(
                parts::workflow_sequence(),
                Value::List(vec!["intake".into()]),
            );

        let workflow = FormBinder::bind_workflow(&answers, Some(&existing)).unwrap();
        assert_eq!(workflow.derived_from, Some(root));
        assert_eq!(workflow.sequence.len(), 1);
    }

    #[test]
    fn page_binding_preserves_items() {
        let existing = PageBuilder::new("intake")
            .title(Text::with(lang("en"), "Intake"))
            .field(
                FieldBuilder::new("age")
                    .kind(FieldKind::Number)
                    .wording(Text::with(lang("en"), "Age"))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let answers = AnswerSet::new()
            .with(parts::page_name(), Value::Text("intake".into()))
            .with(
                parts::page_title(),
                Value::Localized(Text::with(lang("en"), "Patient intake")),
            );

        let page = FormBinder::bind_page(&answers, Some(&existing)).unwrap();
        assert_eq!(page.len(), 1);
        assert!(page.find_field(&VariableName::parse("age").unwrap()).is_some());
        assert_eq!(page.title.get(&lang("en")), Some("Patient intake"));
    }
}
