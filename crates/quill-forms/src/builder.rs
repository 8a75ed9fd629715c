//! Edit-form construction
//!
//! Builds the ephemeral questionnaire that drives one structural edit: the
//! ordered part fields, the cross rules validating them, and the default
//! answers mirroring the edited entity's current state. Forms are data all
//! the way down; conditional parts (type arguments, rule arguments) are
//! shown through declarative activation conditions on the part fields, never
//! through imperative visibility code.
//!
//! An untouched update form reproduces the status quo: applying it with its
//! own defaults rebuilds an entity semantically equal to the current one.

use crate::error::FormError;
use crate::parts::{self, Parts};
use quill_model::{
    AnswerSet, Condition, CrossRule, DefaultSource, Definition, Field, FieldBuilder, FieldKind,
    FieldRule, LanguageCode, Page, PageBuilder, PageGroup, RangeBound, RuleKind, RuleTrigger,
    Text, UniqueTarget, Value, VariableName, Workflow,
};

/// Builds edit-forms for every operation family
pub struct FormBuilder;

/// Part fields and defaults under construction
struct FormParts {
    lang: LanguageCode,
    fields: Vec<Field>,
    defaults: AnswerSet,
}

impl FormParts {
    fn new(lang: LanguageCode) -> Self {
        Self {
            lang,
            fields: Vec::new(),
            defaults: AnswerSet::new(),
        }
    }

    fn push(&mut self, name: VariableName, kind: FieldKind, label: &str) -> Result<(), FormError> {
        let field = FieldBuilder::named(name)
            .kind(kind)
            .wording(Text::with(self.lang.clone(), label))
            .build()?;
        self.fields.push(field);
        Ok(())
    }

    fn push_when(
        &mut self,
        name: VariableName,
        kind: FieldKind,
        label: &str,
        condition: Condition,
    ) -> Result<(), FormError> {
        let field = FieldBuilder::named(name)
            .kind(kind)
            .wording(Text::with(self.lang.clone(), label))
            .rule(FieldRule::Activation { condition })
            .build()?;
        self.fields.push(field);
        Ok(())
    }

    fn default(&mut self, name: VariableName, value: Value) {
        self.defaults.set(name, value);
    }
}

/// The language part wordings are minted in: the definition's first
/// configured language, or the fallback tag
fn form_language(definition: &Definition) -> LanguageCode {
    definition
        .languages
        .front()
        .cloned()
        .unwrap_or_else(LanguageCode::fallback)
}

fn choice_kind(options: &[&str]) -> FieldKind {
    FieldKind::Choice {
        options: options.iter().map(|o| (*o).to_string()).collect(),
    }
}

fn when_truthy(field: VariableName) -> Condition {
    Condition::Truthy { field }
}

fn when_chosen(field: VariableName, code: &str) -> Condition {
    Condition::Equals {
        field,
        value: Value::Choice(code.to_string()),
    }
}

fn assemble(
    lang: &LanguageCode,
    title: &str,
    form: FormParts,
    rules: Vec<CrossRule>,
) -> Result<Parts, FormError> {
    let mut builder = PageBuilder::named(parts::parts_page()).title(Text::with(lang.clone(), title));
    for field in form.fields {
        builder = builder.field(field);
    }
    let page = builder.build()?;
    let mut group = PageGroup::new(parts::edit_group(), Text::with(lang.clone(), title));
    group.pages.push_back(parts::parts_page());
    tracing::debug!(parts = page.len(), rules = rules.len(), title, "edit-form built");
    Ok(Parts {
        page,
        group,
        rules,
        defaults: form.defaults,
    })
}

/// Render a constant default value back into its form answer
fn render_constant(value: &Value) -> String {
    match value {
        Value::Text(s) | Value::Choice(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Flag(b) => b.to_string(),
        Value::Date(d) => d.to_string(),
        Value::Time(t) => t.to_string(),
        Value::Scale(s) => s.to_string(),
        Value::Score(s) => s.to_string(),
        Value::Localized(text) => text.any().unwrap_or_default().to_string(),
        Value::List(items) => items.join(", "),
    }
}

impl FormBuilder {
    /// Form for inserting (`existing` = `None`) or updating a field
    ///
    /// Parts, in order: variable name and the contextual toggle; per
    /// instance a wording, a type selector and the selected type's argument
    /// parts; one toggle per rule family with its argument parts; metadata;
    /// the section relocation sub-form.
    ///
    /// # Errors
    /// Fails only if a part field cannot be assembled.
    pub fn field_form(
        definition: &Definition,
        existing: Option<&Field>,
    ) -> Result<Parts, FormError> {
        let lang = form_language(definition);
        let mut form = FormParts::new(lang.clone());

        form.push(parts::field_name(), FieldKind::Text, "Variable name")?;
        form.push(parts::contextual_toggle(), FieldKind::Flag, "Asked per context")?;

        let instances = existing.map_or(1, |f| f.shape.instance_count());
        for i in 1..=instances {
            if i == 1 {
                form.push(parts::wording(i), FieldKind::Localized, "Wording")?;
                form.push(
                    parts::type_code(i),
                    choice_kind(FieldKind::codes()),
                    "Type",
                )?;
            } else {
                form.push_when(
                    parts::wording(i),
                    FieldKind::Localized,
                    "Wording",
                    when_truthy(parts::contextual_toggle()),
                )?;
                form.push_when(
                    parts::type_code(i),
                    choice_kind(FieldKind::codes()),
                    "Type",
                    when_truthy(parts::contextual_toggle()),
                )?;
            }
            form.push_when(
                parts::date_format(i),
                choice_kind(&["ymd", "ym", "y"]),
                "Date format",
                when_chosen(parts::type_code(i), "date"),
            )?;
            form.push_when(
                parts::time_seconds(i),
                FieldKind::Flag,
                "With seconds",
                when_chosen(parts::type_code(i), "time"),
            )?;
            form.push_when(
                parts::choice_options(i),
                FieldKind::List,
                "Options",
                when_chosen(parts::type_code(i), "choice"),
            )?;
            form.push_when(
                parts::scale_min(i),
                FieldKind::Number,
                "Lowest position",
                when_chosen(parts::type_code(i), "scale"),
            )?;
            form.push_when(
                parts::scale_max(i),
                FieldKind::Number,
                "Highest position",
                when_chosen(parts::type_code(i), "scale"),
            )?;
            form.push_when(
                parts::score_max(i),
                FieldKind::Number,
                "Best score",
                when_chosen(parts::type_code(i), "score"),
            )?;
        }

        form.push(parts::required_toggle(), FieldKind::Flag, "Required")?;
        form.push(parts::unique_toggle(), FieldKind::Flag, "Unique")?;
        form.push(parts::range_toggle(), FieldKind::Flag, "Bounded")?;
        form.push_when(
            parts::range_min(),
            FieldKind::Text,
            "Lower bound",
            when_truthy(parts::range_toggle()),
        )?;
        form.push_when(
            parts::range_max(),
            FieldKind::Text,
            "Upper bound",
            when_truthy(parts::range_toggle()),
        )?;
        form.push(parts::length_toggle(), FieldKind::Flag, "Length limited")?;
        form.push_when(
            parts::length_max(),
            FieldKind::Number,
            "Maximum length",
            when_truthy(parts::length_toggle()),
        )?;
        form.push(parts::case_toggle(), FieldKind::Flag, "Letter case forced")?;
        form.push_when(
            parts::case_kind(),
            choice_kind(&["upper", "lower"]),
            "Letter case",
            when_truthy(parts::case_toggle()),
        )?;
        form.push(parts::precision_toggle(), FieldKind::Flag, "Precision limited")?;
        form.push_when(
            parts::precision_decimals(),
            FieldKind::Number,
            "Decimals",
            when_truthy(parts::precision_toggle()),
        )?;
        form.push(parts::default_toggle(), FieldKind::Flag, "Pre-filled")?;
        form.push_when(
            parts::default_source(),
            choice_kind(&["constant", "copy", "formula"]),
            "Default source",
            when_truthy(parts::default_toggle()),
        )?;
        form.push_when(
            parts::default_value(),
            FieldKind::Text,
            "Default value",
            when_truthy(parts::default_toggle()),
        )?;
        form.push(parts::activation_toggle(), FieldKind::Flag, "Conditional")?;
        form.push_when(
            parts::activation_field(),
            FieldKind::Text,
            "Watched field",
            when_truthy(parts::activation_toggle()),
        )?;
        form.push_when(
            parts::activation_equals(),
            FieldKind::Text,
            "Watched value",
            when_truthy(parts::activation_toggle()),
        )?;
        form.push(parts::critical_toggle(), FieldKind::Flag, "Critical event")?;
        form.push_when(
            parts::critical_code(),
            FieldKind::Text,
            "Event code",
            when_truthy(parts::critical_toggle()),
        )?;

        form.push(parts::units(), FieldKind::Text, "Units")?;
        form.push(parts::comment(), FieldKind::Text, "Comment")?;
        form.push(parts::pinned_flag(), FieldKind::Flag, "Pinned")?;
        form.push(parts::kpi_flag(), FieldKind::Flag, "Key indicator")?;

        form.push(parts::section_ack(), FieldKind::Flag, "Change section")?;
        form.push_when(
            parts::section_choice(),
            choice_kind(&["none", "new"]),
            "Section",
            when_truthy(parts::section_ack()),
        )?;
        form.push_when(
            parts::section_new_name(),
            FieldKind::Text,
            "New section name",
            when_chosen(parts::section_choice(), "new"),
        )?;

        baseline_field_defaults(&mut form);
        match existing {
            Some(field) => mirror_field(&mut form, field),
            None => form.default(parts::type_code(1), Value::Choice("text".into())),
        }

        let mut required = CrossRule::new("@required_parts", RuleKind::Required, RuleTrigger::OnApply)
            .over(parts::field_name());
        for i in 1..=instances {
            required = required.over(parts::type_code(i));
        }
        let mut wordings = CrossRule::new(
            "@wording_languages",
            RuleKind::RequiredInAllLanguages,
            RuleTrigger::OnApply,
        );
        for i in 1..=instances {
            wordings = wordings.over(parts::wording(i));
        }
        let rules = vec![
            required,
            wordings,
            CrossRule::new(
                "@unique_name",
                RuleKind::Unique(UniqueTarget::Field {
                    exempt: existing.map(|f| f.name.clone()),
                }),
                RuleTrigger::OnApply,
            )
            .over(parts::field_name()),
            CrossRule::new(
                "@precision_bounds",
                RuleKind::InRange {
                    min: RangeBound::Number(0.0),
                    max: RangeBound::Number(10.0),
                },
                RuleTrigger::OnApply,
            )
            .over(parts::precision_decimals()),
            CrossRule::new(
                "@length_bounds",
                RuleKind::InRange {
                    min: RangeBound::Number(1.0),
                    max: RangeBound::Number(4000.0),
                },
                RuleTrigger::OnApply,
            )
            .over(parts::length_max()),
        ];

        let title = if existing.is_some() { "Edit field" } else { "New field" };
        assemble(&lang, title, form, rules)
    }

    /// Form for inserting or updating a page (name and title)
    ///
    /// # Errors
    /// Fails only if a part field cannot be assembled.
    pub fn page_form(definition: &Definition, existing: Option<&Page>) -> Result<Parts, FormError> {
        let lang = form_language(definition);
        let mut form = FormParts::new(lang.clone());
        form.push(parts::page_name(), FieldKind::Text, "Page name")?;
        form.push(parts::page_title(), FieldKind::Localized, "Page title")?;

        if let Some(page) = existing {
            form.default(parts::page_name(), Value::Text(page.name.as_str().into()));
            form.default(parts::page_title(), Value::Localized(page.title.clone()));
        }

        let rules = vec![
            CrossRule::new("@required_parts", RuleKind::Required, RuleTrigger::OnApply)
                .over(parts::page_name()),
            CrossRule::new(
                "@title_languages",
                RuleKind::RequiredInAllLanguages,
                RuleTrigger::OnApply,
            )
            .over(parts::page_title()),
            CrossRule::new(
                "@unique_name",
                RuleKind::Unique(UniqueTarget::Page {
                    exempt: existing.map(|p| p.name.clone()),
                }),
                RuleTrigger::OnApply,
            )
            .over(parts::page_name()),
        ];

        let title = if existing.is_some() { "Edit page" } else { "New page" };
        assemble(&lang, title, form, rules)
    }

    /// Form for inserting or updating a page group (code, label, member
    /// pages, repeating flag)
    ///
    /// # Errors
    /// Fails only if a part field cannot be assembled.
    pub fn group_form(
        definition: &Definition,
        existing: Option<&PageGroup>,
    ) -> Result<Parts, FormError> {
        let lang = form_language(definition);
        let mut form = FormParts::new(lang.clone());
        form.push(parts::group_code(), FieldKind::Text, "Group code")?;
        form.push(parts::group_label(), FieldKind::Localized, "Group label")?;
        form.push(parts::group_pages(), FieldKind::List, "Pages")?;
        form.push(parts::group_repeating(), FieldKind::Flag, "Repeating")?;

        form.default(parts::group_repeating(), Value::Flag(false));
        if let Some(group) = existing {
            form.default(parts::group_code(), Value::Text(group.code.as_str().into()));
            form.default(parts::group_label(), Value::Localized(group.label.clone()));
            form.default(
                parts::group_pages(),
                Value::List(group.pages.iter().map(|p| p.as_str().to_string()).collect()),
            );
            form.default(parts::group_repeating(), Value::Flag(group.repeating));
        }

        let rules = vec![
            CrossRule::new("@required_parts", RuleKind::Required, RuleTrigger::OnApply)
                .over(parts::group_code()),
            CrossRule::new(
                "@label_languages",
                RuleKind::RequiredInAllLanguages,
                RuleTrigger::OnApply,
            )
            .over(parts::group_label()),
            CrossRule::new(
                "@unique_code",
                RuleKind::Unique(UniqueTarget::Group {
                    exempt: existing.map(|g| g.code.clone()),
                }),
                RuleTrigger::OnApply,
            )
            .over(parts::group_code()),
        ];

        let title = if existing.is_some() { "Edit group" } else { "New group" };
        assemble(&lang, title, form, rules)
    }

    /// Form for inserting or updating a workflow (name, specifier, group
    /// sequence)
    ///
    /// # Errors
    /// Fails only if a part field cannot be assembled.
    pub fn workflow_form(
        definition: &Definition,
        existing: Option<&Workflow>,
    ) -> Result<Parts, FormError> {
        let lang = form_language(definition);
        let mut form = FormParts::new(lang.clone());
        form.push(parts::workflow_name(), FieldKind::Text, "Workflow name")?;
        form.push(parts::workflow_specifier(), FieldKind::Text, "Specifier")?;
        form.push(parts::workflow_sequence(), FieldKind::List, "Group sequence")?;

        if let Some(workflow) = existing {
            form.default(
                parts::workflow_name(),
                Value::Text(workflow.name.as_str().into()),
            );
            form.default(
                parts::workflow_specifier(),
                Value::Text(workflow.specifier.clone()),
            );
            form.default(
                parts::workflow_sequence(),
                Value::List(
                    workflow
                        .sequence
                        .iter()
                        .map(|c| c.as_str().to_string())
                        .collect(),
                ),
            );
        }

        let rules = vec![
            CrossRule::new("@required_parts", RuleKind::Required, RuleTrigger::OnApply)
                .over(parts::workflow_name()),
            // Scope order is the workflow identity pair: name, then specifier.
            CrossRule::new(
                "@unique_pair",
                RuleKind::Unique(UniqueTarget::Workflow {
                    exempt: existing.map(|w| (w.name.clone(), w.specifier.clone())),
                }),
                RuleTrigger::OnApply,
            )
            .over(parts::workflow_name())
            .over(parts::workflow_specifier()),
        ];

        let title = if existing.is_some() { "Edit workflow" } else { "New workflow" };
        assemble(&lang, title, form, rules)
    }

    /// Form for any delete: exactly one acknowledgment part
    ///
    /// # Errors
    /// Fails only if the part field cannot be assembled.
    pub fn delete_form(definition: &Definition, label: &str) -> Result<Parts, FormError> {
        let lang = form_language(definition);
        let mut form = FormParts::new(lang.clone());
        form.push(parts::delete_ack(), FieldKind::Flag, label)?;
        let rules = vec![CrossRule::new(
            "@acknowledged",
            RuleKind::Acknowledged,
            RuleTrigger::OnApply,
        )
        .over(parts::delete_ack())];
        assemble(&lang, "Confirm delete", form, rules)
    }

    /// Form for any reorder: no parts, no rules
    ///
    /// # Errors
    /// Fails only if the empty page cannot be assembled.
    pub fn reorder_form(definition: &Definition) -> Result<Parts, FormError> {
        let lang = form_language(definition);
        Ok(Parts::empty(Text::with(lang, "Reorder")))
    }
}

/// Seed every toggle and selector with its untouched-form answer
fn baseline_field_defaults(form: &mut FormParts) {
    form.default(parts::contextual_toggle(), Value::Flag(false));
    for toggle in [
        parts::required_toggle(),
        parts::unique_toggle(),
        parts::range_toggle(),
        parts::length_toggle(),
        parts::case_toggle(),
        parts::precision_toggle(),
        parts::default_toggle(),
        parts::activation_toggle(),
        parts::critical_toggle(),
        parts::pinned_flag(),
        parts::kpi_flag(),
        parts::section_ack(),
    ] {
        form.default(toggle, Value::Flag(false));
    }
    form.default(parts::section_choice(), Value::Choice("none".into()));
}

/// Overwrite the baseline with the edited field's current state
fn mirror_field(form: &mut FormParts, field: &Field) {
    form.default(parts::field_name(), Value::Text(field.name.as_str().into()));
    form.default(
        parts::contextual_toggle(),
        Value::Flag(field.shape.is_contextual()),
    );

    for i in 1..=field.shape.instance_count() {
        if let Some(wording) = field.shape.wording_at(i - 1) {
            form.default(parts::wording(i), Value::Localized(wording.clone()));
        }
        let Some(kind) = field.shape.kind_at(i - 1) else {
            continue;
        };
        form.default(parts::type_code(i), Value::Choice(kind.code().into()));
        match kind {
            FieldKind::Date { format } => {
                form.default(parts::date_format(i), Value::Choice(format.code().into()));
            }
            FieldKind::Time { with_seconds } => {
                form.default(parts::time_seconds(i), Value::Flag(*with_seconds));
            }
            FieldKind::Choice { options } => {
                form.default(
                    parts::choice_options(i),
                    Value::List(options.iter().cloned().collect()),
                );
            }
            FieldKind::Scale { min, max } => {
                form.default(parts::scale_min(i), Value::Number(*min as f64));
                form.default(parts::scale_max(i), Value::Number(*max as f64));
            }
            FieldKind::Score { max } => {
                form.default(parts::score_max(i), Value::Number(f64::from(*max)));
            }
            FieldKind::Text
            | FieldKind::Number
            | FieldKind::Flag
            | FieldKind::Localized
            | FieldKind::List => {}
        }
    }

    for rule in &field.rules {
        match rule {
            FieldRule::Required => form.default(parts::required_toggle(), Value::Flag(true)),
            FieldRule::Unique => form.default(parts::unique_toggle(), Value::Flag(true)),
            FieldRule::InRange { min, max } => {
                form.default(parts::range_toggle(), Value::Flag(true));
                form.default(parts::range_min(), Value::Text(min.to_string()));
                form.default(parts::range_max(), Value::Text(max.to_string()));
            }
            FieldRule::TextLength { max } => {
                form.default(parts::length_toggle(), Value::Flag(true));
                form.default(parts::length_max(), Value::Number(f64::from(*max)));
            }
            FieldRule::Case { case } => {
                form.default(parts::case_toggle(), Value::Flag(true));
                form.default(parts::case_kind(), Value::Choice(case.code().into()));
            }
            FieldRule::Precision { decimals } => {
                form.default(parts::precision_toggle(), Value::Flag(true));
                form.default(
                    parts::precision_decimals(),
                    Value::Number(f64::from(*decimals)),
                );
            }
            FieldRule::Default { source } => {
                form.default(parts::default_toggle(), Value::Flag(true));
                let (code, value) = match source {
                    DefaultSource::Constant(v) => ("constant", render_constant(v)),
                    DefaultSource::CopyField(name) => ("copy", name.as_str().to_string()),
                    DefaultSource::Formula(expr) => ("formula", expr.clone()),
                };
                form.default(parts::default_source(), Value::Choice(code.into()));
                form.default(parts::default_value(), Value::Text(value));
            }
            FieldRule::Activation { condition } => {
                form.default(parts::activation_toggle(), Value::Flag(true));
                match condition {
                    Condition::Truthy { field } => {
                        form.default(
                            parts::activation_field(),
                            Value::Text(field.as_str().into()),
                        );
                    }
                    Condition::Equals { field, value } => {
                        form.default(
                            parts::activation_field(),
                            Value::Text(field.as_str().into()),
                        );
                        form.default(
                            parts::activation_equals(),
                            Value::Text(render_constant(value)),
                        );
                    }
                }
            }
            FieldRule::CriticalEvent { code } => {
                form.default(parts::critical_toggle(), Value::Flag(true));
                form.default(parts::critical_code(), Value::Text(code.clone()));
            }
        }
    }

    if let Some(units) = &field.units {
        form.default(parts::units(), Value::Text(units.clone()));
    }
    if let Some(comment) = &field.comment {
        form.default(parts::comment(), Value::Text(comment.clone()));
    }
    form.default(parts::pinned_flag(), Value::Flag(field.pinned));
    form.default(parts::kpi_flag(), Value::Flag(field.kpi));
}
