//! Cross-field rules and the generic rule-execution engine
//!
//! Rules are data, not code: a [`CrossRule`] names the fields it watches (its
//! *scope*) and carries a closed [`RuleKind`]. The engine walks an answer set
//! and reports [`RuleViolation`]s; it never mutates anything. Ordinary
//! questionnaires and edit-forms run through the same engine, which is what
//! lets an edit-form reuse the questionnaire validation pipeline wholesale.

use crate::definition::Definition;
use crate::field::RangeBound;
use crate::name::{GroupCode, PageName, VariableName, WorkflowName};
use crate::value::{AnswerSet, Value};
use im::Vector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Violation message key: answer missing
pub const KEY_REQUIRED: &str = "required";
/// Violation message key: name already taken
pub const KEY_UNIQUE: &str = "unique";
/// Violation message key: wording missing a configured language
pub const KEY_LANGUAGES: &str = "languages";
/// Violation message key: value outside bounds
pub const KEY_RANGE: &str = "range";
/// Violation message key: acknowledgment not given
pub const KEY_ACKNOWLEDGE: &str = "acknowledge";

/// When a rule runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTrigger {
    /// Evaluated when an edit is checked or applied
    OnApply,
    /// Evaluated whenever a scoped answer changes
    OnChange,
}

/// Which survey-unique namespace a uniqueness rule checks against
///
/// Each variant may exempt the entity currently being edited, so updating an
/// entity without renaming it does not collide with itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum UniqueTarget {
    /// Field variable names
    Field {
        /// Name exempt from the check
        exempt: Option<VariableName>,
    },
    /// Page names
    Page {
        /// Name exempt from the check
        exempt: Option<PageName>,
    },
    /// Page-group codes
    Group {
        /// Code exempt from the check
        exempt: Option<GroupCode>,
    },
    /// Workflow name + specifier pairs; scope order is `[name, specifier]`
    Workflow {
        /// Pair exempt from the check
        exempt: Option<(WorkflowName, String)>,
    },
}

/// Closed set of rule behaviors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Every scoped field must be answered
    Required,
    /// Every scoped field must be answered with a true flag
    Acknowledged,
    /// Scoped answers must not collide with existing names
    Unique(UniqueTarget),
    /// Non-empty localized answers must cover all configured languages
    LanguagesComplete,
    /// Localized answers must be present in every configured language
    RequiredInAllLanguages,
    /// Comparable answers must fall inside bounds
    InRange {
        /// Lower bound
        min: RangeBound,
        /// Upper bound
        max: RangeBound,
    },
}

/// A named rule over a scope of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRule {
    /// Rule name (reserved `@` prefix marks edit-form rules)
    pub name: String,
    /// Watched fields, in declaration order
    pub scope: Vector<VariableName>,
    /// Behavior
    pub kind: RuleKind,
    /// When the rule runs
    pub trigger: RuleTrigger,
}

impl CrossRule {
    /// Rule with an empty scope
    #[must_use]
    pub fn new(name: impl Into<String>, kind: RuleKind, trigger: RuleTrigger) -> Self {
        Self {
            name: name.into(),
            scope: Vector::new(),
            kind,
            trigger,
        }
    }

    /// Add a field to the scope
    #[must_use]
    pub fn over(mut self, field: VariableName) -> Self {
        self.scope.push_back(field);
        self
    }

    /// Whether `field` is in scope
    #[inline]
    #[must_use]
    pub fn watches(&self, field: &VariableName) -> bool {
        self.scope.contains(field)
    }
}

/// One reported rule failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    /// Name of the violated rule
    pub rule: String,
    /// Message key (`required`, `unique`, `languages`, `range`, `acknowledge`)
    pub key: String,
    /// Offending field, when attributable to one
    pub field: Option<VariableName>,
    /// Human-readable detail
    pub detail: String,
}

impl RuleViolation {
    fn new(rule: &CrossRule, key: &str, field: Option<&VariableName>, detail: String) -> Self {
        Self {
            rule: rule.name.clone(),
            key: key.to_string(),
            field: field.cloned(),
            detail,
        }
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{} [{}] {}: {}", self.rule, self.key, field, self.detail),
            None => write!(f, "{} [{}]: {}", self.rule, self.key, self.detail),
        }
    }
}

/// Evaluate rules with a matching trigger against an answer set
///
/// Uniqueness and language completeness consult `definition` for the
/// existing-name namespaces and the configured language list. The engine is
/// pure; a non-empty result is a validation outcome, not an error.
pub fn evaluate<'a, I>(
    rules: I,
    trigger: RuleTrigger,
    answers: &AnswerSet,
    definition: &Definition,
) -> Vec<RuleViolation>
where
    I: IntoIterator<Item = &'a CrossRule>,
{
    let mut violations = Vec::new();
    for rule in rules {
        if rule.trigger != trigger {
            continue;
        }
        match &rule.kind {
            RuleKind::Required => check_required(rule, answers, &mut violations),
            RuleKind::Acknowledged => check_acknowledged(rule, answers, &mut violations),
            RuleKind::Unique(target) => {
                check_unique(rule, target, answers, definition, &mut violations);
            }
            RuleKind::LanguagesComplete => {
                check_languages(rule, answers, definition, false, &mut violations);
            }
            RuleKind::RequiredInAllLanguages => {
                check_languages(rule, answers, definition, true, &mut violations);
            }
            RuleKind::InRange { min, max } => check_range(rule, min, max, answers, &mut violations),
        }
    }
    violations
}

fn check_required(rule: &CrossRule, answers: &AnswerSet, out: &mut Vec<RuleViolation>) {
    for field in &rule.scope {
        if !answers.answered(field) {
            out.push(RuleViolation::new(
                rule,
                KEY_REQUIRED,
                Some(field),
                "answer is required".to_string(),
            ));
        }
    }
}

fn check_acknowledged(rule: &CrossRule, answers: &AnswerSet, out: &mut Vec<RuleViolation>) {
    for field in &rule.scope {
        let acknowledged = answers.get(field).is_some_and(Value::is_truthy);
        if !acknowledged {
            out.push(RuleViolation::new(
                rule,
                KEY_ACKNOWLEDGE,
                Some(field),
                "acknowledgment is required".to_string(),
            ));
        }
    }
}

fn check_unique(
    rule: &CrossRule,
    target: &UniqueTarget,
    answers: &AnswerSet,
    definition: &Definition,
    out: &mut Vec<RuleViolation>,
) {
    // The workflow namespace is keyed by a pair, read from the first two
    // scoped parts; the other namespaces check each scoped answer on its own.
    if let UniqueTarget::Workflow { exempt } = target {
        let Some(name) = rule.scope.get(0).and_then(|f| text_answer(answers, f)) else {
            return;
        };
        // A blank specifier is the root specifier, not an unanswered part.
        let spec = rule
            .scope
            .get(1)
            .and_then(|f| answers.get(f))
            .and_then(Value::as_text)
            .map_or("", str::trim);
        let exempted = exempt
            .as_ref()
            .is_some_and(|(n, s)| n.as_str() == name && s == spec);
        let taken = definition
            .workflows
            .iter()
            .any(|wf| wf.name.as_str() == name && wf.specifier == spec);
        if taken && !exempted {
            out.push(RuleViolation::new(
                rule,
                KEY_UNIQUE,
                rule.scope.get(0),
                format!("workflow {name}/{spec} already exists"),
            ));
        }
        return;
    }

    for field in &rule.scope {
        let Some(candidate) = text_answer(answers, field) else {
            continue;
        };
        let collision = match target {
            UniqueTarget::Field { exempt } => {
                exempt.as_ref().map(VariableName::as_str) != Some(candidate)
                    && definition.has_field(candidate)
            }
            UniqueTarget::Page { exempt } => {
                exempt.as_ref().map(PageName::as_str) != Some(candidate)
                    && definition.pages.iter().any(|p| p.name.as_str() == candidate)
            }
            UniqueTarget::Group { exempt } => {
                exempt.as_ref().map(GroupCode::as_str) != Some(candidate)
                    && definition.groups.iter().any(|g| g.code.as_str() == candidate)
            }
            UniqueTarget::Workflow { .. } => false,
        };
        if collision {
            out.push(RuleViolation::new(
                rule,
                KEY_UNIQUE,
                Some(field),
                format!("name {candidate} already exists"),
            ));
        }
    }
}

fn check_languages(
    rule: &CrossRule,
    answers: &AnswerSet,
    definition: &Definition,
    required: bool,
    out: &mut Vec<RuleViolation>,
) {
    let configured: Vec<_> = definition.languages.iter().cloned().collect();
    for field in &rule.scope {
        let localized = answers.get(field).and_then(Value::as_localized);
        match localized {
            Some(text) if text.is_empty() && !required => {}
            Some(text) if text.is_complete(&configured) => {}
            Some(text) => {
                let missing: Vec<&str> = configured
                    .iter()
                    .filter(|lang| text.get(lang).map_or(true, str::is_empty))
                    .map(|lang| lang.as_str())
                    .collect();
                out.push(RuleViolation::new(
                    rule,
                    KEY_LANGUAGES,
                    Some(field),
                    format!("missing languages: {}", missing.join(", ")),
                ));
            }
            None if required => {
                out.push(RuleViolation::new(
                    rule,
                    KEY_LANGUAGES,
                    Some(field),
                    "wording is required in every language".to_string(),
                ));
            }
            None => {}
        }
    }
}

fn check_range(
    rule: &CrossRule,
    min: &RangeBound,
    max: &RangeBound,
    answers: &AnswerSet,
    out: &mut Vec<RuleViolation>,
) {
    for field in &rule.scope {
        let Some(value) = answers.get(field) else {
            continue;
        };
        if let Some(detail) = range_breach(value, min, max) {
            out.push(RuleViolation::new(rule, KEY_RANGE, Some(field), detail));
        }
    }
}

/// Compare a value against bounds of a matching kind
///
/// Formula bounds are not evaluated by the core and never breach here;
/// bounds of a kind the value cannot be compared to are skipped likewise.
fn range_breach(value: &Value, min: &RangeBound, max: &RangeBound) -> Option<String> {
    if let Some(n) = value.as_number() {
        if let RangeBound::Number(lo) = min {
            if n < *lo {
                return Some(format!("{n} is below {lo}"));
            }
        }
        if let RangeBound::Number(hi) = max {
            if n > *hi {
                return Some(format!("{n} is above {hi}"));
            }
        }
    }
    if let Value::Date(d) = value {
        if let RangeBound::Date(lo) = min {
            if d < lo {
                return Some(format!("{d} is before {lo}"));
            }
        }
        if let RangeBound::Date(hi) = max {
            if d > hi {
                return Some(format!("{d} is after {hi}"));
            }
        }
    }
    None
}

fn text_answer<'a>(answers: &'a AnswerSet, field: &VariableName) -> Option<&'a str> {
    answers
        .get(field)
        .and_then(Value::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
