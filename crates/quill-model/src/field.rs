//! Fields: typed value shapes, per-field rules, contextual instances
//!
//! A [`Field`] couples a survey-unique variable name with a value shape.
//! Shapes come in two flavors: a plain single wording/type pair, or a
//! *contextual* multi-instance container where several wording/type pairs
//! share one variable name. The wording list and the type list are parallel
//! families whose instance counts are reconciled by [`pad_cyclic`].

use crate::error::ModelError;
use crate::language::Text;
use crate::name::{SectionName, VariableName};
use crate::value::Value;
use chrono::NaiveDate;
use im::Vector;
use serde::{Deserialize, Serialize};

/// Date display granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// Year, month and day
    #[default]
    YearMonthDay,
    /// Year and month only
    YearMonth,
    /// Year only
    Year,
}

impl DateFormat {
    /// Stable code used by edit-form selectors
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::YearMonthDay => "ymd",
            Self::YearMonth => "ym",
            Self::Year => "y",
        }
    }

    /// Parse a selector code
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ymd" => Some(Self::YearMonthDay),
            "ym" => Some(Self::YearMonth),
            "y" => Some(Self::Year),
            _ => None,
        }
    }
}

/// Typed value shape of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text
    Text,
    /// Free number
    Number,
    /// Yes/no flag
    Flag,
    /// Calendar date with display format
    Date {
        /// Display granularity
        format: DateFormat,
    },
    /// Time of day
    Time {
        /// Whether seconds are captured
        with_seconds: bool,
    },
    /// Single selection among options
    Choice {
        /// Option labels, in display order
        options: Vector<String>,
    },
    /// Discrete scale between two bounds
    Scale {
        /// Lowest position
        min: i64,
        /// Highest position
        max: i64,
    },
    /// Score with a point ceiling
    Score {
        /// Maximum points
        max: u32,
    },
    /// Multilingual text (one value per configured language)
    Localized,
    /// List of strings
    List,
}

impl FieldKind {
    /// Stable type code used by edit-form type selectors
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Flag => "flag",
            Self::Date { .. } => "date",
            Self::Time { .. } => "time",
            Self::Choice { .. } => "choice",
            Self::Scale { .. } => "scale",
            Self::Score { .. } => "score",
            Self::Localized => "localized",
            Self::List => "list",
        }
    }

    /// Selector codes offered to operators, in selector display order
    ///
    /// `localized` and `list` are internal kinds (edit-form parts); the
    /// selector does not offer them.
    #[must_use]
    pub fn codes() -> &'static [&'static str] {
        &[
            "text", "number", "flag", "date", "time", "choice", "scale", "score",
        ]
    }

    /// Validate shape-level invariants
    ///
    /// # Errors
    /// Rejects inverted scales and optionless choices.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Self::Scale { min, max } if min > max => Err(ModelError::InvertedScale {
                min: *min,
                max: *max,
            }),
            Self::Choice { options } if options.is_empty() => Err(ModelError::EmptyChoice),
            _ => Ok(()),
        }
    }
}

/// Letter-case constraint for text answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterCase {
    /// Uppercase only
    Upper,
    /// Lowercase only
    Lower,
}

impl LetterCase {
    /// Stable selector code
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
        }
    }

    /// Parse a selector code
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "upper" => Some(Self::Upper),
            "lower" => Some(Self::Lower),
            _ => None,
        }
    }
}

/// One bound of an in-range rule
///
/// Free-text bounds coerce in a fixed order: numeric first, then ISO date,
/// then an unevaluated formula expression; the first successful parse wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RangeBound {
    /// Numeric bound
    Number(f64),
    /// Date bound
    Date(NaiveDate),
    /// Unevaluated formula expression
    Formula(String),
}

impl RangeBound {
    /// Coerce a free-text bound: numeric, then date, then formula
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<f64>() {
            return Self::Number(n);
        }
        if let Ok(d) = trimmed.parse::<NaiveDate>() {
            return Self::Date(d);
        }
        Self::Formula(trimmed.to_string())
    }
}

impl std::fmt::Display for RangeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Formula(expr) => f.write_str(expr),
        }
    }
}

/// Where a field's default answer comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum DefaultSource {
    /// Fixed value
    Constant(Value),
    /// Copied from another field's answer
    CopyField(VariableName),
    /// Unevaluated formula expression
    Formula(String),
}

/// Declarative show/hide or trigger condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Condition {
    /// Field's answer is a true flag
    Truthy {
        /// Observed field
        field: VariableName,
    },
    /// Field's answer equals a value
    Equals {
        /// Observed field
        field: VariableName,
        /// Expected answer
        value: Value,
    },
}

impl Condition {
    /// Evaluate against an answer set
    #[must_use]
    pub fn holds(&self, answers: &crate::value::AnswerSet) -> bool {
        match self {
            Self::Truthy { field } => answers.get(field).is_some_and(Value::is_truthy),
            Self::Equals { field, value } => answers.get(field) == Some(value),
        }
    }

    /// The field this condition observes
    #[must_use]
    pub fn observed(&self) -> &VariableName {
        match self {
            Self::Truthy { field } | Self::Equals { field, .. } => field,
        }
    }
}

/// Per-field rule, one variant per rule family
///
/// Families are all-or-nothing: binding a field attaches a family iff its
/// edit-form toggle was answered truthy, never by inheriting the previous
/// field's rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    /// Answer must be present
    Required,
    /// Answer must be unique across records
    Unique,
    /// Text answers constrained to one letter case
    Case {
        /// Constraint
        case: LetterCase,
    },
    /// Answer must fall inside bounds
    InRange {
        /// Lower bound
        min: RangeBound,
        /// Upper bound
        max: RangeBound,
    },
    /// Text answers capped at a length
    TextLength {
        /// Maximum character count
        max: u32,
    },
    /// Numeric answers capped at a decimal precision
    Precision {
        /// Decimal places
        decimals: u8,
    },
    /// Pre-populated answer
    Default {
        /// Default origin
        source: DefaultSource,
    },
    /// Field shown only while the condition holds
    Activation {
        /// Show condition
        condition: Condition,
    },
    /// Answering flags a critical event
    CriticalEvent {
        /// Event code
        code: String,
    },
}

impl FieldRule {
    /// Stable family tag (one per rule family)
    #[must_use]
    pub fn family(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Unique => "unique",
            Self::Case { .. } => "case",
            Self::InRange { .. } => "range",
            Self::TextLength { .. } => "length",
            Self::Precision { .. } => "precision",
            Self::Default { .. } => "default",
            Self::Activation { .. } => "activation",
            Self::CriticalEvent { .. } => "critical",
        }
    }
}

/// Value shape of a field: single, or contextual multi-instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum FieldShape {
    /// One wording, one type
    Single {
        /// Value shape
        kind: FieldKind,
        /// Display wording
        wording: Text,
    },
    /// Several wording/type instances sharing one variable name
    ///
    /// Invariant: `kinds.len() == wordings.len() > 0` (enforced at build
    /// time via [`pad_cyclic`]).
    Contextual {
        /// Type per instance
        kinds: Vector<FieldKind>,
        /// Wording per instance
        wordings: Vector<Text>,
    },
}

impl FieldShape {
    /// Number of instances (1 for single fields)
    #[must_use]
    pub fn instance_count(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::Contextual { kinds, .. } => kinds.len(),
        }
    }

    /// Whether this is the multi-instance container
    #[inline]
    #[must_use]
    pub fn is_contextual(&self) -> bool {
        matches!(self, Self::Contextual { .. })
    }

    /// Kind of instance `index` (0 for single fields)
    #[must_use]
    pub fn kind_at(&self, index: usize) -> Option<&FieldKind> {
        match self {
            Self::Single { kind, .. } => (index == 0).then_some(kind),
            Self::Contextual { kinds, .. } => kinds.get(index),
        }
    }

    /// Wording of instance `index` (0 for single fields)
    #[must_use]
    pub fn wording_at(&self, index: usize) -> Option<&Text> {
        match self {
            Self::Single { wording, .. } => (index == 0).then_some(wording),
            Self::Contextual { wordings, .. } => wordings.get(index),
        }
    }

    /// Wrap into the multi-instance container (no-op when already wrapped)
    ///
    /// A single shape becomes one-element instance lists.
    #[must_use]
    pub fn into_contextual(self) -> Self {
        match self {
            Self::Single { kind, wording } => Self::Contextual {
                kinds: Vector::unit(kind),
                wordings: Vector::unit(wording),
            },
            contextual @ Self::Contextual { .. } => contextual,
        }
    }

    /// Unwrap out of the multi-instance container, keeping only the first
    /// instance's values (no-op when already single)
    ///
    /// # Errors
    /// Fails on an empty contextual container.
    pub fn into_single(self) -> Result<Self, ModelError> {
        match self {
            single @ Self::Single { .. } => Ok(single),
            Self::Contextual { kinds, wordings } => {
                let kind = kinds.front().cloned().ok_or(ModelError::EmptyContext)?;
                let wording = wordings.front().cloned().ok_or(ModelError::EmptyContext)?;
                Ok(Self::Single { kind, wording })
            }
        }
    }

    /// Validate shape invariants (instance parity, per-kind checks)
    ///
    /// # Errors
    /// Fails on empty or unbalanced contextual lists or invalid kinds.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Self::Single { kind, .. } => kind.validate(),
            Self::Contextual { kinds, wordings } => {
                if kinds.is_empty() || kinds.len() != wordings.len() {
                    return Err(ModelError::EmptyContext);
                }
                for kind in kinds {
                    kind.validate()?;
                }
                Ok(())
            }
        }
    }
}

/// Cyclically extend the shorter of two instance families
///
/// One-shot list operation: while `list` is shorter than `target_len`, its
/// own existing entries are appended again in order (`[a, b]` padded to 5
/// becomes `[a, b, a, b, a]`). Lists at or beyond the target length are
/// returned untouched. An empty list cannot be extended and is returned
/// empty.
#[must_use]
pub fn pad_cyclic<T: Clone>(list: Vector<T>, target_len: usize) -> Vector<T> {
    if list.is_empty() || list.len() >= target_len {
        return list;
    }
    let seed: Vec<T> = list.iter().cloned().collect();
    let mut padded = list;
    let mut cursor = 0usize;
    while padded.len() < target_len {
        padded.push_back(seed[cursor % seed.len()].clone());
        cursor += 1;
    }
    padded
}

/// A questionnaire field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Survey-unique variable name
    pub name: VariableName,
    /// Value shape (single or contextual)
    pub shape: FieldShape,
    /// Attached rule families
    pub rules: Vector<FieldRule>,
    /// Section membership within the owning page
    pub section: Option<SectionName>,
    /// Measurement units shown beside the answer
    pub units: Option<String>,
    /// Designer comment
    pub comment: Option<String>,
    /// Pinned to dashboards
    pub pinned: bool,
    /// Counts as a key performance indicator
    pub kpi: bool,
}

impl Field {
    /// Rule of a family, if attached
    #[must_use]
    pub fn rule(&self, family: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.family() == family)
    }

    /// Whether a rule family is attached
    #[inline]
    #[must_use]
    pub fn has_rule(&self, family: &str) -> bool {
        self.rule(family).is_some()
    }

    /// First (or only) instance kind
    ///
    /// # Panics
    /// Panics on a contextual shape with zero instances; construction and
    /// freezing both reject that shape.
    #[must_use]
    pub fn primary_kind(&self) -> &FieldKind {
        match &self.shape {
            FieldShape::Single { kind, .. } => kind,
            FieldShape::Contextual { kinds, .. } => {
                kinds.front().expect("contextual shape is non-empty")
            }
        }
    }

    /// First (or only) wording
    ///
    /// # Panics
    /// Panics on a contextual shape with zero instances; construction and
    /// freezing both reject that shape.
    #[must_use]
    pub fn primary_wording(&self) -> &Text {
        match &self.shape {
            FieldShape::Single { wording, .. } => wording,
            FieldShape::Contextual { wordings, .. } => {
                wordings.front().expect("contextual shape is non-empty")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageCode;

    fn en() -> LanguageCode {
        LanguageCode::parse("en").unwrap()
    }

    #[test]
    fn pad_cyclic_extends_from_own_entries() {
        let padded = pad_cyclic(Vector::from(vec!["a", "b"]), 5);
        assert_eq!(padded.iter().copied().collect::<Vec<_>>(), [
            "a", "b", "a", "b", "a"
        ]);
    }

    #[test]
    fn pad_cyclic_leaves_long_enough_lists() {
        let list = Vector::from(vec![1, 2, 3]);
        assert_eq!(pad_cyclic(list.clone(), 2), list);
        assert_eq!(pad_cyclic(list.clone(), 3), list);
    }

    #[test]
    fn pad_cyclic_cannot_extend_empty() {
        let empty: Vector<u8> = Vector::new();
        assert!(pad_cyclic(empty, 4).is_empty());
    }

    #[test]
    fn shape_wrap_produces_one_element_lists() {
        let single = FieldShape::Single {
            kind: FieldKind::Text,
            wording: Text::with(en(), "Name"),
        };
        let wrapped = single.into_contextual();
        match &wrapped {
            FieldShape::Contextual { kinds, wordings } => {
                assert_eq!(kinds.len(), 1);
                assert_eq!(wordings.len(), 1);
            }
            FieldShape::Single { .. } => panic!("expected contextual"),
        }
        // Wrapping twice changes nothing.
        assert_eq!(wrapped.clone().into_contextual(), wrapped);
    }

    #[test]
    fn shape_unwrap_keeps_first_instance() {
        let contextual = FieldShape::Contextual {
            kinds: Vector::from(vec![FieldKind::Number, FieldKind::Text]),
            wordings: Vector::from(vec![Text::with(en(), "Weight"), Text::with(en(), "Note")]),
        };
        let single = contextual.into_single().unwrap();
        assert_eq!(single, FieldShape::Single {
            kind: FieldKind::Number,
            wording: Text::with(en(), "Weight"),
        });
    }

    #[test]
    fn shape_validation_catches_imbalance() {
        let unbalanced = FieldShape::Contextual {
            kinds: Vector::from(vec![FieldKind::Text]),
            wordings: Vector::new(),
        };
        assert!(unbalanced.validate().is_err());
    }

    #[test]
    fn kind_validation() {
        assert!(FieldKind::Scale { min: 5, max: 1 }.validate().is_err());
        assert!(FieldKind::Choice {
            options: Vector::new()
        }
        .validate()
        .is_err());
        assert!(FieldKind::Scale { min: 1, max: 5 }.validate().is_ok());
    }

    #[test]
    fn range_bound_coercion_order() {
        assert_eq!(RangeBound::coerce("42"), RangeBound::Number(42.0));
        assert_eq!(RangeBound::coerce("-3.5"), RangeBound::Number(-3.5));
        assert_eq!(
            RangeBound::coerce("2024-01-31"),
            RangeBound::Date("2024-01-31".parse().unwrap())
        );
        assert_eq!(
            RangeBound::coerce("weight * 2"),
            RangeBound::Formula("weight * 2".into())
        );
    }

    proptest::proptest! {
        #[test]
        fn pad_cyclic_reaches_target(len in 1usize..6, target in 0usize..24) {
            let list: Vector<usize> = (0..len).collect();
            let padded = pad_cyclic(list, target);
            proptest::prop_assert_eq!(padded.len(), target.max(len));
        }

        #[test]
        fn pad_cyclic_repeats_seed(len in 1usize..5, target in 5usize..20) {
            let list: Vector<usize> = (0..len).collect();
            let padded = pad_cyclic(list, target);
            for (i, value) in padded.iter().enumerate() {
                proptest::prop_assert_eq!(*value, i % len);
            }
        }
    }
}
