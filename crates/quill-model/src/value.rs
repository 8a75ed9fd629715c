//! Answer values and answer sets
//!
//! A [`Value`] is one recorded answer; an [`AnswerSet`] maps variable names
//! to values. Both real interviews and edit-forms speak this vocabulary, so
//! the same binding and validation pipeline serves both.

use crate::language::Text;
use crate::name::VariableName;
use chrono::{NaiveDate, NaiveTime};
use im::OrdMap;
use serde::{Deserialize, Serialize};

/// One answer value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Boolean toggle
    Flag(bool),
    /// Free numeric answer
    Number(f64),
    /// Free text answer
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Selected choice option
    Choice(String),
    /// Position on a discrete scale
    Scale(i64),
    /// Awarded score points
    Score(u32),
    /// Multilingual text (wording parts)
    Localized(Text),
    /// Ordered list of names/codes/options
    List(Vec<String>),
}

impl Value {
    /// True when the value carries no information
    ///
    /// Blank values count as unanswered for required-field checks; a `Flag`
    /// is never blank (false is an answer, acknowledgment rules gate on
    /// truthiness instead).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) | Self::Choice(s) => s.trim().is_empty(),
            Self::Localized(t) => t.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Flag(_)
            | Self::Number(_)
            | Self::Date(_)
            | Self::Time(_)
            | Self::Scale(_)
            | Self::Score(_) => false,
        }
    }

    /// Truthiness for toggle answers
    ///
    /// Only `Flag(true)` is truthy; everything else (including a non-empty
    /// text) is not a toggle and reads as false.
    #[inline]
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        matches!(self, Self::Flag(true))
    }

    /// Numeric view of the value, if it has one
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            #[allow(clippy::cast_precision_loss)]
            Self::Scale(n) => Some(*n as f64),
            Self::Score(n) => Some(f64::from(*n)),
            _ => None,
        }
    }

    /// Text view of the value, if it has one
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Choice(s) => Some(s),
            _ => None,
        }
    }

    /// Localized view of the value, if it has one
    #[must_use]
    pub fn as_localized(&self) -> Option<&Text> {
        match self {
            Self::Localized(t) => Some(t),
            _ => None,
        }
    }

    /// List view of the value, if it has one
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Ordered collection of answers keyed by variable name
///
/// Backed by a structurally-shared map, so cloning a set (and with it a
/// whole record snapshot) is cheap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(OrdMap<VariableName, Value>);

impl AnswerSet {
    /// Empty answer set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, replacing any previous one
    pub fn set(&mut self, name: VariableName, value: Value) {
        self.0.insert(name, value);
    }

    /// Chainable form of [`AnswerSet::set`]
    #[must_use]
    pub fn with(mut self, name: VariableName, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Answer for a field, if present
    #[inline]
    #[must_use]
    pub fn get(&self, name: &VariableName) -> Option<&Value> {
        self.0.get(name)
    }

    /// Remove an answer
    pub fn remove(&mut self, name: &VariableName) -> Option<Value> {
        self.0.remove(name)
    }

    /// True when a non-blank answer exists for the field
    #[must_use]
    pub fn answered(&self, name: &VariableName) -> bool {
        self.get(name).is_some_and(|v| !v.is_blank())
    }

    /// Number of answers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no answers exist
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate answers in name order
    pub fn iter(&self) -> impl Iterator<Item = (&VariableName, &Value)> {
        self.0.iter()
    }

    /// These answers layered over `defaults`
    ///
    /// Every default survives unless this set carries an answer for the same
    /// name; the edit-form pipeline validates and binds the merged view so an
    /// untouched form reproduces the status quo.
    #[must_use]
    pub fn merged_over(&self, defaults: &AnswerSet) -> AnswerSet {
        let mut merged = defaults.clone();
        for (name, value) in &self.0 {
            merged.0.insert(name.clone(), value.clone());
        }
        merged
    }
}

impl FromIterator<(VariableName, Value)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (VariableName, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
