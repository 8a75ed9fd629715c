//! Records: a respondent's answers, grouped into interviews
//!
//! A [`Record`] is versioned like the definition and consumed the same way:
//! `Arc` snapshots out, frozen drafts in. Its invariants are relative to a
//! definition, so validation takes the definition the record is paired with.

use crate::definition::Definition;
use crate::error::ModelError;
use crate::name::{GroupCode, VariableName};
use crate::value::{AnswerSet, Value};
use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

/// One answered page group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    /// Group this interview answers
    pub group: GroupCode,
    /// Answers keyed by field name
    pub answers: AnswerSet,
}

impl Interview {
    /// Empty interview for a group
    #[must_use]
    pub fn new(group: GroupCode) -> Self {
        Self {
            group,
            answers: AnswerSet::new(),
        }
    }
}

/// A respondent's record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Participant code
    pub code: String,
    /// Server-assigned identity nonce; 0 until first persisted
    pub nonce: u64,
    /// Monotonic version, bumped on every frozen draft
    pub version: u64,
    /// Free-form metadata
    pub metadata: OrdMap<String, String>,
    /// Interviews, in creation order
    pub interviews: Vector<Interview>,
}

impl Record {
    /// Fresh record with no interviews and no server identity
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            nonce: 0,
            version: 0,
            metadata: OrdMap::new(),
            interviews: Vector::new(),
        }
    }

    /// Whether the store has not yet assigned identity keys
    #[inline]
    #[must_use]
    pub fn needs_identity(&self) -> bool {
        self.nonce == 0
    }

    /// Interview by position
    #[inline]
    #[must_use]
    pub fn interview(&self, index: usize) -> Option<&Interview> {
        self.interviews.get(index)
    }

    /// Position of the first interview answering `group`
    #[must_use]
    pub fn interview_index(&self, group: &GroupCode) -> Option<usize> {
        self.interviews.iter().position(|i| &i.group == group)
    }

    /// First answer recorded for a field, across interviews
    #[must_use]
    pub fn answer(&self, field: &VariableName) -> Option<&Value> {
        self.interviews.iter().find_map(|i| i.answers.get(field))
    }

    /// How many interviews carry an answer for a field
    #[must_use]
    pub fn answer_count(&self, field: &VariableName) -> usize {
        self.interviews
            .iter()
            .filter(|i| i.answers.get(field).is_some())
            .count()
    }

    /// Check the record against its paired definition
    ///
    /// # Errors
    /// Fails when an interview answers a group the definition does not
    /// carry, or an answer names a field no page owns.
    pub fn validate_against(&self, definition: &Definition) -> Result<(), ModelError> {
        for interview in &self.interviews {
            if definition.group(&interview.group).is_none() {
                return Err(ModelError::OrphanInterview(interview.group.clone()));
            }
            for (name, _) in interview.answers.iter() {
                if definition.find_field(name).is_none() {
                    return Err(ModelError::OrphanAnswer(name.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{DefinitionBuilder, FieldBuilder, GroupBuilder, PageBuilder};
    use crate::field::FieldKind;
    use crate::language::{LanguageCode, Text};

    fn lang(s: &str) -> LanguageCode {
        LanguageCode::parse(s).unwrap()
    }

    fn var(s: &str) -> VariableName {
        VariableName::parse(s).unwrap()
    }

    fn definition() -> Definition {
        DefinitionBuilder::new("demo")
            .language(lang("en"))
            .page(
                PageBuilder::new("visit")
                    .title(Text::with(lang("en"), "Visit"))
                    .field(
                        FieldBuilder::new("weight")
                            .kind(FieldKind::Number)
                            .wording(Text::with(lang("en"), "Weight"))
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap(),
            )
            .group(
                GroupBuilder::new("baseline")
                    .label(Text::with(lang("en"), "Baseline"))
                    .page(crate::name::PageName::parse("visit").unwrap())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn answers_are_found_across_interviews() {
        let mut record = Record::new("p01");
        let mut first = Interview::new(GroupCode::parse("baseline").unwrap());
        first.answers.set(var("weight"), Value::Number(72.5));
        record.interviews.push_back(first);
        record
            .interviews
            .push_back(Interview::new(GroupCode::parse("followup").unwrap()));

        assert_eq!(record.answer(&var("weight")), Some(&Value::Number(72.5)));
        assert_eq!(record.answer_count(&var("weight")), 1);
        assert_eq!(
            record.interview_index(&GroupCode::parse("followup").unwrap()),
            Some(1)
        );
    }

    #[test]
    fn validation_catches_orphans() {
        let definition = definition();

        let mut record = Record::new("p01");
        record
            .interviews
            .push_back(Interview::new(GroupCode::parse("ghost").unwrap()));
        assert!(matches!(
            record.validate_against(&definition),
            Err(ModelError::OrphanInterview(_))
        ));

        let mut record = Record::new("p02");
        let mut interview = Interview::new(GroupCode::parse("baseline").unwrap());
        interview.answers.set(var("ghost"), Value::Flag(true));
        record.interviews.push_back(interview);
        assert!(matches!(
            record.validate_against(&definition),
            Err(ModelError::OrphanAnswer(_))
        ));
    }

    #[test]
    fn fresh_records_need_identity() {
        let mut record = Record::new("p01");
        assert!(record.needs_identity());
        record.nonce = 7;
        assert!(!record.needs_identity());
    }
}
