//! Validated identifier newtypes
//!
//! Every addressable entity carries a validated name: fields use
//! [`VariableName`], pages [`PageName`], page-groups [`GroupCode`], sections
//! [`SectionName`], workflows [`WorkflowName`]. All share one grammar:
//! a letter followed by letters, digits or underscores.
//!
//! Edit-form parts live in a reserved `@`-prefixed namespace that only
//! [`VariableName::reserved`] can mint, so synthesized parts can be spliced
//! into a definition without ever colliding with respondent-facing fields.

use crate::error::ModelError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("name grammar"));

fn check_grammar(raw: &str) -> Result<(), ModelError> {
    if NAME_RE.is_match(raw) {
        Ok(())
    } else {
        Err(ModelError::InvalidName(raw.to_string()))
    }
}

macro_rules! name_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse a user-supplied identifier
            ///
            /// # Errors
            /// Returns [`ModelError::InvalidName`] if the grammar is violated.
            pub fn parse(raw: &str) -> Result<Self, ModelError> {
                check_grammar(raw)?;
                Ok(Self(raw.to_string()))
            }

            /// Identifier as text
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

name_newtype! {
    /// Survey-unique variable name of a field
    VariableName
}

name_newtype! {
    /// Name of a page within a definition
    PageName
}

name_newtype! {
    /// Survey-unique type code of a page-group
    GroupCode
}

name_newtype! {
    /// Named section inside a page
    SectionName
}

name_newtype! {
    /// Name of a workflow (unique together with its specifier)
    WorkflowName
}

impl VariableName {
    /// Mint a reserved (`@`-prefixed) name for an edit-form part
    ///
    /// Reserved names share the definition's uniqueness namespace but can
    /// never be produced by [`VariableName::parse`], so user fields cannot
    /// collide with parts.
    ///
    /// # Panics
    /// Panics if `stem` itself violates the base grammar; part stems are
    /// compile-time constants.
    #[must_use]
    pub fn reserved(stem: &str) -> Self {
        check_grammar(stem).expect("reserved part stem");
        Self(format!("@{stem}"))
    }

    /// Whether this name lives in the reserved edit-form namespace
    #[inline]
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.0.starts_with('@')
    }
}

impl GroupCode {
    /// Mint the reserved group code that hosts an edit-form
    #[must_use]
    pub fn reserved(stem: &str) -> Self {
        check_grammar(stem).expect("reserved group stem");
        Self(format!("@{stem}"))
    }

    /// Whether this code lives in the reserved edit-form namespace
    #[inline]
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.0.starts_with('@')
    }
}

impl PageName {
    /// Mint the reserved page name that hosts edit-form parts
    #[must_use]
    pub fn reserved(stem: &str) -> Self {
        check_grammar(stem).expect("reserved page stem");
        Self(format!("@{stem}"))
    }

    /// Whether this name lives in the reserved edit-form namespace
    #[inline]
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.0.starts_with('@')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_plain_identifiers() {
        assert!(VariableName::parse("age").is_ok());
        assert!(VariableName::parse("Q1_score").is_ok());
        assert!(PageName::parse("demographics").is_ok());
    }

    #[test]
    fn parse_rejects_bad_grammar() {
        assert!(VariableName::parse("").is_err());
        assert!(VariableName::parse("1age").is_err());
        assert!(VariableName::parse("a b").is_err());
        assert!(VariableName::parse("a-b").is_err());
    }

    #[test]
    fn parse_rejects_reserved_prefix() {
        assert!(matches!(
            VariableName::parse("@name"),
            Err(ModelError::InvalidName(_))
        ));
    }

    #[test]
    fn reserved_names_are_flagged() {
        let part = VariableName::reserved("wording_1");
        assert!(part.is_reserved());
        assert_eq!(part.as_str(), "@wording_1");

        let user = VariableName::parse("wording_1").unwrap();
        assert!(!user.is_reserved());
        assert_ne!(part, user);
    }

    #[test]
    fn display_round_trips() {
        let name = GroupCode::parse("baseline").unwrap();
        assert_eq!(name.to_string(), "baseline");
        let back: GroupCode = "baseline".parse().unwrap();
        assert_eq!(name, back);
    }
}
