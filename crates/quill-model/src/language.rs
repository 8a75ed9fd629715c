//! Language tags and multilingual text
//!
//! Wordings are multilingual: a [`Text`] maps language codes to strings.
//! A definition declares its configured languages; "all languages populated"
//! rules check a [`Text`] for completeness against that set.

use crate::error::ModelError;
use im::OrdMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercase ASCII language tag ("en", "fr", "de", …)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse a language tag
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidLanguage`] unless the tag is 2–8
    /// lowercase ASCII letters.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let ok = (2..=8).contains(&raw.len()) && raw.bytes().all(|b| b.is_ascii_lowercase());
        if ok {
            Ok(Self(raw.to_string()))
        } else {
            Err(ModelError::InvalidLanguage(raw.to_string()))
        }
    }

    /// Tag as text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tag used when a definition configures no languages
    #[must_use]
    pub fn fallback() -> Self {
        Self("en".to_string())
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Multilingual string keyed by language
///
/// Cheap to clone (persistent map) so wordings can ride inside aggregate
/// snapshots without deep copies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Text(OrdMap<LanguageCode, String>);

impl Text {
    /// Empty text
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-language text
    #[must_use]
    pub fn with(lang: LanguageCode, value: impl Into<String>) -> Self {
        let mut map = OrdMap::new();
        map.insert(lang, value.into());
        Self(map)
    }

    /// Set one translation, returning the updated text
    #[must_use]
    pub fn and(mut self, lang: LanguageCode, value: impl Into<String>) -> Self {
        self.0.insert(lang, value.into());
        self
    }

    /// Translation for a language, if present
    #[inline]
    #[must_use]
    pub fn get(&self, lang: &LanguageCode) -> Option<&str> {
        self.0.get(lang).map(String::as_str)
    }

    /// Languages with a non-empty translation
    pub fn languages(&self) -> impl Iterator<Item = &LanguageCode> {
        self.0
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, _)| k)
    }

    /// True when every configured language has a non-empty translation
    #[must_use]
    pub fn is_complete(&self, configured: &[LanguageCode]) -> bool {
        configured
            .iter()
            .all(|lang| self.get(lang).is_some_and(|v| !v.trim().is_empty()))
    }

    /// True when no language carries a non-empty translation
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }

    /// Any translation, preferring the first configured language
    #[must_use]
    pub fn any(&self) -> Option<&str> {
        self.0
            .values()
            .map(String::as_str)
            .find(|v| !v.trim().is_empty())
    }
}

impl FromIterator<(LanguageCode, String)> for Text {
    fn from_iter<I: IntoIterator<Item = (LanguageCode, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
