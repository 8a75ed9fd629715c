//! Post-edit target locators

use serde::{Deserialize, Serialize};

/// Where an edit points after `apply` or `cancel`
///
/// Indices are recorded against the post-edit aggregates. `None` at a level
/// means the entity there was deleted or never addressed; the session's
/// resolver falls back progressively (field, page, group, first interview)
/// so callers never receive a dangling reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLocator {
    /// Interview position in the record
    pub interview: Option<usize>,
    /// Group position in the definition's display order
    pub group: Option<usize>,
    /// Page position in the definition's display order
    pub page: Option<usize>,
    /// Field's flat position within the located page
    pub field: Option<usize>,
}

impl TargetLocator {
    /// A locator addressing nothing (resolver falls back to the first
    /// interview)
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }
}
