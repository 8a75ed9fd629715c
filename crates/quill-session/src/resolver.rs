//! Target resolution: locator indices to live names
//!
//! A command reports where its edit landed as bare indices. Resolution maps
//! those onto one snapshot pair and drops whatever no longer exists, so a
//! caller never holds a dangling reference: an unresolvable field leaves
//! the page, an unresolvable page the group, and when nothing structural
//! resolves the target still names the record's first interview.

use quill_commands::TargetLocator;
use quill_model::{Definition, GroupCode, PageName, Record, VariableName};
use serde::{Deserialize, Serialize};

/// Concrete addresses a locator resolved to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    /// Interview position in the record
    pub interview: Option<usize>,
    /// Resolved group code
    pub group: Option<GroupCode>,
    /// Resolved page name
    pub page: Option<PageName>,
    /// Resolved field name
    pub field: Option<VariableName>,
}

/// Resolve a locator against a definition/record pair
#[must_use]
pub fn resolve(
    definition: &Definition,
    record: &Record,
    locator: &TargetLocator,
) -> ResolvedTarget {
    let group = locator
        .group
        .and_then(|index| definition.groups.get(index))
        .map(|group| group.code.clone());
    let page = locator
        .page
        .and_then(|index| definition.pages.get(index))
        .map(|page| page.name.clone());
    let field = match (&page, locator.field) {
        (Some(name), Some(index)) => definition
            .flat_fields(name)
            .ok()
            .and_then(|slots| slots.get(index).map(|slot| slot.field.name.clone())),
        _ => None,
    };
    let interview = locator
        .interview
        .filter(|&index| record.interview(index).is_some())
        .or((!record.interviews.is_empty()).then_some(0));

    ResolvedTarget {
        interview,
        group,
        page,
        field,
    }
}
