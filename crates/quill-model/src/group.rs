//! Page groups: named, ordered page subsets

use crate::language::Text;
use crate::name::{GroupCode, PageName};
use im::Vector;
use serde::{Deserialize, Serialize};

/// A named grouping of pages, answered together as one interview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGroup {
    /// Survey-unique group code
    pub code: GroupCode,
    /// Display label
    pub label: Text,
    /// Ordered member pages
    pub pages: Vector<PageName>,
    /// Whether the group may be answered more than once per record
    pub repeating: bool,
}

impl PageGroup {
    /// Group with no member pages
    #[must_use]
    pub fn new(code: GroupCode, label: Text) -> Self {
        Self {
            code,
            label,
            pages: Vector::new(),
            repeating: false,
        }
    }

    /// Position of a page in the group's order
    #[must_use]
    pub fn page_position(&self, page: &PageName) -> Option<usize> {
        self.pages.iter().position(|p| p == page)
    }

    /// Whether `page` is a member
    #[inline]
    #[must_use]
    pub fn contains_page(&self, page: &PageName) -> bool {
        self.page_position(page).is_some()
    }
}
