//! Pages: ordered field/include containers
//!
//! A [`Page`] holds an ordered list of [`PageItem`]s. An item is either a
//! field owned by the page or an *include* of another page, which splices
//! that page's fields into the flat field order at the include's position.
//! Include resolution (and its cycle guard) lives on
//! [`Definition`](crate::definition::Definition), which owns the page table.

use crate::field::Field;
use crate::language::Text;
use crate::name::{PageName, VariableName};
use im::Vector;
use serde::{Deserialize, Serialize};

/// One slot in a page's ordered item list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum PageItem {
    /// A field owned by this page
    Field(Field),
    /// All fields of another page, spliced in at this position
    Include {
        /// The included page
        page: PageName,
    },
}

impl PageItem {
    /// The field, if this item is one
    #[inline]
    #[must_use]
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Self::Field(field) => Some(field),
            Self::Include { .. } => None,
        }
    }

    /// Mutable field access, if this item is one
    #[inline]
    pub fn as_field_mut(&mut self) -> Option<&mut Field> {
        match self {
            Self::Field(field) => Some(field),
            Self::Include { .. } => None,
        }
    }

    /// The included page name, if this item is an include
    #[inline]
    #[must_use]
    pub fn as_include(&self) -> Option<&PageName> {
        match self {
            Self::Field(_) => None,
            Self::Include { page } => Some(page),
        }
    }

    /// The variable name, if this item is a field
    #[inline]
    #[must_use]
    pub fn field_name(&self) -> Option<&VariableName> {
        self.as_field().map(|f| &f.name)
    }
}

/// A questionnaire page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Survey-unique page name
    pub name: PageName,
    /// Display title
    pub title: Text,
    /// Ordered fields and includes
    pub items: Vector<PageItem>,
}

impl Page {
    /// Empty page
    #[must_use]
    pub fn new(name: PageName, title: Text) -> Self {
        Self {
            name,
            title,
            items: Vector::new(),
        }
    }

    /// Fields owned directly by this page, in item order (includes skipped)
    pub fn own_fields(&self) -> impl Iterator<Item = &Field> {
        self.items.iter().filter_map(PageItem::as_field)
    }

    /// Pages included by this page, in item order
    pub fn includes(&self) -> impl Iterator<Item = &PageName> {
        self.items.iter().filter_map(PageItem::as_include)
    }

    /// Owned field by name
    #[must_use]
    pub fn find_field(&self, name: &VariableName) -> Option<&Field> {
        self.own_fields().find(|f| &f.name == name)
    }

    /// Item index of an owned field
    #[must_use]
    pub fn field_position(&self, name: &VariableName) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.field_name() == Some(name))
    }

    /// Item index of an include
    #[must_use]
    pub fn include_position(&self, page: &PageName) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.as_include() == Some(page))
    }

    /// Whether this page includes `page`
    #[inline]
    #[must_use]
    pub fn has_include(&self, page: &PageName) -> bool {
        self.include_position(page).is_some()
    }

    /// Number of items (fields and includes)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the page has no items
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
