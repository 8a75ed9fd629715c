//! The questionnaire definition aggregate
//!
//! A [`Definition`] is a versioned value: sessions hand out `Arc<Definition>`
//! snapshots and every mutation goes through a draft that freezes into a new
//! value with a bumped version. Lookups here are read-only; the flattening
//! walk resolves includes into addressable field slots.

use crate::error::ModelError;
use crate::field::Field;
use crate::group::PageGroup;
use crate::language::LanguageCode;
use crate::name::{GroupCode, PageName, VariableName, WorkflowName};
use crate::page::{Page, PageItem};
use crate::rules::CrossRule;
use crate::workflow::Workflow;
use im::Vector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One addressable field position in a page's flattened field order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSlot<'a> {
    /// Page that owns the field (the included page for spliced fields)
    pub owner: &'a PageName,
    /// Item index inside the owner page
    pub index_in_owner: usize,
    /// The field itself
    pub field: &'a Field,
}

/// A versioned questionnaire definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Questionnaire name
    pub name: String,
    /// Monotonic version, bumped on every frozen draft
    pub version: u64,
    /// Configured languages
    pub languages: Vector<LanguageCode>,
    /// Pages, in display order
    pub pages: Vector<Page>,
    /// Page groups, in display order
    pub groups: Vector<PageGroup>,
    /// Workflows, in display order
    pub workflows: Vector<Workflow>,
    /// Cross-field rules
    pub rules: Vector<CrossRule>,
}

impl Definition {
    /// Page by name
    #[must_use]
    pub fn page(&self, name: &PageName) -> Option<&Page> {
        self.pages.iter().find(|p| &p.name == name)
    }

    /// Index of a page in display order
    #[must_use]
    pub fn page_index(&self, name: &PageName) -> Option<usize> {
        self.pages.iter().position(|p| &p.name == name)
    }

    /// Group by code
    #[must_use]
    pub fn group(&self, code: &GroupCode) -> Option<&PageGroup> {
        self.groups.iter().find(|g| &g.code == code)
    }

    /// Index of a group in display order
    #[must_use]
    pub fn group_index(&self, code: &GroupCode) -> Option<usize> {
        self.groups.iter().position(|g| &g.code == code)
    }

    /// Workflow by its identity pair
    #[must_use]
    pub fn workflow(&self, name: &WorkflowName, specifier: &str) -> Option<&Workflow> {
        self.workflows
            .iter()
            .find(|w| &w.name == name && w.specifier == specifier)
    }

    /// Index of a workflow in display order
    #[must_use]
    pub fn workflow_index(&self, name: &WorkflowName, specifier: &str) -> Option<usize> {
        self.workflows
            .iter()
            .position(|w| &w.name == name && w.specifier == specifier)
    }

    /// Field by name, with its owning page
    #[must_use]
    pub fn find_field(&self, name: &VariableName) -> Option<(&PageName, &Field)> {
        self.pages.iter().find_map(|page| {
            page.find_field(name).map(|field| (&page.name, field))
        })
    }

    /// Whether any page owns a field with this raw name
    #[must_use]
    pub fn has_field(&self, raw: &str) -> bool {
        self.pages
            .iter()
            .flat_map(Page::own_fields)
            .any(|f| f.name.as_str() == raw)
    }

    /// All field names, page by page in item order
    pub fn field_names(&self) -> impl Iterator<Item = &VariableName> {
        self.pages
            .iter()
            .flat_map(Page::own_fields)
            .map(|f| &f.name)
    }

    /// The group a page belongs to, if any
    #[must_use]
    pub fn group_of_page(&self, page: &PageName) -> Option<&PageGroup> {
        self.groups.iter().find(|g| g.contains_page(page))
    }

    /// Pages that include `page`
    pub fn including_pages<'a>(
        &'a self,
        page: &'a PageName,
    ) -> impl Iterator<Item = &'a Page> + 'a {
        self.pages.iter().filter(move |p| p.has_include(page))
    }

    /// Flattened field slots of a page, includes resolved in place
    ///
    /// Walks the page's items in order; an include splices the included
    /// page's own flattened slots at that position. A page already on the
    /// walk stack is skipped, so cyclic includes cannot loop.
    ///
    /// # Errors
    /// Fails when an include names a page the definition does not carry.
    pub fn flat_fields<'a>(&'a self, page: &PageName) -> Result<Vec<FieldSlot<'a>>, ModelError> {
        let page = self
            .page(page)
            .ok_or_else(|| ModelError::NoSuchPage(page.clone()))?;
        let mut slots = Vec::new();
        let mut visiting = BTreeSet::new();
        self.flatten_into(page, &mut visiting, &mut slots)?;
        Ok(slots)
    }

    fn flatten_into<'a>(
        &'a self,
        page: &'a Page,
        visiting: &mut BTreeSet<PageName>,
        slots: &mut Vec<FieldSlot<'a>>,
    ) -> Result<(), ModelError> {
        if !visiting.insert(page.name.clone()) {
            return Ok(());
        }
        for (index, item) in page.items.iter().enumerate() {
            match item {
                PageItem::Field(field) => slots.push(FieldSlot {
                    owner: &page.name,
                    index_in_owner: index,
                    field,
                }),
                PageItem::Include { page: included } => {
                    let included = self
                        .page(included)
                        .ok_or_else(|| ModelError::UnknownInclude(included.clone()))?;
                    self.flatten_into(included, visiting, slots)?;
                }
            }
        }
        visiting.remove(&page.name);
        Ok(())
    }

    /// Check the aggregate invariants
    ///
    /// # Errors
    /// Fails on duplicate field names, page names, group codes or workflow
    /// identity pairs, and on unresolvable includes.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut field_names = BTreeSet::new();
        for name in self.field_names() {
            if !field_names.insert(name.clone()) {
                return Err(ModelError::DuplicateField(name.clone()));
            }
        }
        let mut page_names = BTreeSet::new();
        for page in &self.pages {
            if !page_names.insert(page.name.clone()) {
                return Err(ModelError::DuplicatePage(page.name.clone()));
            }
        }
        let mut group_codes = BTreeSet::new();
        for group in &self.groups {
            if !group_codes.insert(group.code.clone()) {
                return Err(ModelError::DuplicateGroup(group.code.clone()));
            }
        }
        let mut workflow_keys = BTreeSet::new();
        for workflow in &self.workflows {
            if !workflow_keys.insert((workflow.name.clone(), workflow.specifier.clone())) {
                return Err(ModelError::DuplicateWorkflow {
                    name: workflow.name.clone(),
                    specifier: workflow.specifier.clone(),
                });
            }
        }
        for page in &self.pages {
            for included in page.includes() {
                if self.page(included).is_none() {
                    return Err(ModelError::UnknownInclude(included.clone()));
                }
            }
        }
        for field in self.pages.iter().flat_map(Page::own_fields) {
            field.shape.validate()?;
        }
        Ok(())
    }
}
