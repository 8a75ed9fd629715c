//! Builder DSL for definitions and their parts
//!
//! Chainable builders whose `build()` validates, so malformed entities are
//! rejected at construction. The edit-form binder rebuilds entities from
//! answer sets exclusively through these builders.

use crate::definition::Definition;
use crate::error::ModelError;
use crate::field::{pad_cyclic, Field, FieldKind, FieldRule, FieldShape};
use crate::group::PageGroup;
use crate::language::{LanguageCode, Text};
use crate::name::{GroupCode, PageName, SectionName, VariableName, WorkflowName};
use crate::page::{Page, PageItem};
use crate::rules::CrossRule;
use crate::workflow::Workflow;
use im::Vector;

enum NameSpec<T> {
    Raw(String),
    Ready(T),
}

impl NameSpec<VariableName> {
    fn resolve(self) -> Result<VariableName, ModelError> {
        match self {
            Self::Raw(raw) => VariableName::parse(&raw),
            Self::Ready(name) => Ok(name),
        }
    }
}

impl NameSpec<PageName> {
    fn resolve(self) -> Result<PageName, ModelError> {
        match self {
            Self::Raw(raw) => PageName::parse(&raw),
            Self::Ready(name) => Ok(name),
        }
    }
}

impl NameSpec<GroupCode> {
    fn resolve(self) -> Result<GroupCode, ModelError> {
        match self {
            Self::Raw(raw) => GroupCode::parse(&raw),
            Self::Ready(code) => Ok(code),
        }
    }
}

/// Builder for [`Field`]
///
/// Usage:
/// ```rust,ignore
/// let field = FieldBuilder::new("weight")
///     .kind(FieldKind::Number)
///     .wording(Text::with(en, "Weight"))
///     .rule(FieldRule::Required)
///     .build()?;
/// ```
pub struct FieldBuilder {
    name: NameSpec<VariableName>,
    kinds: Vec<FieldKind>,
    wordings: Vec<Text>,
    contextual: bool,
    rules: Vec<FieldRule>,
    section: Option<SectionName>,
    units: Option<String>,
    comment: Option<String>,
    pinned: bool,
    kpi: bool,
}

impl FieldBuilder {
    /// Builder for a field named by a raw string (validated at `build`)
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::start(NameSpec::Raw(name.into()))
    }

    /// Builder for a field with an already-validated name
    ///
    /// The only route to fields in the reserved `@` namespace.
    #[must_use]
    pub fn named(name: VariableName) -> Self {
        Self::start(NameSpec::Ready(name))
    }

    fn start(name: NameSpec<VariableName>) -> Self {
        Self {
            name,
            kinds: Vec::new(),
            wordings: Vec::new(),
            contextual: false,
            rules: Vec::new(),
            section: None,
            units: None,
            comment: None,
            pinned: false,
            kpi: false,
        }
    }

    /// Add an instance type (single fields use the first)
    #[must_use]
    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Add an instance wording (single fields use the first)
    #[must_use]
    pub fn wording(mut self, wording: Text) -> Self {
        self.wordings.push(wording);
        self
    }

    /// Make the field contextual (multi-instance)
    #[must_use]
    pub fn contextual(mut self, contextual: bool) -> Self {
        self.contextual = contextual;
        self
    }

    /// Attach a rule family
    #[must_use]
    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Place the field in a section
    #[must_use]
    pub fn section(mut self, section: Option<SectionName>) -> Self {
        self.section = section;
        self
    }

    /// Measurement units
    #[must_use]
    pub fn units(mut self, units: Option<String>) -> Self {
        self.units = units;
        self
    }

    /// Designer comment
    #[must_use]
    pub fn comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// Pin to dashboards
    #[must_use]
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Mark as key performance indicator
    #[must_use]
    pub fn kpi(mut self, kpi: bool) -> Self {
        self.kpi = kpi;
        self
    }

    /// Assemble and validate the field
    ///
    /// Contextual instance lists are reconciled with [`pad_cyclic`] before
    /// the equal-length invariant is checked.
    ///
    /// # Errors
    /// Fails on an invalid name, a missing kind or wording, or an invalid
    /// shape.
    pub fn build(self) -> Result<Field, ModelError> {
        let name = self.name.resolve()?;
        let shape = if self.contextual {
            if self.kinds.is_empty() || self.wordings.is_empty() {
                return Err(ModelError::EmptyContext);
            }
            let target = self.kinds.len().max(self.wordings.len());
            FieldShape::Contextual {
                kinds: pad_cyclic(Vector::from(self.kinds), target),
                wordings: pad_cyclic(Vector::from(self.wordings), target),
            }
        } else {
            let kind = self
                .kinds
                .into_iter()
                .next()
                .ok_or(ModelError::Incomplete("field kind"))?;
            let wording = self
                .wordings
                .into_iter()
                .next()
                .ok_or(ModelError::Incomplete("field wording"))?;
            FieldShape::Single { kind, wording }
        };
        shape.validate()?;
        Ok(Field {
            name,
            shape,
            rules: Vector::from(self.rules),
            section: self.section,
            units: self.units,
            comment: self.comment,
            pinned: self.pinned,
            kpi: self.kpi,
        })
    }
}

/// Builder for [`Page`]
pub struct PageBuilder {
    name: NameSpec<PageName>,
    title: Option<Text>,
    items: Vec<PageItem>,
}

impl PageBuilder {
    /// Builder for a page named by a raw string (validated at `build`)
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: NameSpec::Raw(name.into()),
            title: None,
            items: Vec::new(),
        }
    }

    /// Builder for a page with an already-validated name
    #[must_use]
    pub fn named(name: PageName) -> Self {
        Self {
            name: NameSpec::Ready(name),
            title: None,
            items: Vec::new(),
        }
    }

    /// Display title
    #[must_use]
    pub fn title(mut self, title: Text) -> Self {
        self.title = Some(title);
        self
    }

    /// Append an owned field
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.items.push(PageItem::Field(field));
        self
    }

    /// Append an include of another page
    #[must_use]
    pub fn include(mut self, page: PageName) -> Self {
        self.items.push(PageItem::Include { page });
        self
    }

    /// Append a prepared item (used when rebuilding a page around its
    /// surviving items)
    #[must_use]
    pub fn item(mut self, item: PageItem) -> Self {
        self.items.push(item);
        self
    }

    /// Assemble and validate the page
    ///
    /// # Errors
    /// Fails on an invalid name, a missing title, or a field name repeated
    /// within the page.
    pub fn build(self) -> Result<Page, ModelError> {
        let name = self.name.resolve()?;
        let title = self.title.ok_or(ModelError::Incomplete("page title"))?;
        let mut seen = std::collections::BTreeSet::new();
        for item in &self.items {
            if let Some(field_name) = item.field_name() {
                if !seen.insert(field_name.clone()) {
                    return Err(ModelError::DuplicateField(field_name.clone()));
                }
            }
        }
        Ok(Page {
            name,
            title,
            items: Vector::from(self.items),
        })
    }
}

/// Builder for [`PageGroup`]
pub struct GroupBuilder {
    code: NameSpec<GroupCode>,
    label: Option<Text>,
    pages: Vec<PageName>,
    repeating: bool,
}

impl GroupBuilder {
    /// Builder for a group coded by a raw string (validated at `build`)
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: NameSpec::Raw(code.into()),
            label: None,
            pages: Vec::new(),
            repeating: false,
        }
    }

    /// Builder for a group with an already-validated code
    #[must_use]
    pub fn coded(code: GroupCode) -> Self {
        Self {
            code: NameSpec::Ready(code),
            label: None,
            pages: Vec::new(),
            repeating: false,
        }
    }

    /// Display label
    #[must_use]
    pub fn label(mut self, label: Text) -> Self {
        self.label = Some(label);
        self
    }

    /// Append a member page
    #[must_use]
    pub fn page(mut self, page: PageName) -> Self {
        self.pages.push(page);
        self
    }

    /// Allow the group to be answered repeatedly
    #[must_use]
    pub fn repeating(mut self, repeating: bool) -> Self {
        self.repeating = repeating;
        self
    }

    /// Assemble and validate the group
    ///
    /// # Errors
    /// Fails on an invalid code or a missing label.
    pub fn build(self) -> Result<PageGroup, ModelError> {
        let code = self.code.resolve()?;
        let label = self.label.ok_or(ModelError::Incomplete("group label"))?;
        Ok(PageGroup {
            code,
            label,
            pages: Vector::from(self.pages),
            repeating: self.repeating,
        })
    }
}

/// Builder for [`Workflow`]
pub struct WorkflowBuilder {
    name: String,
    specifier: String,
    sequence: Vec<GroupCode>,
    derived_from: Option<WorkflowName>,
}

impl WorkflowBuilder {
    /// Builder for a workflow identified by name and specifier
    #[must_use]
    pub fn new(name: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specifier: specifier.into(),
            sequence: Vec::new(),
            derived_from: None,
        }
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, code: GroupCode) -> Self {
        self.sequence.push(code);
        self
    }

    /// Mark as derived from a root workflow
    #[must_use]
    pub fn derived_from(mut self, root: Option<WorkflowName>) -> Self {
        self.derived_from = root;
        self
    }

    /// Assemble and validate the workflow
    ///
    /// # Errors
    /// Fails on an invalid name.
    pub fn build(self) -> Result<Workflow, ModelError> {
        Ok(Workflow {
            name: WorkflowName::parse(&self.name)?,
            specifier: self.specifier,
            sequence: Vector::from(self.sequence),
            derived_from: self.derived_from,
        })
    }
}

/// Builder for [`Definition`]
pub struct DefinitionBuilder {
    name: String,
    languages: Vec<LanguageCode>,
    pages: Vec<Page>,
    groups: Vec<PageGroup>,
    workflows: Vec<Workflow>,
    rules: Vec<CrossRule>,
}

impl DefinitionBuilder {
    /// Builder for an empty definition
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            languages: Vec::new(),
            pages: Vec::new(),
            groups: Vec::new(),
            workflows: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Add a configured language
    #[must_use]
    pub fn language(mut self, language: LanguageCode) -> Self {
        self.languages.push(language);
        self
    }

    /// Append a page
    #[must_use]
    pub fn page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    /// Append a page group
    #[must_use]
    pub fn group(mut self, group: PageGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Append a workflow
    #[must_use]
    pub fn workflow(mut self, workflow: Workflow) -> Self {
        self.workflows.push(workflow);
        self
    }

    /// Append a cross-field rule
    #[must_use]
    pub fn rule(mut self, rule: CrossRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Assemble the definition at version 1 and check its invariants
    ///
    /// # Errors
    /// Fails when [`Definition::validate`] does.
    pub fn build(self) -> Result<Definition, ModelError> {
        let definition = Definition {
            name: self.name,
            version: 1,
            languages: Vector::from(self.languages),
            pages: Vector::from(self.pages),
            groups: Vector::from(self.groups),
            workflows: Vector::from(self.workflows),
            rules: Vector::from(self.rules),
        };
        definition.validate()?;
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::DateFormat;
    use pretty_assertions::assert_eq;

    fn lang(s: &str) -> LanguageCode {
        LanguageCode::parse(s).unwrap()
    }

    #[test]
    fn contextual_build_pads_instances() {
        let field = FieldBuilder::new("episode")
            .contextual(true)
            .kind(FieldKind::Number)
            .wording(Text::with(lang("en"), "First"))
            .wording(Text::with(lang("en"), "Second"))
            .wording(Text::with(lang("en"), "Third"))
            .build()
            .unwrap();

        match field.shape {
            FieldShape::Contextual { kinds, wordings } => {
                assert_eq!(kinds.len(), 3);
                assert_eq!(wordings.len(), 3);
                assert!(kinds.iter().all(|k| *k == FieldKind::Number));
            }
            FieldShape::Single { .. } => panic!("expected contextual"),
        }
    }

    #[test]
    fn single_build_requires_kind_and_wording() {
        let missing_kind = FieldBuilder::new("weight")
            .wording(Text::with(lang("en"), "Weight"))
            .build();
        assert_eq!(missing_kind, Err(ModelError::Incomplete("field kind")));

        let missing_wording = FieldBuilder::new("weight")
            .kind(FieldKind::Date {
                format: DateFormat::YearMonthDay,
            })
            .build();
        assert_eq!(
            missing_wording,
            Err(ModelError::Incomplete("field wording"))
        );
    }

    #[test]
    fn reserved_names_only_through_named() {
        assert!(FieldBuilder::new("@part")
            .kind(FieldKind::Text)
            .wording(Text::with(lang("en"), "Part"))
            .build()
            .is_err());

        let part = FieldBuilder::named(VariableName::reserved("part"))
            .kind(FieldKind::Text)
            .wording(Text::with(lang("en"), "Part"))
            .build()
            .unwrap();
        assert!(part.name.is_reserved());
    }

    #[test]
    fn page_build_rejects_repeated_field_names() {
        let field = |name: &str| {
            FieldBuilder::new(name)
                .kind(FieldKind::Text)
                .wording(Text::with(lang("en"), name))
                .build()
                .unwrap()
        };
        let result = PageBuilder::new("visit")
            .title(Text::with(lang("en"), "Visit"))
            .field(field("weight"))
            .field(field("weight"))
            .build();
        assert!(matches!(result, Err(ModelError::DuplicateField(_))));
    }

    #[test]
    fn definition_build_validates() {
        let result = DefinitionBuilder::new("demo")
            .workflow(WorkflowBuilder::new("care", "site").build().unwrap())
            .workflow(WorkflowBuilder::new("care", "site").build().unwrap())
            .build();
        assert!(matches!(result, Err(ModelError::DuplicateWorkflow { .. })));
    }
}
