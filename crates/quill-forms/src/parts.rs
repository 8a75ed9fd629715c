//! The reserved edit-form vocabulary
//!
//! Every edit-form question ("part") is an ordinary field living in the
//! reserved `@` namespace, hosted on a reserved page inside a reserved page
//! group. The functions here mint those names, so the rest of the crate and
//! its callers never hand-write a reserved string. Instance-indexed parts
//! (`wording_1`, `type_1`, ...) carry their contextual instance number,
//! counted from 1.

use quill_model::{
    AnswerSet, CrossRule, DefinitionDraft, GroupCode, Page, PageGroup, PageName, RecordDraft,
    VariableName,
};
use serde::{Deserialize, Serialize};

/// The page group hosting an active edit-form
#[must_use]
pub fn edit_group() -> GroupCode {
    GroupCode::reserved("edit")
}

/// The page carrying the edit-form parts
#[must_use]
pub fn parts_page() -> PageName {
    PageName::reserved("parts")
}

// --- entity name parts ---

/// Field form: variable name
#[must_use]
pub fn field_name() -> VariableName {
    VariableName::reserved("name")
}

/// Field form: contextual (multi-instance) toggle
#[must_use]
pub fn contextual_toggle() -> VariableName {
    VariableName::reserved("contextual")
}

/// Field form: wording of one instance
#[must_use]
pub fn wording(instance: usize) -> VariableName {
    VariableName::reserved(&format!("wording_{instance}"))
}

/// Field form: type selector of one instance
#[must_use]
pub fn type_code(instance: usize) -> VariableName {
    VariableName::reserved(&format!("type_{instance}"))
}

/// Field form: date display format of one instance
#[must_use]
pub fn date_format(instance: usize) -> VariableName {
    VariableName::reserved(&format!("date_format_{instance}"))
}

/// Field form: seconds toggle of one time instance
#[must_use]
pub fn time_seconds(instance: usize) -> VariableName {
    VariableName::reserved(&format!("time_seconds_{instance}"))
}

/// Field form: options of one choice instance
#[must_use]
pub fn choice_options(instance: usize) -> VariableName {
    VariableName::reserved(&format!("choice_options_{instance}"))
}

/// Field form: lower bound of one scale instance
#[must_use]
pub fn scale_min(instance: usize) -> VariableName {
    VariableName::reserved(&format!("scale_min_{instance}"))
}

/// Field form: upper bound of one scale instance
#[must_use]
pub fn scale_max(instance: usize) -> VariableName {
    VariableName::reserved(&format!("scale_max_{instance}"))
}

/// Field form: point ceiling of one score instance
#[must_use]
pub fn score_max(instance: usize) -> VariableName {
    VariableName::reserved(&format!("score_max_{instance}"))
}

// --- rule-family toggles and their arguments ---

/// Field form: required-rule toggle
#[must_use]
pub fn required_toggle() -> VariableName {
    VariableName::reserved("required")
}

/// Field form: unique-rule toggle
#[must_use]
pub fn unique_toggle() -> VariableName {
    VariableName::reserved("unique")
}

/// Field form: range-rule toggle
#[must_use]
pub fn range_toggle() -> VariableName {
    VariableName::reserved("range")
}

/// Field form: range lower bound (free text, coerced at bind)
#[must_use]
pub fn range_min() -> VariableName {
    VariableName::reserved("range_min")
}

/// Field form: range upper bound (free text, coerced at bind)
#[must_use]
pub fn range_max() -> VariableName {
    VariableName::reserved("range_max")
}

/// Field form: text-length-rule toggle
#[must_use]
pub fn length_toggle() -> VariableName {
    VariableName::reserved("length")
}

/// Field form: maximum text length
#[must_use]
pub fn length_max() -> VariableName {
    VariableName::reserved("length_max")
}

/// Field form: letter-case-rule toggle
#[must_use]
pub fn case_toggle() -> VariableName {
    VariableName::reserved("case")
}

/// Field form: letter-case selector
#[must_use]
pub fn case_kind() -> VariableName {
    VariableName::reserved("case_kind")
}

/// Field form: precision-rule toggle
#[must_use]
pub fn precision_toggle() -> VariableName {
    VariableName::reserved("precision")
}

/// Field form: decimal places
#[must_use]
pub fn precision_decimals() -> VariableName {
    VariableName::reserved("precision_decimals")
}

/// Field form: default-rule toggle
#[must_use]
pub fn default_toggle() -> VariableName {
    VariableName::reserved("default")
}

/// Field form: default source selector (`constant`, `copy`, `formula`)
#[must_use]
pub fn default_source() -> VariableName {
    VariableName::reserved("default_source")
}

/// Field form: default source argument
#[must_use]
pub fn default_value() -> VariableName {
    VariableName::reserved("default_value")
}

/// Field form: activation-rule toggle
#[must_use]
pub fn activation_toggle() -> VariableName {
    VariableName::reserved("activation")
}

/// Field form: field the activation condition observes
#[must_use]
pub fn activation_field() -> VariableName {
    VariableName::reserved("activation_field")
}

/// Field form: value the observed field must equal (blank = any true flag)
#[must_use]
pub fn activation_equals() -> VariableName {
    VariableName::reserved("activation_equals")
}

/// Field form: critical-event toggle
#[must_use]
pub fn critical_toggle() -> VariableName {
    VariableName::reserved("critical")
}

/// Field form: critical-event code
#[must_use]
pub fn critical_code() -> VariableName {
    VariableName::reserved("critical_code")
}

// --- field metadata parts ---

/// Field form: pinned flag
#[must_use]
pub fn pinned_flag() -> VariableName {
    VariableName::reserved("pinned")
}

/// Field form: key-performance-indicator flag
#[must_use]
pub fn kpi_flag() -> VariableName {
    VariableName::reserved("kpi")
}

/// Field form: measurement units
#[must_use]
pub fn units() -> VariableName {
    VariableName::reserved("units")
}

/// Field form: designer comment
#[must_use]
pub fn comment() -> VariableName {
    VariableName::reserved("comment")
}

/// Field form: acknowledge a section change
#[must_use]
pub fn section_ack() -> VariableName {
    VariableName::reserved("section_ack")
}

/// Field form: section destination selector (`none`, `new`)
#[must_use]
pub fn section_choice() -> VariableName {
    VariableName::reserved("section_choice")
}

/// Field form: name of the new section
#[must_use]
pub fn section_new_name() -> VariableName {
    VariableName::reserved("section_new_name")
}

// --- page form parts ---

/// Page form: page name
#[must_use]
pub fn page_name() -> VariableName {
    VariableName::reserved("page_name")
}

/// Page form: page title
#[must_use]
pub fn page_title() -> VariableName {
    VariableName::reserved("page_title")
}

// --- group form parts ---

/// Group form: group code
#[must_use]
pub fn group_code() -> VariableName {
    VariableName::reserved("group_code")
}

/// Group form: group label
#[must_use]
pub fn group_label() -> VariableName {
    VariableName::reserved("group_label")
}

/// Group form: ordered member page names
#[must_use]
pub fn group_pages() -> VariableName {
    VariableName::reserved("group_pages")
}

/// Group form: repeating flag
#[must_use]
pub fn group_repeating() -> VariableName {
    VariableName::reserved("group_repeating")
}

// --- workflow form parts ---

/// Workflow form: workflow name
#[must_use]
pub fn workflow_name() -> VariableName {
    VariableName::reserved("workflow_name")
}

/// Workflow form: workflow specifier
#[must_use]
pub fn workflow_specifier() -> VariableName {
    VariableName::reserved("workflow_specifier")
}

/// Workflow form: ordered group codes
#[must_use]
pub fn workflow_sequence() -> VariableName {
    VariableName::reserved("workflow_sequence")
}

// --- delete form ---

/// Delete forms: the single acknowledgment part
#[must_use]
pub fn delete_ack() -> VariableName {
    VariableName::reserved("ack")
}

/// An assembled, not-yet-spliced edit-form
///
/// Created by the form builder at `start`, spliced into the visible
/// aggregates so the form rides the ordinary answer pipeline, consumed by
/// the binder at `apply`, and discarded with the Pending Edit Context.
/// Serializable so a front end can render the form without the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parts {
    /// Reserved page carrying the part fields, in form order
    pub page: Page,
    /// Reserved group hosting the page
    pub group: PageGroup,
    /// Reserved-named rules validating the parts
    pub rules: Vec<CrossRule>,
    /// Defaults mirroring the edited entity's current state
    pub defaults: AnswerSet,
}

impl Parts {
    /// Splice this form into drafts of both aggregates: the page, group and
    /// rules into the definition, an interview holding the defaults into
    /// the record
    pub fn splice_into(&self, definition: &mut DefinitionDraft, record: &mut RecordDraft) {
        definition.splice_edit_form(
            self.page.clone(),
            self.group.clone(),
            self.rules.iter().cloned(),
        );
        record.splice_edit_interview(self.group.code.clone(), self.defaults.clone());
    }

    /// Part fields in form order
    pub fn part_names(&self) -> impl Iterator<Item = &VariableName> {
        self.page.own_fields().map(|f| &f.name)
    }

    /// Whether the form carries no questions (reorder forms)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.page.is_empty()
    }

    /// An empty form: no parts, no rules, no defaults
    ///
    /// Reorder edits use this; the protocol still runs through the same
    /// lifecycle with nothing to ask.
    #[must_use]
    pub fn empty(title: quill_model::Text) -> Self {
        let page = Page::new(parts_page(), title.clone());
        let mut group = PageGroup::new(edit_group(), title);
        group.pages.push_back(parts_page());
        Self {
            page,
            group,
            rules: Vec::new(),
            defaults: AnswerSet::new(),
        }
    }
}

/// Probe how many contextual instances a merged answer set carries, by
/// counting consecutive type-selector parts from instance 1
#[must_use]
pub fn instance_count(answers: &AnswerSet) -> usize {
    let mut count = 0;
    while answers.get(&type_code(count + 1)).is_some() {
        count += 1;
    }
    count
}
