//! Serializable command specifications
//!
//! A [`CommandSpec`] is the wire form of an edit request: a tagged value a
//! front end can send over its transport of choice. [`CommandSpec::build`]
//! turns it into the live command the session drives through its lifecycle.

use serde::{Deserialize, Serialize};

use crate::command::EditCommand;
use crate::field::{
    DeleteFieldCommand, InsertFieldCommand, ReorderFieldCommand, UpdateFieldCommand,
};
use crate::group::{
    DeleteGroupCommand, InsertGroupCommand, ReorderGroupCommand, UpdateGroupCommand,
};
use crate::page::{DeletePageCommand, InsertPageCommand, ReorderPageCommand, UpdatePageCommand};
use crate::workflow::{
    DeleteWorkflowCommand, InsertWorkflowCommand, ReorderWorkflowCommand, UpdateWorkflowCommand,
};
use quill_model::{GroupCode, PageName, VariableName, WorkflowName};

/// One structural edit, addressed to its target
///
/// Positions are flat indices into the addressed container; `at: None`
/// appends. Workflows are addressed by their name + specifier pair, the
/// root carrying an empty specifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CommandSpec {
    /// Add a field to a page (`at` indexes the page's own items)
    InsertField {
        /// Host page
        page: PageName,
        /// Item position, appending when absent
        at: Option<usize>,
    },
    /// Edit a field by name
    UpdateField {
        /// Field to edit
        name: VariableName,
    },
    /// Delete `count` consecutive own fields starting at `at`
    DeleteField {
        /// Host page
        page: PageName,
        /// First item position
        at: usize,
        /// How many fields to remove
        count: usize,
    },
    /// Move a field between flat positions, includes walked in place
    ReorderField {
        /// Host page
        page: PageName,
        /// Current flat position
        from: usize,
        /// Destination flat position
        to: usize,
    },
    /// Add a page, optionally into a group's sequence
    InsertPage {
        /// Group whose sequence the page joins, if any
        group: Option<GroupCode>,
        /// Position in the group sequence (or definition order when
        /// no group is given), appending when absent
        at: Option<usize>,
    },
    /// Edit a page by name
    UpdatePage {
        /// Page to edit
        name: PageName,
    },
    /// Delete a page and everything referencing it
    DeletePage {
        /// Page to remove
        name: PageName,
    },
    /// Move a page within its group's sequence
    ReorderPage {
        /// Owning group
        group: GroupCode,
        /// Current sequence position
        from: usize,
        /// Destination sequence position
        to: usize,
    },
    /// Add a page group
    InsertGroup {
        /// Display position, appending when absent
        at: Option<usize>,
    },
    /// Edit a group by code
    UpdateGroup {
        /// Group to edit
        code: GroupCode,
    },
    /// Delete a group, its interviews, and its workflow steps
    DeleteGroup {
        /// Group to remove
        code: GroupCode,
    },
    /// Move a group within the definition's display order
    ReorderGroup {
        /// Current position
        from: usize,
        /// Destination position
        to: usize,
    },
    /// Add a workflow
    InsertWorkflow {
        /// Display position, appending when absent
        at: Option<usize>,
    },
    /// Edit a workflow by its identity pair
    UpdateWorkflow {
        /// Workflow name
        name: WorkflowName,
        /// Variant specifier, empty for the root
        specifier: String,
    },
    /// Delete a workflow by its identity pair
    DeleteWorkflow {
        /// Workflow name
        name: WorkflowName,
        /// Variant specifier, empty for the root
        specifier: String,
    },
    /// Move a workflow within the definition's display order
    ReorderWorkflow {
        /// Current position
        from: usize,
        /// Destination position
        to: usize,
    },
}

impl CommandSpec {
    /// Construct the command this specification describes
    #[must_use]
    pub fn build(self) -> Box<dyn EditCommand> {
        match self {
            Self::InsertField { page, at } => Box::new(InsertFieldCommand::new(page, at)),
            Self::UpdateField { name } => Box::new(UpdateFieldCommand::new(name)),
            Self::DeleteField { page, at, count } => {
                Box::new(DeleteFieldCommand::new(page, at, count))
            }
            Self::ReorderField { page, from, to } => {
                Box::new(ReorderFieldCommand::new(page, from, to))
            }
            Self::InsertPage { group, at } => Box::new(InsertPageCommand::new(group, at)),
            Self::UpdatePage { name } => Box::new(UpdatePageCommand::new(name)),
            Self::DeletePage { name } => Box::new(DeletePageCommand::new(name)),
            Self::ReorderPage { group, from, to } => {
                Box::new(ReorderPageCommand::new(group, from, to))
            }
            Self::InsertGroup { at } => Box::new(InsertGroupCommand::new(at)),
            Self::UpdateGroup { code } => Box::new(UpdateGroupCommand::new(code)),
            Self::DeleteGroup { code } => Box::new(DeleteGroupCommand::new(code)),
            Self::ReorderGroup { from, to } => Box::new(ReorderGroupCommand::new(from, to)),
            Self::InsertWorkflow { at } => Box::new(InsertWorkflowCommand::new(at)),
            Self::UpdateWorkflow { name, specifier } => {
                Box::new(UpdateWorkflowCommand::new(name, specifier))
            }
            Self::DeleteWorkflow { name, specifier } => {
                Box::new(DeleteWorkflowCommand::new(name, specifier))
            }
            Self::ReorderWorkflow { from, to } => Box::new(ReorderWorkflowCommand::new(from, to)),
        }
    }
}
