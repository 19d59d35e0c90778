//! Authorization model.
//!
//! Every role-differentiated decision in the service goes through [`can`]:
//! the task assignment table, task participation, case ownership with
//! read broadcast, and document visibility.

mod evaluator;
mod principal;

pub use evaluator::{can, dashboard_case_owner, may_assign};
pub use principal::{Principal, Target};

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AssignTask,
    ViewTask,
    UpdateTask,
    DeleteTask,
    CreateCase,
    ViewCase,
    UpdateCase,
    DeleteCase,
    UploadDocument,
    ViewDocument,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AssignTask => "task.assign",
            Action::ViewTask => "task.view",
            Action::UpdateTask => "task.update",
            Action::DeleteTask => "task.delete",
            Action::CreateCase => "case.create",
            Action::ViewCase => "case.view",
            Action::UpdateCase => "case.update",
            Action::DeleteCase => "case.delete",
            Action::UploadDocument => "document.upload",
            Action::ViewDocument => "document.view",
        }
    }

    fn denial_message(&self) -> &'static str {
        match self {
            Action::AssignTask => "you are not authorized to assign tasks to this user",
            Action::ViewTask => "you are not authorized to view this task",
            Action::UpdateTask => "you are not authorized to update this task",
            Action::DeleteTask => "only the assignor can delete this task",
            Action::CreateCase => "only lawyers can create cases",
            Action::ViewCase => "you are not authorized to view this case",
            Action::UpdateCase => "only the case's lawyer can update it",
            Action::DeleteCase => "only the case's lawyer can delete it",
            Action::UploadDocument => "only the case's lawyer can attach documents to it",
            Action::ViewDocument => "you are not authorized to view this document",
        }
    }
}

/// Runs [`can`] and turns a denial into an authorization error.
pub fn authorize(principal: &Principal, action: Action, target: &Target) -> AppResult<()> {
    if can(principal, action, target) {
        tracing::debug!(
            user_id = %principal.user_id,
            role = %principal.role,
            action = action.as_str(),
            "permission granted"
        );
        return Ok(());
    }

    tracing::warn!(
        user_id = %principal.user_id,
        role = %principal.role,
        action = action.as_str(),
        target = ?target,
        "permission denied"
    );
    Err(AppError::authorization(action.denial_message()))
}
