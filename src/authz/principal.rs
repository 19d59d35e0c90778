use uuid::Uuid;

use crate::models::user::Role;

/// The authenticated identity performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// True when `other` is a live reference to this principal.
    pub fn is(&self, other: Option<Uuid>) -> bool {
        other == Some(self.user_id)
    }
}

/// Identities an action is evaluated against. Only what the rule needs is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    None,
    /// Prospective assignee of a task.
    Assignee { user_id: Uuid, role: Role },
    Task {
        assignor_id: Option<Uuid>,
        assignee_id: Option<Uuid>,
    },
    Case { lawyer_id: Option<Uuid> },
    Document {
        owner_id: Uuid,
        case_id: Option<Uuid>,
    },
}
