use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::choices::{TaskPriority, TaskStatus};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Null once the assigning user has been removed.
    pub assignor_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    #[schema(example = "2025-10-10")]
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTask {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assignor_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub due_date: NaiveDate,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbTask> for Task {
    type Error = AppError;

    fn try_from(value: DbTask) -> Result<Self, Self::Error> {
        Ok(Task {
            id: value.id,
            title: value.title,
            description: value.description,
            assignor_id: value.assignor_id,
            assignee_id: value.assignee_id,
            due_date: value.due_date,
            status: value.status.parse()?,
            priority: value.priority.parse()?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskCreateRequest {
    #[schema(example = "Draft the statement of claim")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "2025-10-10")]
    pub due_date: NaiveDate,
    pub assignee_id: Uuid,
    pub priority: Option<TaskPriority>,
}

/// Full replacement of a task's editable fields.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskUpdateRequest {
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "2025-11-01")]
    pub due_date: NaiveDate,
    pub assignee_id: Uuid,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskScope {
    #[default]
    All,
    AssignedByMe,
    AssignedToMe,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub scope: Option<TaskScope>,
}
