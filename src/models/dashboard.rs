use serde::Serialize;
use utoipa::ToSchema;

use crate::models::calendar::{CalendarEvent, DiaryEntry};
use crate::models::case::Case;
use crate::models::document::Document;
use crate::models::task::Task;
use crate::models::user::Role;

#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct TaskStats {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub on_hold: i64,
    pub completed: i64,
    pub completed_percentage: f64,
    pub in_progress_percentage: f64,
    pub pending_percentage: f64,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        use crate::models::choices::TaskStatus;

        let mut stats = TaskStats {
            total: tasks.len() as i64,
            ..Default::default()
        };

        for task in tasks {
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::OnHold => stats.on_hold += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
        }

        if stats.total > 0 {
            let total = stats.total as f64;
            stats.completed_percentage = stats.completed as f64 / total * 100.0;
            stats.in_progress_percentage = stats.in_progress as f64 / total * 100.0;
            stats.pending_percentage = stats.pending as f64 / total * 100.0;
        }

        stats
    }
}

#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct CaseStats {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub settled: i64,
    pub closed: i64,
}

#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct EventTypeCounts {
    pub meeting: i64,
    pub court_appearance: i64,
    pub deadline: i64,
    pub personal: i64,
    pub other: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub role: Role,
    pub can_assign_tasks: bool,
    pub can_create_cases: bool,
    pub diary_entries: Vec<DiaryEntry>,
    /// Next five events starting now or later.
    pub upcoming_events: Vec<CalendarEvent>,
    pub event_counts: EventTypeCounts,
    pub tasks: Vec<Task>,
    pub task_stats: TaskStats,
    /// Cases in the role's scope: a lawyer's own, or every case for other roles.
    pub cases: Vec<Case>,
    pub case_stats: CaseStats,
    pub document_count: i64,
    pub recent_documents: Vec<Document>,
}
