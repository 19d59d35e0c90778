use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::app::AppState;
use crate::authz::{can, dashboard_case_owner, may_assign, Action, Target};
use crate::errors::AppResult;
use crate::jwt::Actor;
use crate::models::case::Case;
use crate::models::choices::{CaseStatus, EventType};
use crate::models::dashboard::{CaseStats, DashboardSummary, EventTypeCounts, TaskStats};
use crate::models::task::TaskScope;
use crate::models::user::Role;
use crate::routes::calendar::{fetch_diary_entries, fetch_events};
use crate::routes::cases::fetch_cases;
use crate::routes::tasks::fetch_tasks_for;
use crate::routes::uploads::fetch_user_documents;

const UPCOMING_EVENTS: usize = 5;
const RECENT_DOCUMENTS: usize = 3;

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Dashboard",
    responses((status = 200, description = "Summary for the caller, shaped by their role", body = DashboardSummary))
)]
pub async fn dashboard_summary(State(state): State<AppState>, actor: Actor) -> AppResult<Json<DashboardSummary>> {
    let principal = actor.principal();

    let diary_entries = fetch_diary_entries(&state.pool, actor.user_id).await?;

    let events = fetch_events(&state.pool, actor.user_id).await?;
    let now = Utc::now();
    let mut event_counts = EventTypeCounts::default();
    for event in &events {
        match event.event_type {
            EventType::Meeting => event_counts.meeting += 1,
            EventType::CourtAppearance => event_counts.court_appearance += 1,
            EventType::Deadline => event_counts.deadline += 1,
            EventType::Personal => event_counts.personal += 1,
            EventType::Other => event_counts.other += 1,
        }
    }
    let upcoming_events = events
        .into_iter()
        .filter(|event| event.start_time >= now)
        .take(UPCOMING_EVENTS)
        .collect();

    let tasks = fetch_tasks_for(&state.pool, actor.user_id, TaskScope::All).await?;
    let task_stats = TaskStats::from_tasks(&tasks);

    let cases = fetch_cases(&state.pool, dashboard_case_owner(&principal)).await?;
    let case_stats = count_cases(&cases);

    let documents = fetch_user_documents(&state.pool, actor.user_id).await?;
    let document_count = documents.len() as i64;
    let recent_documents = documents.into_iter().take(RECENT_DOCUMENTS).collect();

    let can_assign_tasks = Role::ALL.iter().any(|role| may_assign(actor.role, *role));
    let can_create_cases = can(&principal, Action::CreateCase, &Target::None);

    tracing::debug!(user_id = %actor.user_id, role = %actor.role, "dashboard built");

    Ok(Json(DashboardSummary {
        role: actor.role,
        can_assign_tasks,
        can_create_cases,
        diary_entries,
        upcoming_events,
        event_counts,
        tasks,
        task_stats,
        cases,
        case_stats,
        document_count,
        recent_documents,
    }))
}

fn count_cases(cases: &[Case]) -> CaseStats {
    let mut stats = CaseStats {
        total: cases.len() as i64,
        ..Default::default()
    };
    for case in cases {
        match case.status {
            CaseStatus::Open => stats.open += 1,
            CaseStatus::InProgress => stats.in_progress += 1,
            CaseStatus::Settled => stats.settled += 1,
            CaseStatus::Closed => stats.closed += 1,
        }
    }
    stats
}
