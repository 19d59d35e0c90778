use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{authorize, Action, Principal, Target};
use crate::errors::{AppError, AppResult};
use crate::jwt::Actor;
use crate::models::choices::TaskStatus;
use crate::models::task::{DbTask, Task, TaskCreateRequest, TaskListQuery, TaskScope, TaskUpdateRequest};
use crate::models::user::User;
use crate::routes::auth::fetch_user_by_id;
use crate::utils::{optional_text, required_text, utc_now};

const TASK_COLUMNS: &str =
    "id, title, description, assignor_id, assignee_id, due_date, status, priority, created_at, updated_at";

const MAX_DESCRIPTION: usize = 5000;

#[utoipa::path(
    get,
    path = "/tasks",
    tag = "Tasks",
    params(("scope" = Option<TaskScope>, Query, description = "all (default), assigned_by_me or assigned_to_me")),
    responses((status = 200, description = "Tasks the caller assigned or received, newest first", body = [Task]))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<TaskListQuery>,
) -> AppResult<Json<Vec<Task>>> {
    let tasks = fetch_tasks_for(&state.pool, actor.user_id, query.scope.unwrap_or_default()).await?;
    Ok(Json(tasks))
}

#[utoipa::path(
    post,
    path = "/tasks",
    tag = "Tasks",
    request_body = TaskCreateRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 403, description = "Caller's role may not assign to the assignee's role"),
        (status = 404, description = "Assignee does not exist")
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<TaskCreateRequest>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let assignee = fetch_assignee(&state.pool, payload.assignee_id).await?;
    ensure_may_assign(&actor.principal(), &assignee)?;

    let title = required_text("title", &payload.title, 1, 200)?;
    let description = optional_text("description", payload.description.as_deref(), MAX_DESCRIPTION)?;

    let task_id = Uuid::new_v4();
    let now = utc_now();
    let priority = payload.priority.unwrap_or_default();

    sqlx::query(
        "INSERT INTO tasks (id, title, description, assignor_id, assignee_id, due_date, status, priority, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(task_id)
    .bind(&title)
    .bind(&description)
    .bind(actor.user_id)
    .bind(assignee.id)
    .bind(payload.due_date)
    .bind(TaskStatus::Pending.as_str())
    .bind(priority.as_str())
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let task: Task = fetch_task(&state.pool, task_id).await?.try_into()?;

    tracing::info!(
        task_id = %task.id,
        assignor = %actor.user_id,
        assignee = %assignee.id,
        "task created"
    );

    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses((status = 200, description = "Task detail", body = Task))
)]
pub async fn get_task(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Task>> {
    let task = fetch_task(&state.pool, id).await?;
    authorize(&actor.principal(), Action::ViewTask, &task_target(&task))?;
    let task: Task = task.try_into()?;
    Ok(Json(task))
}

#[utoipa::path(
    put,
    path = "/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = TaskUpdateRequest,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 403, description = "Caller is neither assignor nor assignee")
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaskUpdateRequest>,
) -> AppResult<Json<Task>> {
    let task = fetch_task(&state.pool, id).await?;
    let principal = actor.principal();
    authorize(&principal, Action::UpdateTask, &task_target(&task))?;

    let title = required_text("title", &payload.title, 1, 200)?;
    let description = optional_text("description", payload.description.as_deref(), MAX_DESCRIPTION)?;

    if task.assignee_id != Some(payload.assignee_id) {
        let assignee = fetch_assignee(&state.pool, payload.assignee_id).await?;
        ensure_may_assign(&principal, &assignee)?;
    }

    let now = utc_now();

    sqlx::query(
        "UPDATE tasks SET title = ?, description = ?, due_date = ?, assignee_id = ?, status = ?, priority = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&title)
    .bind(&description)
    .bind(payload.due_date)
    .bind(payload.assignee_id)
    .bind(payload.status.as_str())
    .bind(payload.priority.as_str())
    .bind(now)
    .bind(id)
    .execute(&state.pool)
    .await?;

    let task: Task = fetch_task(&state.pool, id).await?.try_into()?;
    tracing::info!(task_id = %id, actor = %actor.user_id, status = %task.status, "task updated");

    Ok(Json(task))
}

#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 403, description = "Caller is not the assignor")
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let task = fetch_task(&state.pool, id).await?;
    authorize(&actor.principal(), Action::DeleteTask, &task_target(&task))?;

    let affected = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if affected.rows_affected() == 0 {
        return Err(AppError::not_found("task not found"));
    }

    tracing::info!(task_id = %id, actor = %actor.user_id, "task deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn task_target(task: &DbTask) -> Target {
    Target::Task {
        assignor_id: task.assignor_id,
        assignee_id: task.assignee_id,
    }
}

fn ensure_may_assign(principal: &Principal, assignee: &User) -> AppResult<()> {
    authorize(
        principal,
        Action::AssignTask,
        &Target::Assignee {
            user_id: assignee.id,
            role: assignee.role,
        },
    )
}

async fn fetch_assignee(pool: &SqlitePool, user_id: Uuid) -> AppResult<User> {
    match fetch_user_by_id(pool, user_id).await {
        Ok(user) => user.try_into(),
        Err(AppError::NotFound(_)) => Err(AppError::not_found("assignee not found")),
        Err(err) => Err(err),
    }
}

async fn fetch_task(pool: &SqlitePool, id: Uuid) -> AppResult<DbTask> {
    sqlx::query_as::<_, DbTask>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("task not found"))
}

pub(crate) async fn fetch_tasks_for(pool: &SqlitePool, user_id: Uuid, scope: TaskScope) -> AppResult<Vec<Task>> {
    let filter = match scope {
        TaskScope::All => "assignor_id = ?1 OR assignee_id = ?1",
        TaskScope::AssignedByMe => "assignor_id = ?1",
        TaskScope::AssignedToMe => "assignee_id = ?1",
    };

    sqlx::query_as::<_, DbTask>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE {filter} ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Task::try_from)
    .collect()
}
