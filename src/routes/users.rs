use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::authz::{can, Action, Target};
use crate::errors::AppResult;
use crate::jwt::Actor;
use crate::models::user::User;
use crate::routes::auth::fetch_all_users;

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses((status = 200, description = "Every user, by username", body = [User]))
)]
pub async fn list_users(State(state): State<AppState>, _actor: Actor) -> AppResult<Json<Vec<User>>> {
    Ok(Json(fetch_all_users(&state.pool).await?))
}

#[utoipa::path(
    get,
    path = "/users/assignable",
    tag = "Users",
    responses((status = 200, description = "Users the caller may assign tasks to", body = [User]))
)]
pub async fn assignable_users(State(state): State<AppState>, actor: Actor) -> AppResult<Json<Vec<User>>> {
    let principal = actor.principal();
    let users = fetch_all_users(&state.pool)
        .await?
        .into_iter()
        .filter(|user| {
            let target = Target::Assignee { user_id: user.id, role: user.role };
            can(&principal, Action::AssignTask, &target)
        })
        .collect();

    Ok(Json(users))
}
