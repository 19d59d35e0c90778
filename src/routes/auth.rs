use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::{unique_violation, AppError, AppResult};
use crate::jwt::Actor;
use crate::models::user::{AuthResponse, DbUser, LoginRequest, RegisterRequest, User};
use crate::utils::{hash_password, optional_text, required_text, utc_now, verify_password};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, phone_number, created_at, updated_at";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: String,
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid or duplicate username/email")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let user = create_user(&state.pool, &payload).await?;
    let token = state.jwt.encode(user.id)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// Validates and inserts a new account. Duplicate usernames or emails are validation errors.
pub async fn create_user(pool: &SqlitePool, payload: &RegisterRequest) -> AppResult<User> {
    let username = required_text("username", &payload.username, 1, 150)?;
    let email = required_text("email", &payload.email, 3, 254)?;
    if !email.contains('@') {
        return Err(AppError::validation("email must be a valid address"));
    }
    let phone_number = optional_text("phone number", payload.phone_number.as_deref(), 20)?;

    ensure_available(pool, "username", &username, "this username is already taken").await?;
    ensure_available(pool, "email", &email, "this email is already taken").await?;

    let password_hash = hash_password(&payload.password)?;
    let now = utc_now();
    let user_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, role, phone_number, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(&username)
    .bind(&email)
    .bind(password_hash)
    .bind(payload.role.as_str())
    .bind(&phone_number)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|err| match unique_violation(err, "users.username", "this username is already taken") {
        AppError::Database(err) => unique_violation(err, "users.email", "this email is already taken"),
        other => other,
    })?;

    let user: User = fetch_user_by_id(pool, user_id).await?.try_into()?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");

    Ok(user)
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let db_user = sqlx::query_as::<_, DbUser>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
    ))
    .bind(payload.username.trim())
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::unauthorized("invalid login credentials"))?;

    if !verify_password(&payload.password, &db_user.password_hash)? {
        return Err(AppError::unauthorized("invalid login credentials"));
    }

    let token = state.jwt.encode(db_user.id)?;
    let user: User = db_user.try_into()?;

    Ok(Json(AuthResponse { token, user }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses((status = 200, description = "Current user", body = User))
)]
pub async fn me(State(state): State<AppState>, actor: Actor) -> AppResult<Json<User>> {
    let user: User = fetch_user_by_id(&state.pool, actor.user_id).await?.try_into()?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logout acknowledged"))
)]
pub async fn logout(_actor: Actor) -> AppResult<Json<MessageResponse>> {
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

async fn ensure_available(pool: &SqlitePool, column: &str, value: &str, message: &str) -> AppResult<()> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(1) FROM users WHERE {column} = ?"))
        .bind(value)
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Err(AppError::validation(message));
    }

    Ok(())
}

pub(crate) async fn fetch_user_by_id(pool: &SqlitePool, user_id: Uuid) -> AppResult<DbUser> {
    sqlx::query_as::<_, DbUser>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))
}

pub async fn fetch_all_users(pool: &SqlitePool) -> AppResult<Vec<User>> {
    sqlx::query_as::<_, DbUser>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username ASC"))
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(User::try_from)
        .collect()
}
