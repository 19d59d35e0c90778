use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::jwt::JwtConfig;
use crate::routes::{auth, calendar, cases, dashboard, documents, health, tasks, users};
use crate::storage::{FileStorage, LocalFileStorage, MAX_UPLOAD_BYTES};

/// Request bodies may carry several documents at the per-file cap.
const MAX_REQUEST_BYTES: usize = 8 * MAX_UPLOAD_BYTES;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
    pub storage: Arc<dyn FileStorage>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig, storage: Arc<dyn FileStorage>) -> Self {
        Self {
            pool,
            jwt: Arc::new(jwt),
            storage,
        }
    }
}

/// Builds the router from environment configuration.
pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    let storage = Arc::new(LocalFileStorage::from_env());
    Ok(router(AppState::new(pool, jwt_config, storage)))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout));

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route("/assignable", get(users::assignable_users));

    let task_routes = Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/:id",
            get(tasks::get_task).put(tasks::update_task).delete(tasks::delete_task),
        );

    let case_routes = Router::new()
        .route("/", get(cases::list_cases).post(cases::create_case))
        .route("/by-number/:case_number", get(cases::view_case_by_number))
        .route(
            "/:id",
            get(cases::view_case).put(cases::update_case).delete(cases::delete_case),
        )
        .route("/:id/documents", post(cases::attach_documents));

    let document_routes = Router::new()
        .route("/", get(documents::list_documents).post(documents::upload_document))
        .route("/:id/content", get(documents::download_document));

    let calendar_routes = Router::new()
        .route("/events", get(calendar::list_events).post(calendar::add_event))
        .route("/days/:date", get(calendar::day_view).post(calendar::save_day));

    Router::new()
        .route("/api/health", get(health::health))
        .route("/dashboard", get(dashboard::dashboard_summary))
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .nest("/cases", case_routes)
        .nest("/documents", document_routes)
        .nest("/calendar", calendar_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
