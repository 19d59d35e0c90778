use axum::{routing::get, Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme};
use utoipa::openapi::server::Server;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::models;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::auth::register,
        routes::auth::login,
        routes::auth::me,
        routes::auth::logout,
        routes::users::list_users,
        routes::users::assignable_users,
        routes::tasks::list_tasks,
        routes::tasks::create_task,
        routes::tasks::get_task,
        routes::tasks::update_task,
        routes::tasks::delete_task,
        routes::cases::list_cases,
        routes::cases::create_case,
        routes::cases::view_case,
        routes::cases::view_case_by_number,
        routes::cases::update_case,
        routes::cases::delete_case,
        routes::cases::attach_documents,
        routes::documents::list_documents,
        routes::documents::upload_document,
        routes::documents::download_document,
        routes::calendar::list_events,
        routes::calendar::add_event,
        routes::calendar::day_view,
        routes::calendar::save_day,
        routes::dashboard::dashboard_summary
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            models::user::Role,
            models::user::User,
            models::user::AuthResponse,
            models::user::LoginRequest,
            models::user::RegisterRequest,
            models::choices::TaskStatus,
            models::choices::TaskPriority,
            models::choices::CaseStatus,
            models::choices::CaseType,
            models::choices::DocumentType,
            models::choices::EventType,
            models::task::Task,
            models::task::TaskScope,
            models::task::TaskCreateRequest,
            models::task::TaskUpdateRequest,
            models::case::Case,
            models::case::CaseCreateForm,
            models::case::CaseUpdateRequest,
            models::case::CaseDetail,
            models::case::CaseCreatedResponse,
            models::document::Document,
            models::document::DocumentUploadForm,
            models::document::RejectedUpload,
            models::document::AttachDocumentsResponse,
            models::calendar::CalendarEvent,
            models::calendar::CalendarFeedItem,
            models::calendar::EventCreateRequest,
            models::calendar::DiaryEntry,
            models::calendar::DiaryCreateRequest,
            models::calendar::DayView,
            models::calendar::DaySaveRequest,
            models::calendar::DaySaveResponse,
            models::calendar::PartOutcome,
            models::dashboard::DashboardSummary,
            models::dashboard::TaskStats,
            models::dashboard::CaseStats,
            models::dashboard::EventTypeCounts
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Auth", description = "Registration and sessions"),
        (name = "Users", description = "Staff directory"),
        (name = "Tasks", description = "Task assignment"),
        (name = "Cases", description = "Cases and their documents"),
        (name = "Documents", description = "Document uploads"),
        (name = "Calendar", description = "Calendar events and diary"),
        (name = "Dashboard", description = "Role-aware summary")
    )
)]
pub struct ApiDoc;

/// Registers the bearer scheme and requires it on every operation by default.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.security = Some(vec![SecurityRequirement::new("bearerAuth", Vec::<String>::new())]);
    }
}

pub fn build_openapi(port: u16) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![Server::new(format!("http://localhost:{port}"))]);
    doc
}

pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> anyhow::Result<Router> {
    let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
        .try_it_out_enabled(true)
        .with_credentials(true)
        .persist_authorization(true);

    let doc_json = serde_json::to_value(&doc)?;

    Ok(Router::new()
        .route(
            "/api-docs/openapi.json",
            get(move || {
                let doc_json = doc_json.clone();
                async move { Json(doc_json) }
            }),
        )
        .merge(SwaggerUi::new("/docs").config(swagger_config)))
}
