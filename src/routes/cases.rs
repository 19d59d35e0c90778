use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{authorize, Action, Target};
use crate::errors::{unique_violation, AppError, AppResult};
use crate::jwt::Actor;
use crate::models::case::{
    Case, CaseCreatedResponse, CaseDetail, CaseFields, CaseListQuery, CaseUpdateRequest, DbCase,
};
use crate::models::choices::{CaseStatus, CaseType, DocumentType};
use crate::models::document::AttachDocumentsResponse;
use crate::routes::uploads::{fetch_case_documents, read_form, store_documents, DocumentMeta, FormData};
use crate::utils::{optional_text, required_text, utc_now};

const CASE_COLUMNS: &str = "id, case_number, client_name, description, lawyer_id, case_type, status, client_contact_info, initial_consultation_date, created_at, updated_at";

const DUPLICATE_CASE_NUMBER: &str = "a case with this case number already exists";
const MAX_DESCRIPTION: usize = 10_000;

#[utoipa::path(
    get,
    path = "/cases",
    tag = "Cases",
    params(("mine" = Option<bool>, Query, description = "Only cases owned by the caller")),
    responses((status = 200, description = "Cases, newest first", body = [Case]))
)]
pub async fn list_cases(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<CaseListQuery>,
) -> AppResult<Json<Vec<Case>>> {
    let owner = query.mine.unwrap_or(false).then_some(actor.user_id);
    Ok(Json(fetch_cases(&state.pool, owner).await?))
}

#[utoipa::path(
    post,
    path = "/cases",
    tag = "Cases",
    request_body(content = crate::models::case::CaseCreateForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Case created; each document reported as stored or rejected", body = CaseCreatedResponse),
        (status = 400, description = "Invalid case fields or duplicate case number"),
        (status = 403, description = "Caller is not a lawyer")
    )
)]
pub async fn create_case(
    State(state): State<AppState>,
    actor: Actor,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<CaseCreatedResponse>)> {
    authorize(&actor.principal(), Action::CreateCase, &Target::None)?;

    let mut form = read_form(multipart).await?;
    let fields = case_fields(&form)?;
    let files = form.take_files("documents");

    let case_number = match fields.case_number {
        Some(number) => number,
        None => Uuid::new_v4().to_string(),
    };

    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM cases WHERE case_number = ?")
        .bind(&case_number)
        .fetch_optional(&state.pool)
        .await?;
    if exists.is_some() {
        return Err(AppError::validation(DUPLICATE_CASE_NUMBER));
    }

    let case_id = Uuid::new_v4();
    let now = utc_now();

    sqlx::query(
        "INSERT INTO cases (id, case_number, client_name, description, lawyer_id, case_type, status, client_contact_info, initial_consultation_date, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(case_id)
    .bind(&case_number)
    .bind(&fields.client_name)
    .bind(&fields.description)
    .bind(actor.user_id)
    .bind(fields.case_type.as_str())
    .bind(fields.status.as_str())
    .bind(&fields.client_contact_info)
    .bind(fields.initial_consultation_date)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await
    .map_err(|err| unique_violation(err, "cases.case_number", DUPLICATE_CASE_NUMBER))?;

    let case: Case = fetch_case(&state.pool, case_id).await?.try_into()?;

    tracing::info!(case_id = %case.id, case_number = %case.case_number, lawyer = %actor.user_id, "case created");

    let meta = DocumentMeta {
        document_type: DocumentType::CaseDocument,
        description: None,
        case_id: Some(case.id),
    };
    let (documents, rejected_documents) = store_documents(&state, actor.user_id, &files, &meta).await;

    Ok((
        StatusCode::CREATED,
        Json(CaseCreatedResponse {
            case,
            documents,
            rejected_documents,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/cases/{id}",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "Case id")),
    responses(
        (status = 200, description = "Case with its documents, newest first", body = CaseDetail),
        (status = 404, description = "Case not found")
    )
)]
pub async fn view_case(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CaseDetail>> {
    let case = fetch_case(&state.pool, id).await?;
    case_detail(&state.pool, &actor, case).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/cases/by-number/{case_number}",
    tag = "Cases",
    params(("case_number" = String, Path, description = "Case number")),
    responses(
        (status = 200, description = "Case with its documents, newest first", body = CaseDetail),
        (status = 404, description = "Case not found")
    )
)]
pub async fn view_case_by_number(
    State(state): State<AppState>,
    actor: Actor,
    Path(case_number): Path<String>,
) -> AppResult<Json<CaseDetail>> {
    let case = sqlx::query_as::<_, DbCase>(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE case_number = ?"))
        .bind(&case_number)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::not_found("case not found"))?;
    case_detail(&state.pool, &actor, case).await.map(Json)
}

#[utoipa::path(
    put,
    path = "/cases/{id}",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "Case id")),
    request_body = CaseUpdateRequest,
    responses(
        (status = 200, description = "Case updated", body = Case),
        (status = 403, description = "Caller is not the case's lawyer")
    )
)]
pub async fn update_case(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<CaseUpdateRequest>,
) -> AppResult<Json<Case>> {
    let case = fetch_case(&state.pool, id).await?;
    authorize(&actor.principal(), Action::UpdateCase, &case_target(&case))?;

    let client_name = required_text("client name", &payload.client_name, 1, 200)?;
    let description = required_text("description", &payload.description, 1, MAX_DESCRIPTION)?;
    let client_contact_info = optional_text("client contact info", payload.client_contact_info.as_deref(), 200)?;

    sqlx::query(
        "UPDATE cases SET client_name = ?, description = ?, case_type = ?, status = ?, client_contact_info = ?, initial_consultation_date = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&client_name)
    .bind(&description)
    .bind(payload.case_type.as_str())
    .bind(payload.status.as_str())
    .bind(&client_contact_info)
    .bind(payload.initial_consultation_date)
    .bind(utc_now())
    .bind(id)
    .execute(&state.pool)
    .await?;

    let case: Case = fetch_case(&state.pool, id).await?.try_into()?;
    tracing::info!(case_id = %id, status = %case.status, "case updated");

    Ok(Json(case))
}

#[utoipa::path(
    delete,
    path = "/cases/{id}",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "Case id")),
    responses(
        (status = 204, description = "Case deleted; its documents are kept and unlinked"),
        (status = 403, description = "Caller is not the case's lawyer")
    )
)]
pub async fn delete_case(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let case = fetch_case(&state.pool, id).await?;
    authorize(&actor.principal(), Action::DeleteCase, &case_target(&case))?;

    sqlx::query("DELETE FROM cases WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    tracing::info!(case_id = %id, actor = %actor.user_id, "case deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/cases/{id}/documents",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "Case id")),
    request_body(content = crate::models::case::CaseCreateForm, content_type = "multipart/form-data", description = "Repeated `documents` file parts and an optional `description`"),
    responses(
        (status = 201, description = "At least one document attached", body = AttachDocumentsResponse),
        (status = 400, description = "No file was provided or every file was rejected"),
        (status = 403, description = "Caller is not the case's lawyer")
    )
)]
pub async fn attach_documents(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<AttachDocumentsResponse>)> {
    let case = fetch_case(&state.pool, id).await?;
    authorize(&actor.principal(), Action::UploadDocument, &case_target(&case))?;

    let mut form = read_form(multipart).await?;
    let files = form.take_files("documents");
    if files.is_empty() {
        return Err(AppError::validation("at least one document is required"));
    }

    let meta = DocumentMeta {
        document_type: DocumentType::CaseDocument,
        description: optional_text("description", form.text("description"), 1000)?,
        case_id: Some(case.id),
    };
    let (documents, rejected_documents) = store_documents(&state, actor.user_id, &files, &meta).await;

    if documents.is_empty() {
        let reasons: Vec<String> = rejected_documents
            .iter()
            .map(|rejected| format!("{}: {}", rejected.file_name, rejected.reason))
            .collect();
        return Err(AppError::validation(reasons.join("; ")));
    }

    Ok((
        StatusCode::CREATED,
        Json(AttachDocumentsResponse {
            documents,
            rejected_documents,
        }),
    ))
}

fn case_fields(form: &FormData) -> AppResult<CaseFields> {
    let case_number = optional_text("case number", form.text("case_number"), 50)?;
    let client_name = required_text("client name", form.text("client_name").unwrap_or_default(), 1, 200)?;
    let description = required_text("description", form.text("description").unwrap_or_default(), 1, MAX_DESCRIPTION)?;

    let case_type = form.text("case_type").map(str::parse::<CaseType>).transpose()?.unwrap_or_default();
    let status = form.text("status").map(str::parse::<CaseStatus>).transpose()?.unwrap_or_default();

    let client_contact_info = optional_text("client contact info", form.text("client_contact_info"), 200)?;

    let initial_consultation_date = form
        .text("initial_consultation_date")
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map_err(|_| AppError::validation("initial consultation date must be YYYY-MM-DD"))
        })
        .transpose()?;

    Ok(CaseFields {
        case_number,
        client_name,
        description,
        case_type,
        status,
        client_contact_info,
        initial_consultation_date,
    })
}

async fn case_detail(pool: &SqlitePool, actor: &Actor, case: DbCase) -> AppResult<CaseDetail> {
    authorize(&actor.principal(), Action::ViewCase, &case_target(&case))?;
    let documents = fetch_case_documents(pool, case.id).await?;
    Ok(CaseDetail {
        case: case.try_into()?,
        documents,
    })
}

pub(crate) fn case_target(case: &DbCase) -> Target {
    Target::Case {
        lawyer_id: case.lawyer_id,
    }
}

pub(crate) async fn fetch_case(pool: &SqlitePool, id: Uuid) -> AppResult<DbCase> {
    sqlx::query_as::<_, DbCase>(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("case not found"))
}

/// Every case, or only those owned by `lawyer_id`, newest first.
pub(crate) async fn fetch_cases(pool: &SqlitePool, lawyer_id: Option<Uuid>) -> AppResult<Vec<Case>> {
    let rows = match lawyer_id {
        Some(lawyer_id) => {
            sqlx::query_as::<_, DbCase>(&format!(
                "SELECT {CASE_COLUMNS} FROM cases WHERE lawyer_id = ? ORDER BY created_at DESC"
            ))
            .bind(lawyer_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, DbCase>(&format!("SELECT {CASE_COLUMNS} FROM cases ORDER BY created_at DESC"))
                .fetch_all(pool)
                .await?
        }
    };

    rows.into_iter().map(Case::try_from).collect()
}
