use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{authorize, Action, Target};
use crate::errors::{AppError, AppResult};
use crate::jwt::Actor;
use crate::models::choices::DocumentType;
use crate::models::document::Document;
use crate::routes::cases::{case_target, fetch_case};
use crate::routes::uploads::{fetch_document, fetch_user_documents, read_form, store_document, DocumentMeta};
use crate::storage::sanitize_file_name;
use crate::utils::optional_text;

#[utoipa::path(
    get,
    path = "/documents",
    tag = "Documents",
    responses((status = 200, description = "Documents uploaded by the caller, newest first", body = [Document]))
)]
pub async fn list_documents(State(state): State<AppState>, actor: Actor) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(fetch_user_documents(&state.pool, actor.user_id).await?))
}

#[utoipa::path(
    post,
    path = "/documents",
    tag = "Documents",
    request_body(content = crate::models::document::DocumentUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = Document),
        (status = 400, description = "Missing file, disallowed extension or oversize file"),
        (status = 403, description = "Target case belongs to another lawyer")
    )
)]
pub async fn upload_document(
    State(state): State<AppState>,
    actor: Actor,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Document>)> {
    let mut form = read_form(multipart).await?;

    let case_id = form
        .text("case_id")
        .map(|value| Uuid::parse_str(value).map_err(|_| AppError::validation("case_id must be a valid UUID")))
        .transpose()?;

    let target = match case_id {
        Some(case_id) => case_target(&fetch_case(&state.pool, case_id).await?),
        None => Target::None,
    };
    authorize(&actor.principal(), Action::UploadDocument, &target)?;

    let document_type = form
        .text("document_type")
        .map(str::parse::<DocumentType>)
        .transpose()?
        .unwrap_or_default();
    let description = optional_text("description", form.text("description"), 1000)?;

    let file = form
        .take_files("file")
        .into_iter()
        .next()
        .ok_or_else(|| AppError::validation("file field is required"))?;

    let meta = DocumentMeta {
        document_type,
        description,
        case_id,
    };
    let document = store_document(&state, actor.user_id, &file, &meta).await?;

    Ok((StatusCode::CREATED, Json(document)))
}

#[utoipa::path(
    get,
    path = "/documents/{id}/content",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Stored file content", content_type = "application/octet-stream"),
        (status = 403, description = "Document is private to another user"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn download_document(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let document = fetch_document(&state.pool, id).await?;
    authorize(
        &actor.principal(),
        Action::ViewDocument,
        &Target::Document {
            owner_id: document.user_id,
            case_id: document.case_id,
        },
    )?;

    let bytes = state
        .storage
        .get_object(&document.storage_key)
        .await
        .map_err(|err| AppError::storage(format!("failed to read document {id}: {err:#}")))?;

    let content_type = document
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_file_name(&document.original_name)
    );

    Ok((
        [(header::CONTENT_TYPE, content_type), (header::CONTENT_DISPOSITION, disposition)],
        bytes,
    )
        .into_response())
}
