use std::collections::HashMap;

use axum::extract::Multipart;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::choices::DocumentType;
use crate::models::document::{DbDocument, Document, RejectedUpload, UploadedFile};
use crate::storage::{document_key, sha256_hex, validate_upload};
use crate::utils::utc_now;

pub(crate) const DOCUMENT_COLUMNS: &str = "id, user_id, case_id, storage_key, original_name, content_type, size_bytes, checksum, document_type, description, uploaded_at";

/// A fully buffered multipart form: text fields by name, file parts in arrival order.
#[derive(Debug, Default)]
pub(crate) struct FormData {
    pub fields: HashMap<String, String>,
    pub files: Vec<(String, UploadedFile)>,
}

impl FormData {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = rest;
        matching.into_iter().map(|(_, file)| file).collect()
    }
}

pub(crate) async fn read_form(mut multipart: Multipart) -> AppResult<FormData> {
    let mut form = FormData::default();

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        tracing::warn!(error = %err, "invalid multipart data");
        AppError::validation(format!("invalid multipart data: {err}"))
    })? {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };

        match field.file_name().map(|n| n.to_string()) {
            Some(file_name) => {
                let content_type = field.content_type().map(|mime| mime.to_string());
                let data = field.bytes().await.map_err(|err| {
                    tracing::warn!(error = %err, "failed to read file bytes");
                    AppError::validation(format!("failed to read file bytes: {err}"))
                })?;
                // An untouched file input arrives as a nameless, empty part.
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                form.files.push((
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        bytes: data.to_vec(),
                    },
                ));
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| AppError::validation(format!("invalid value for {name}: {err}")))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Where a stored document belongs and how it is labelled.
#[derive(Debug, Clone, Default)]
pub(crate) struct DocumentMeta {
    pub document_type: DocumentType,
    pub description: Option<String>,
    pub case_id: Option<Uuid>,
}

/// Validates, writes and records a single file. Nothing is stored when validation fails.
pub(crate) async fn store_document(
    state: &AppState,
    owner_id: Uuid,
    file: &UploadedFile,
    meta: &DocumentMeta,
) -> AppResult<Document> {
    validate_upload(&file.file_name, file.bytes.len())?;

    let id = Uuid::new_v4();
    let uploaded_at = utc_now();
    let storage_key = document_key(uploaded_at, id, &file.file_name);
    let checksum = sha256_hex(&file.bytes);

    state
        .storage
        .put_object(&storage_key, &file.bytes)
        .await
        .map_err(|err| AppError::storage(format!("failed to store {}: {err:#}", file.file_name)))?;

    let inserted = sqlx::query(
        "INSERT INTO documents (id, user_id, case_id, storage_key, original_name, content_type, size_bytes, checksum, document_type, description, uploaded_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(owner_id)
    .bind(meta.case_id)
    .bind(&storage_key)
    .bind(&file.file_name)
    .bind(&file.content_type)
    .bind(file.bytes.len() as i64)
    .bind(&checksum)
    .bind(meta.document_type.as_str())
    .bind(&meta.description)
    .bind(uploaded_at)
    .execute(&state.pool)
    .await;

    if let Err(err) = inserted {
        if let Err(cleanup) = state.storage.delete_object(&storage_key).await {
            tracing::warn!(error = %cleanup, key = %storage_key, "failed to remove orphaned object");
        }
        return Err(err.into());
    }

    tracing::info!(
        document_id = %id,
        owner = %owner_id,
        case_id = ?meta.case_id,
        size = file.bytes.len(),
        "document stored"
    );

    fetch_document(&state.pool, id).await?.try_into()
}

/// Stores each file independently; a failure on one never blocks the rest.
pub(crate) async fn store_documents(
    state: &AppState,
    owner_id: Uuid,
    files: &[UploadedFile],
    meta: &DocumentMeta,
) -> (Vec<Document>, Vec<RejectedUpload>) {
    let mut stored = Vec::new();
    let mut rejected = Vec::new();

    for file in files {
        match store_document(state, owner_id, file, meta).await {
            Ok(document) => stored.push(document),
            Err(err) => {
                tracing::warn!(file_name = %file.file_name, error = %err, "document rejected");
                rejected.push(RejectedUpload {
                    file_name: file.file_name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    (stored, rejected)
}

pub(crate) async fn fetch_document(pool: &SqlitePool, id: Uuid) -> AppResult<DbDocument> {
    sqlx::query_as::<_, DbDocument>(&format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("document not found"))
}

pub(crate) async fn fetch_case_documents(pool: &SqlitePool, case_id: Uuid) -> AppResult<Vec<Document>> {
    sqlx::query_as::<_, DbDocument>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE case_id = ? ORDER BY uploaded_at DESC"
    ))
    .bind(case_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Document::try_from)
    .collect()
}

pub(crate) async fn fetch_user_documents(pool: &SqlitePool, user_id: Uuid) -> AppResult<Vec<Document>> {
    sqlx::query_as::<_, DbDocument>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = ? ORDER BY uploaded_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Document::try_from)
    .collect()
}
