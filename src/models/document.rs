use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::choices::DocumentType;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub case_id: Option<Uuid>,
    pub original_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    /// Hex-encoded SHA-256 of the stored content.
    pub checksum: String,
    pub document_type: DocumentType,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub case_id: Option<Uuid>,
    pub storage_key: String,
    pub original_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub checksum: String,
    pub document_type: String,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl TryFrom<DbDocument> for Document {
    type Error = AppError;

    fn try_from(value: DbDocument) -> Result<Self, Self::Error> {
        Ok(Document {
            id: value.id,
            user_id: value.user_id,
            case_id: value.case_id,
            original_name: value.original_name,
            content_type: value.content_type,
            size_bytes: value.size_bytes,
            checksum: value.checksum,
            document_type: value.document_type.parse()?,
            description: value.description,
            uploaded_at: value.uploaded_at,
        })
    }
}

/// A file part received from a multipart form, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RejectedUpload {
    pub file_name: String,
    pub reason: String,
}

/// Multipart layout accepted by `POST /documents`. Documented only; parsed by hand.
#[allow(dead_code)]
#[derive(Debug, ToSchema)]
pub struct DocumentUploadForm {
    /// The file itself (.pdf, .doc or .docx, at most 10 MiB).
    pub file: String,
    pub document_type: Option<DocumentType>,
    pub description: Option<String>,
    pub case_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttachDocumentsResponse {
    pub documents: Vec<Document>,
    pub rejected_documents: Vec<RejectedUpload>,
}
