use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::choices::{CaseStatus, CaseType};
use crate::models::document::{Document, RejectedUpload};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Case {
    pub id: Uuid,
    #[schema(example = "2f1c0d52-8a4e-4d7f-9c1e-0d5b7d3f9a10")]
    pub case_number: String,
    pub client_name: String,
    pub description: String,
    /// Owning lawyer; null once that user has been removed.
    pub lawyer_id: Option<Uuid>,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub client_contact_info: Option<String>,
    pub initial_consultation_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbCase {
    pub id: Uuid,
    pub case_number: String,
    pub client_name: String,
    pub description: String,
    pub lawyer_id: Option<Uuid>,
    pub case_type: String,
    pub status: String,
    pub client_contact_info: Option<String>,
    pub initial_consultation_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbCase> for Case {
    type Error = AppError;

    fn try_from(value: DbCase) -> Result<Self, Self::Error> {
        Ok(Case {
            id: value.id,
            case_number: value.case_number,
            client_name: value.client_name,
            description: value.description,
            lawyer_id: value.lawyer_id,
            case_type: value.case_type.parse()?,
            status: value.status.parse()?,
            client_contact_info: value.client_contact_info,
            initial_consultation_date: value.initial_consultation_date,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

/// Case fields gathered from a create form.
#[derive(Debug, Clone, Default)]
pub struct CaseFields {
    pub case_number: Option<String>,
    pub client_name: String,
    pub description: String,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub client_contact_info: Option<String>,
    pub initial_consultation_date: Option<NaiveDate>,
}

/// Multipart layout accepted by `POST /cases`. Documented only; parsed by hand.
#[allow(dead_code)]
#[derive(Debug, ToSchema)]
pub struct CaseCreateForm {
    pub case_number: Option<String>,
    pub client_name: String,
    pub description: String,
    pub case_type: Option<CaseType>,
    pub status: Option<CaseStatus>,
    pub client_contact_info: Option<String>,
    #[schema(example = "2025-09-30")]
    pub initial_consultation_date: Option<String>,
    /// Zero or more files in repeated `documents` parts.
    pub documents: Option<Vec<String>>,
}

/// Full replacement of a case's editable fields.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CaseUpdateRequest {
    pub client_name: String,
    pub description: String,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub client_contact_info: Option<String>,
    pub initial_consultation_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CaseListQuery {
    pub mine: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CaseDetail {
    pub case: Case,
    /// Newest first.
    pub documents: Vec<Document>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CaseCreatedResponse {
    pub case: Case,
    pub documents: Vec<Document>,
    pub rejected_documents: Vec<RejectedUpload>,
}
