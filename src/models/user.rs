use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

text_choice! {
    /// Fixed job role of a user. Assigned at registration and never changed.
    Role, "role", default = Lawyer {
        Lawyer => "lawyer",
        Secretary => "secretary",
        Attache => "attache",
        LegalAssistant => "legal_assistant",
    }
}

impl Role {
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Lawyer => "Lawyer",
            Role::Secretary => "Secretary",
            Role::Attache => "Attaché",
            Role::LegalAssistant => "Legal Assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub role_display: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = AppError;

    fn try_from(value: DbUser) -> Result<Self, Self::Error> {
        let role: Role = value.role.parse().map_err(|_| {
            AppError::internal(format!("user {} has unknown role {:?}", value.id, value.role))
        })?;

        Ok(User {
            id: value.id,
            username: value.username,
            email: value.email,
            role,
            role_display: role.display_name().to_string(),
            phone_number: value.phone_number,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "acharles")]
    pub username: String,
    #[schema(example = "alice.charles@example.com")]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
    pub role: Role,
    #[schema(example = "+33 1 23 45 67 89")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "acharles")]
    pub username: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}
