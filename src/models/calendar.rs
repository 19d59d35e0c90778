use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::choices::EventType;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "2025-10-01T09:00:00Z")]
    pub start_time: DateTime<Utc>,
    #[schema(example = "2025-10-01T10:00:00Z")]
    pub end_time: DateTime<Utc>,
    pub event_type: EventType,
    pub location: Option<String>,
    pub is_all_day: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbCalendarEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub event_type: String,
    pub location: Option<String>,
    pub is_all_day: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbCalendarEvent> for CalendarEvent {
    type Error = AppError;

    fn try_from(value: DbCalendarEvent) -> Result<Self, Self::Error> {
        Ok(CalendarEvent {
            id: value.id,
            user_id: value.user_id,
            title: value.title,
            description: value.description,
            start_time: value.start_time,
            end_time: value.end_time,
            event_type: value.event_type.parse()?,
            location: value.location,
            is_all_day: value.is_all_day,
            created_at: value.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "2025-10-01")]
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
    /// Null once the referenced event has been deleted.
    pub related_event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbDiaryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
    pub related_event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbDiaryEntry> for DiaryEntry {
    fn from(value: DbDiaryEntry) -> Self {
        DiaryEntry {
            id: value.id,
            user_id: value.user_id,
            date: value.date,
            title: value.title,
            content: value.content,
            related_event_id: value.related_event_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EventCreateRequest {
    #[schema(example = "Hearing: Dupont v. Martin")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "2025-10-01T09:00:00Z")]
    pub start_time: DateTime<Utc>,
    #[schema(example = "2025-10-01T10:00:00Z")]
    pub end_time: DateTime<Utc>,
    pub event_type: Option<EventType>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DiaryCreateRequest {
    pub title: Option<String>,
    #[schema(example = "Met the client to review the settlement offer.")]
    pub content: String,
    pub related_event_id: Option<Uuid>,
}

/// One submission from the day page: a diary entry, an event, or both.
/// Parts are kept raw so a malformed part cannot reject its sibling.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DaySaveRequest {
    #[schema(value_type = Option<DiaryCreateRequest>)]
    pub diary: Option<serde_json::Value>,
    #[schema(value_type = Option<EventCreateRequest>)]
    pub event: Option<serde_json::Value>,
}

/// Entry in a calendar feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarFeedItem {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub color: String,
    pub event_type: EventType,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl From<&CalendarEvent> for CalendarFeedItem {
    fn from(event: &CalendarEvent) -> Self {
        CalendarFeedItem {
            id: event.id,
            title: event.title.clone(),
            start: event.start_time,
            end: event.end_time,
            color: event.event_type.color().to_string(),
            event_type: event.event_type,
            description: event.description.clone(),
            location: event.location.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DayView {
    pub date: NaiveDate,
    /// Ordered by start time.
    pub events: Vec<CalendarEvent>,
    pub diary_entries: Vec<DiaryEntry>,
}

/// Result of one part of a compound day save.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PartOutcome {
    Saved { id: Uuid },
    Rejected { reasons: Vec<String> },
    Absent,
}

impl PartOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, PartOutcome::Saved { .. })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DaySaveResponse {
    pub diary: PartOutcome,
    pub event: PartOutcome,
    /// True when exactly one of two submitted parts was saved.
    pub partial: bool,
}
