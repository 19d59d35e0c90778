use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::jwt::Actor;
use crate::models::calendar::{
    CalendarEvent, CalendarFeedItem, DaySaveRequest, DaySaveResponse, DayView, DbCalendarEvent, DbDiaryEntry,
    DiaryCreateRequest, DiaryEntry, EventCreateRequest, PartOutcome,
};
use crate::utils::{optional_text, required_text, utc_now};

const EVENT_COLUMNS: &str =
    "id, user_id, title, description, start_time, end_time, event_type, location, is_all_day, created_at";
const DIARY_COLUMNS: &str = "id, user_id, date, title, content, related_event_id, created_at, updated_at";

const DEFAULT_DIARY_TITLE: &str = "Untitled";

#[utoipa::path(
    get,
    path = "/calendar/events",
    tag = "Calendar",
    responses((status = 200, description = "The caller's events as a calendar feed", body = [CalendarFeedItem]))
)]
pub async fn list_events(State(state): State<AppState>, actor: Actor) -> AppResult<Json<Vec<CalendarFeedItem>>> {
    let events = fetch_events(&state.pool, actor.user_id).await?;
    Ok(Json(events.iter().map(CalendarFeedItem::from).collect()))
}

#[utoipa::path(
    post,
    path = "/calendar/events",
    tag = "Calendar",
    request_body = EventCreateRequest,
    responses(
        (status = 201, description = "Event created", body = CalendarEvent),
        (status = 400, description = "Invalid event")
    )
)]
pub async fn add_event(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<EventCreateRequest>,
) -> AppResult<(StatusCode, Json<CalendarEvent>)> {
    let event = validate_event(&payload).map_err(|reasons| AppError::validation(reasons.join("; ")))?;
    let event = insert_event(&state.pool, actor.user_id, event).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    get,
    path = "/calendar/days/{date}",
    tag = "Calendar",
    params(("date" = String, Path, description = "UTC calendar day, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Events starting on the day and diary entries dated on it", body = DayView),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn day_view(
    State(state): State<AppState>,
    actor: Actor,
    Path(date): Path<String>,
) -> AppResult<Json<DayView>> {
    let date = parse_day(&date)?;
    let (from, until) = day_bounds(date);

    let events = sqlx::query_as::<_, DbCalendarEvent>(&format!(
        "SELECT {EVENT_COLUMNS} FROM calendar_events WHERE user_id = ? AND start_time >= ? AND start_time < ? ORDER BY start_time ASC"
    ))
    .bind(actor.user_id)
    .bind(from)
    .bind(until)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .map(CalendarEvent::try_from)
    .collect::<AppResult<Vec<_>>>()?;

    let diary_entries = sqlx::query_as::<_, DbDiaryEntry>(&format!(
        "SELECT {DIARY_COLUMNS} FROM diary_entries WHERE user_id = ? AND date = ? ORDER BY created_at DESC"
    ))
    .bind(actor.user_id)
    .bind(date)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .map(DiaryEntry::from)
    .collect();

    Ok(Json(DayView {
        date,
        events,
        diary_entries,
    }))
}

#[utoipa::path(
    post,
    path = "/calendar/days/{date}",
    tag = "Calendar",
    params(("date" = String, Path, description = "UTC calendar day, YYYY-MM-DD")),
    request_body = DaySaveRequest,
    responses(
        (status = 201, description = "At least one part saved; each part reported separately", body = DaySaveResponse),
        (status = 400, description = "Nothing was saved")
    )
)]
pub async fn save_day(
    State(state): State<AppState>,
    actor: Actor,
    Path(date): Path<String>,
    Json(payload): Json<DaySaveRequest>,
) -> AppResult<(StatusCode, Json<DaySaveResponse>)> {
    let date = parse_day(&date)?;

    let diary = match payload.diary {
        None => PartOutcome::Absent,
        Some(raw) => save_diary_part(&state.pool, actor.user_id, date, raw).await?,
    };
    let event = match payload.event {
        None => PartOutcome::Absent,
        Some(raw) => save_event_part(&state.pool, actor.user_id, raw).await?,
    };

    if !diary.is_saved() && !event.is_saved() {
        let mut reasons = Vec::new();
        for (part, outcome) in [("diary", &diary), ("event", &event)] {
            if let PartOutcome::Rejected { reasons: part_reasons } = outcome {
                reasons.extend(part_reasons.iter().map(|reason| format!("{part}: {reason}")));
            }
        }
        if reasons.is_empty() {
            reasons.push("nothing to save".to_string());
        }
        tracing::info!(user_id = %actor.user_id, %date, "day save rejected");
        return Err(AppError::validation(reasons.join("; ")));
    }

    let submitted = [&diary, &event]
        .iter()
        .filter(|outcome| !matches!(outcome, PartOutcome::Absent))
        .count();
    let saved = [&diary, &event].iter().filter(|outcome| outcome.is_saved()).count();
    let partial = submitted == 2 && saved == 1;

    tracing::info!(user_id = %actor.user_id, %date, partial, "day saved");

    Ok((StatusCode::CREATED, Json(DaySaveResponse { diary, event, partial })))
}

/// An event that passed validation, with its text fields normalised.
struct ValidEvent {
    title: String,
    description: Option<String>,
    location: Option<String>,
    request: EventCreateRequest,
}

fn validate_event(request: &EventCreateRequest) -> Result<ValidEvent, Vec<String>> {
    let mut reasons = Vec::new();

    let title = keep(&mut reasons, required_text("title", &request.title, 1, 200));
    let description = keep(&mut reasons, optional_text("description", request.description.as_deref(), 5000));
    let location = keep(&mut reasons, optional_text("location", request.location.as_deref(), 200));

    if request.end_time < request.start_time {
        reasons.push("end time must not be before start time".to_string());
    }

    match (title, description, location) {
        (Some(title), Some(description), Some(location)) if reasons.is_empty() => Ok(ValidEvent {
            title,
            description,
            location,
            request: request.clone(),
        }),
        _ => Err(reasons),
    }
}

/// Records the message of a validation failure and yields the value on success.
fn keep<T>(reasons: &mut Vec<String>, result: AppResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(AppError::Validation(message)) => {
            reasons.push(message);
            None
        }
        Err(other) => {
            reasons.push(other.to_string());
            None
        }
    }
}

async fn insert_event(pool: &SqlitePool, user_id: Uuid, event: ValidEvent) -> AppResult<CalendarEvent> {
    let id = Uuid::new_v4();
    let event_type = event.request.event_type.unwrap_or_default();

    sqlx::query(
        "INSERT INTO calendar_events (id, user_id, title, description, start_time, end_time, event_type, location, is_all_day, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.request.start_time)
    .bind(event.request.end_time)
    .bind(event_type.as_str())
    .bind(&event.location)
    .bind(event.request.is_all_day)
    .bind(utc_now())
    .execute(pool)
    .await?;

    tracing::info!(event_id = %id, %user_id, %event_type, "calendar event created");

    sqlx::query_as::<_, DbCalendarEvent>(&format!("SELECT {EVENT_COLUMNS} FROM calendar_events WHERE id = ?"))
        .bind(id)
        .fetch_one(pool)
        .await?
        .try_into()
}

async fn save_event_part(pool: &SqlitePool, user_id: Uuid, raw: serde_json::Value) -> AppResult<PartOutcome> {
    let request: EventCreateRequest = match serde_path_to_error::deserialize(raw) {
        Ok(request) => request,
        Err(err) => return Ok(rejected(format!("malformed event: {err}"))),
    };

    match validate_event(&request) {
        Ok(event) => {
            let event = insert_event(pool, user_id, event).await?;
            Ok(PartOutcome::Saved { id: event.id })
        }
        Err(reasons) => Ok(PartOutcome::Rejected { reasons }),
    }
}

async fn save_diary_part(
    pool: &SqlitePool,
    user_id: Uuid,
    date: NaiveDate,
    raw: serde_json::Value,
) -> AppResult<PartOutcome> {
    let request: DiaryCreateRequest = match serde_path_to_error::deserialize(raw) {
        Ok(request) => request,
        Err(err) => return Ok(rejected(format!("malformed diary entry: {err}"))),
    };

    let mut reasons = Vec::new();
    let title = keep(&mut reasons, optional_text("title", request.title.as_deref(), 200));
    let content = keep(&mut reasons, required_text("content", &request.content, 10, 1000));

    if let Some(event_id) = request.related_event_id {
        let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM calendar_events WHERE id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        if owned == 0 {
            reasons.push("related event must be one of your events".to_string());
        }
    }

    let (Some(title), Some(content)) = (title, content) else {
        return Ok(PartOutcome::Rejected { reasons });
    };
    if !reasons.is_empty() {
        return Ok(PartOutcome::Rejected { reasons });
    }

    let id = Uuid::new_v4();
    let now = utc_now();

    sqlx::query(
        "INSERT INTO diary_entries (id, user_id, date, title, content, related_event_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(date)
    .bind(title.as_deref().unwrap_or(DEFAULT_DIARY_TITLE))
    .bind(&content)
    .bind(request.related_event_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::info!(entry_id = %id, %user_id, %date, "diary entry created");

    Ok(PartOutcome::Saved { id })
}

fn rejected(reason: String) -> PartOutcome {
    PartOutcome::Rejected { reasons: vec![reason] }
}

fn parse_day(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| AppError::validation("date must be YYYY-MM-DD"))
}

/// Half-open UTC interval covering `date`.
fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = date.and_time(chrono::NaiveTime::MIN).and_utc();
    (from, from + Duration::days(1))
}

/// All of a user's events, earliest first.
pub(crate) async fn fetch_events(pool: &SqlitePool, user_id: Uuid) -> AppResult<Vec<CalendarEvent>> {
    sqlx::query_as::<_, DbCalendarEvent>(&format!(
        "SELECT {EVENT_COLUMNS} FROM calendar_events WHERE user_id = ? ORDER BY start_time ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(CalendarEvent::try_from)
    .collect()
}

/// All of a user's diary entries, most recent day first.
pub(crate) async fn fetch_diary_entries(pool: &SqlitePool, user_id: Uuid) -> AppResult<Vec<DiaryEntry>> {
    let rows = sqlx::query_as::<_, DbDiaryEntry>(&format!(
        "SELECT {DIARY_COLUMNS} FROM diary_entries WHERE user_id = ? ORDER BY date DESC, created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(DiaryEntry::from).collect())
}
