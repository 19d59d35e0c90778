mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{empty_request, json_request, TestApp};

#[tokio::test]
async fn day_view_shows_only_that_day_for_that_user() -> Result<()> {
    let t = TestApp::new().await?;
    let lawyer = t.register("law", "lawyer").await?;
    let other = t.register("sec", "secretary").await?;

    let hearing = json!({
        "title": "Hearing: Dupont v. Martin",
        "start_time": "2025-10-01T09:00:00Z",
        "end_time": "2025-10-01T10:00:00Z",
        "event_type": "court_appearance",
        "location": "Room 2"
    });
    let (status, event) = t
        .send(json_request("POST", "/calendar/events", Some(&lawyer.token), &hearing)?)
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{event}");

    let next_day = json!({
        "title": "Filing deadline",
        "start_time": "2025-10-02T00:00:00Z",
        "end_time": "2025-10-02T00:00:00Z",
        "event_type": "deadline"
    });
    let (status, _) = t
        .send(json_request("POST", "/calendar/events", Some(&lawyer.token), &next_day)?)
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let save = json!({
        "diary": {
            "content": "Hearing went well, judge asked for more exhibits.",
            "related_event_id": event["id"]
        }
    });
    let (status, saved) = t
        .send(json_request("POST", "/calendar/days/2025-10-01", Some(&lawyer.token), &save)?)
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{saved}");
    assert_eq!(saved["diary"]["outcome"], "saved");
    assert_eq!(saved["event"]["outcome"], "absent");
    assert_eq!(saved["partial"], false);

    let (status, day) = t
        .send(empty_request("GET", "/calendar/days/2025-10-01", Some(&lawyer.token))?)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["date"], "2025-10-01");
    let events = day["events"].as_array().cloned().unwrap_or_default();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Hearing: Dupont v. Martin");
    let entries = day["diary_entries"].as_array().cloned().unwrap_or_default();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Untitled");
    assert_eq!(entries[0]["date"], "2025-10-01");

    let (_, next) = t
        .send(empty_request("GET", "/calendar/days/2025-10-02", Some(&lawyer.token))?)
        .await?;
    assert_eq!(next["events"].as_array().map(Vec::len), Some(1));
    assert_eq!(next["diary_entries"].as_array().map(Vec::len), Some(0));

    let (_, theirs) = t
        .send(empty_request("GET", "/calendar/days/2025-10-01", Some(&other.token))?)
        .await?;
    assert_eq!(theirs["events"].as_array().map(Vec::len), Some(0));
    assert_eq!(theirs["diary_entries"].as_array().map(Vec::len), Some(0));

    Ok(())
}

#[tokio::test]
async fn compound_save_reports_partial_success() -> Result<()> {
    let t = TestApp::new().await?;
    let user = t.register("ast", "legal_assistant").await?;

    let save = json!({
        "diary": {"title": "Research", "content": "Read three appellate decisions on easements."},
        "event": {
            "title": "Backwards",
            "start_time": "2025-10-01T11:00:00Z",
            "end_time": "2025-10-01T10:00:00Z"
        }
    });
    let (status, saved) = t
        .send(json_request("POST", "/calendar/days/2025-10-01", Some(&user.token), &save)?)
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{saved}");
    assert_eq!(saved["diary"]["outcome"], "saved");
    assert_eq!(saved["event"]["outcome"], "rejected");
    assert_eq!(saved["partial"], true);

    assert_eq!(t.count("diary_entries").await?, 1);
    assert_eq!(t.count("calendar_events").await?, 0);

    // a malformed diary part does not sink a valid event
    let save = json!({
        "diary": {"content": 42},
        "event": {
            "title": "Client call",
            "start_time": "2025-10-01T14:00:00Z",
            "end_time": "2025-10-01T14:30:00Z",
            "event_type": "meeting"
        }
    });
    let (status, saved) = t
        .send(json_request("POST", "/calendar/days/2025-10-01", Some(&user.token), &save)?)
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["diary"]["outcome"], "rejected");
    assert_eq!(saved["event"]["outcome"], "saved");

    Ok(())
}

#[tokio::test]
async fn compound_save_fails_when_nothing_is_saved() -> Result<()> {
    let t = TestApp::new().await?;
    let user = t.register("att", "attache").await?;
    let other = t.register("law", "lawyer").await?;

    let save = json!({
        "diary": {"content": "too short"},
        "event": {"title": "", "start_time": "2025-10-01T11:00:00Z", "end_time": "2025-10-01T12:00:00Z"}
    });
    let (status, body) = t
        .send(json_request("POST", "/calendar/days/2025-10-01", Some(&user.token), &save)?)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = t
        .send(json_request("POST", "/calendar/days/2025-10-01", Some(&user.token), &json!({}))?)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // related events must belong to the author
    let foreign = json!({
        "title": "Their meeting",
        "start_time": "2025-10-01T09:00:00Z",
        "end_time": "2025-10-01T10:00:00Z"
    });
    let (_, foreign_event) = t
        .send(json_request("POST", "/calendar/events", Some(&other.token), &foreign)?)
        .await?;
    let save = json!({
        "diary": {
            "content": "Notes on somebody else's meeting.",
            "related_event_id": foreign_event["id"]
        }
    });
    let (status, _) = t
        .send(json_request("POST", "/calendar/days/2025-10-01", Some(&user.token), &save)?)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(t.count("diary_entries").await?, 0);
    assert_eq!(t.count("calendar_events").await?, 1);

    let (status, _) = t
        .send(empty_request("GET", "/calendar/days/2025-02-30", Some(&user.token))?)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn event_feed_colours_by_type() -> Result<()> {
    let t = TestApp::new().await?;
    let user = t.register("law", "lawyer").await?;

    for (title, kind) in [("Hearing", "court_appearance"), ("Lunch", "personal"), ("Misc", "other")] {
        let body = json!({
            "title": title,
            "start_time": "2025-10-03T12:00:00Z",
            "end_time": "2025-10-03T13:00:00Z",
            "event_type": kind
        });
        let (status, _) = t
            .send(json_request("POST", "/calendar/events", Some(&user.token), &body)?)
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let bad = json!({
        "title": "x".repeat(201),
        "start_time": "2025-10-03T12:00:00Z",
        "end_time": "2025-10-03T13:00:00Z"
    });
    let (status, _) = t.send(json_request("POST", "/calendar/events", Some(&user.token), &bad)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, feed) = t.send(empty_request("GET", "/calendar/events", Some(&user.token))?).await?;
    assert_eq!(status, StatusCode::OK);
    let feed = feed.as_array().cloned().unwrap_or_default();
    assert_eq!(feed.len(), 3);
    for item in &feed {
        let expected = match item["event_type"].as_str() {
            Some("court_appearance") => "#d83737",
            Some("personal") => "#6f42c1",
            _ => "#6c757d",
        };
        assert_eq!(item["color"], expected);
        assert!(item.get("start").is_some());
    }

    Ok(())
}
