mod common;

use anyhow::Result;
use axum::http::StatusCode;

use common::{empty_request, TestApp};

#[tokio::test]
async fn health_endpoint_reports_db_ok() -> Result<()> {
    let t = TestApp::new().await?;

    let (status, v) = t.send(empty_request("GET", "/api/health", None)?).await?;
    assert_eq!(status, StatusCode::OK, "health endpoint did not return 200");
    assert_eq!(v["status"], "ok");
    let db_ok = v.get("db_ok").and_then(|b| b.as_bool()).unwrap_or(false);
    assert!(db_ok, "expected db_ok: true, got: {}", v);

    Ok(())
}

#[tokio::test]
async fn health_reports_a_closed_pool() -> Result<()> {
    let t = TestApp::new().await?;
    t.pool.close().await;

    let (status, v) = t.send(empty_request("GET", "/api/health", None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["db_ok"], false);
    assert!(v["db_error"].is_string());

    Ok(())
}
