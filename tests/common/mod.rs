#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::{tempdir, TempDir};
use tower::util::ServiceExt; // for `oneshot`

use lawfirm::jwt::JwtConfig;
use lawfirm::storage::LocalFileStorage;
use lawfirm::{router, AppState};

const BOUNDARY: &str = "lawfirm-test-boundary";

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    pub dir: TempDir,
}

/// A registered account and its bearer token.
pub struct TestUser {
    pub id: String,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        let dir = tempdir().context("failed to create tempdir")?;
        let db_path = dir.path().join("test.db");

        let opts = SqliteConnectOptions::new()
            .filename(db_path.as_path())
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(opts).await?;

        let migrator =
            sqlx::migrate::Migrator::new(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")).await?;
        migrator.run(&pool).await?;

        let storage = Arc::new(LocalFileStorage::new(dir.path().join("media")));
        let state = AppState::new(pool.clone(), JwtConfig::new("test-secret", 24), storage);

        Ok(Self {
            app: router(state),
            pool,
            dir,
        })
    }

    /// Sends a request and returns the status with the body parsed as JSON (null when empty).
    pub async fn send(&self, req: Request<Body>) -> Result<(StatusCode, Value)> {
        let resp = self.app.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), 64 * 1024 * 1024).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        Ok((status, value))
    }

    /// Sends a request and returns the raw body bytes.
    pub async fn send_raw(&self, req: Request<Body>) -> Result<(StatusCode, Vec<u8>)> {
        let resp = self.app.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), 64 * 1024 * 1024).await?;
        Ok((status, bytes.to_vec()))
    }

    pub async fn register(&self, username: &str, role: &str) -> Result<TestUser> {
        let body = json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "password123",
            "role": role,
        });
        let (status, value) = self.send(json_request("POST", "/auth/register", None, &body)?).await?;
        if status != StatusCode::CREATED {
            panic!("register failed: {} - {}", status, value);
        }

        Ok(TestUser {
            id: value["user"]["id"].as_str().context("missing user id")?.to_string(),
            token: value["token"].as_str().context("missing token")?.to_string(),
        })
    }

    pub async fn count(&self, table: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Result<Request<Body>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    Ok(builder.body(Body::from(body.to_string()))?)
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    Ok(builder.body(Body::empty())?)
}

/// A file part: form field name, file name, content.
pub type FilePart<'a> = (&'a str, &'a str, &'a [u8]);

pub fn multipart_request(
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    files: &[FilePart<'_>],
) -> Result<Request<Body>> {
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    for (name, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body))?)
}
