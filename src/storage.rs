use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Largest accepted document, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted document extensions, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

#[async_trait]
pub trait FileStorage: Send + Sync + 'static {
    async fn put_object(&self, key: &str, bytes: &[u8]) -> Result<()>;

    async fn get_object(&self, key: &str) -> Result<Vec<u8>>;

    async fn delete_object(&self, key: &str) -> Result<()>;
}

/// Stores objects as files below a media root directory.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Self {
        let root = std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());
        Self::new(root)
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            anyhow::bail!("invalid storage key: {key}");
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn put_object(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to delete {}", path.display())),
        }
    }
}

/// Checks a file against the extension allow-list and the size cap.
pub fn validate_upload(file_name: &str, size: usize) -> AppResult<()> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => return Err(AppError::validation("only PDF, DOC and DOCX files are allowed")),
    }

    if size == 0 {
        return Err(AppError::validation("file must not be empty"));
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::validation("file size must be under 10MB"));
    }

    Ok(())
}

/// Date-partitioned key: `documents/YYYY/MM/DD/<id>-<name>`.
pub fn document_key(uploaded_at: DateTime<Utc>, id: Uuid, file_name: &str) -> String {
    format!(
        "documents/{}/{}-{}",
        uploaded_at.format("%Y/%m/%d"),
        id,
        sanitize_file_name(file_name)
    )
}

pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn accepts_allowed_extensions_in_any_case() {
        assert!(validate_upload("brief.pdf", 10).is_ok());
        assert!(validate_upload("brief.DOC", 10).is_ok());
        assert!(validate_upload("brief.Docx", 10).is_ok());
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["photo.png", "script.exe", "noext", "archive.pdf.zip", ".pdf"] {
            let err = validate_upload(name, 10).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{name}");
        }
    }

    #[test]
    fn size_cap_is_inclusive() {
        assert!(validate_upload("a.pdf", MAX_UPLOAD_BYTES).is_ok());
        assert!(matches!(
            validate_upload("a.pdf", MAX_UPLOAD_BYTES + 1),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(validate_upload("a.pdf", 0), Err(AppError::Validation(_))));
    }

    #[test]
    fn keys_are_date_partitioned_and_sanitized() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
        let id = Uuid::nil();
        let key = document_key(at, id, "../../etc/Mémo final.pdf");
        assert_eq!(
            key,
            "documents/2025/03/07/00000000-0000-0000-0000-000000000000-M_mo_final.pdf"
        );
    }

    #[test]
    fn checksum_is_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn local_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());

        storage.put_object("documents/2025/01/01/x.pdf", b"%PDF").await.unwrap();
        assert_eq!(storage.get_object("documents/2025/01/01/x.pdf").await.unwrap(), b"%PDF");

        storage.delete_object("documents/2025/01/01/x.pdf").await.unwrap();
        assert!(storage.get_object("documents/2025/01/01/x.pdf").await.is_err());
        storage.delete_object("documents/2025/01/01/x.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn local_storage_refuses_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());
        assert!(storage.put_object("../outside.pdf", b"x").await.is_err());
        assert!(storage.put_object("/abs.pdf", b"x").await.is_err());
    }
}
