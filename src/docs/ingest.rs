use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::types::Document;
use super::load_document;

/// Reduce an uploaded file name to something safe to write next to the bot.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Persist an uploaded PDF as `temp_<name>` inside `dir`.
pub async fn save_upload(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    if !file_name.to_lowercase().ends_with(".pdf") {
        anyhow::bail!("Only PDF files are accepted, got '{}'", file_name);
    }

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create upload dir {}", dir.display()))?;
    let path = dir.join(format!("temp_{}", sanitize_file_name(file_name)));
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write upload to {}", path.display()))?;

    info!(path = %path.display(), size = bytes.len(), "Upload saved");
    Ok(path)
}

/// Save an uploaded PDF and extract it.
pub async fn ingest_upload(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<Document> {
    let path = save_upload(dir, file_name, bytes).await?;
    match load_document(&path).await {
        Ok(document) => Ok(document),
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), "Failed to remove rejected upload: {}", remove_err);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_file_name("DataSetMath.pdf"), "DataSetMath.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd.pdf"), "passwd.pdf");
        assert_eq!(sanitize_file_name("my file.pdf"), "my_file.pdf");
    }

    #[tokio::test]
    async fn test_save_upload_prefixes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_upload(dir.path(), "stats.pdf", b"%PDF-1.4").await.unwrap();
        assert_eq!(path, dir.path().join("temp_stats.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_unreadable_upload_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ingest_upload(dir.path(), "broken.pdf", b"not a pdf").await.is_err());
        assert!(!dir.path().join("temp_broken.pdf").exists());
    }

    #[tokio::test]
    async fn test_save_upload_rejects_other_types() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_upload(dir.path(), "notes.docx", b"x").await.is_err());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
