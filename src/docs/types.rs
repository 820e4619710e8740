use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// The reference document every answer is grounded in.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name shown to users, e.g. "DataSetMath.pdf"
    pub name: String,
    pub path: PathBuf,
    /// Full extracted text, pages separated by a blank line
    pub text: String,
    pub pages: usize,
    /// blake3 hex hash of `text`
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

impl Document {
    pub fn new(path: PathBuf, text: String, pages: usize) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let fingerprint = blake3::hash(text.as_bytes()).to_hex().to_string();
        Self {
            name,
            path,
            text,
            pages,
            fingerprint,
            loaded_at: Utc::now(),
        }
    }

    /// Length in characters, not bytes (the syllabus is mostly Thai).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}
