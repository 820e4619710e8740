pub mod ingest;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use types::Document;

/// Alternative spelling some deployments ship the dataset under.
const ALT_DATASET_FILE: &str = "dataset_Math.pdf";

/// Ordered list of places the dataset may live.
pub fn candidate_paths(file_name: &str, exe_dir: Option<&Path>, cwd: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(file_name), Path::new(".").join(file_name)];
    if let Some(dir) = exe_dir {
        paths.push(dir.join(file_name));
    }
    if let Some(dir) = cwd {
        paths.push(dir.join(file_name));
    }
    paths.push(Path::new("/app").join(file_name));
    paths.push(Path::new("/mount/src").join(file_name));
    for dir in ["data", "assets", "documents"] {
        paths.push(Path::new(dir).join(file_name));
    }
    paths.push(PathBuf::from(ALT_DATASET_FILE));
    paths
}

/// Locate the dataset. An explicit path wins when it exists.
pub fn find_dataset(explicit: Option<&Path>, file_name: &str) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "DATASET_PATH does not exist, probing defaults");
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();

    candidate_paths(file_name, exe_dir.as_deref(), cwd.as_deref())
        .into_iter()
        .find(|p| {
            let hit = p.exists();
            debug!(path = %p.display(), hit, "probing dataset location");
            hit
        })
}

/// Diagnostics for when the dataset could not be found.
pub fn describe_search(dir: &Path) -> String {
    let mut out = format!("Current working directory: {}", dir.display());

    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect();
            names.sort();
            let pdfs: Vec<&String> = names
                .iter()
                .filter(|n| n.to_lowercase().ends_with(".pdf"))
                .collect();
            out.push_str(&format!("\nPDF files found: {:?}", pdfs));
            out.push_str(&format!(
                "\nAll files in current dir: {:?}...",
                names.iter().take(10).collect::<Vec<_>>()
            ));
        }
        Err(e) => out.push_str(&format!("\nError listing files: {}", e)),
    }

    out
}

/// Join extracted pages the way the document is presented to the model.
pub fn join_pages(pages: &[String]) -> String {
    pages.join("\n\n").trim().to_string()
}

/// Extract the full text of a PDF, every page.
pub async fn load_document(path: &Path) -> Result<Document> {
    let owned = path.to_path_buf();
    let (text, pages) = tokio::task::spawn_blocking(move || -> Result<(String, usize)> {
        match pdf_extract::extract_text_by_pages(&owned) {
            Ok(pages) => Ok((join_pages(&pages), pages.len())),
            Err(e) => {
                warn!(path = %owned.display(), "per-page extraction failed ({}), reading whole document", e);
                let text = pdf_extract::extract_text(&owned)
                    .map_err(|e| anyhow::anyhow!("Error reading PDF: {}", e))?;
                Ok((text.trim().to_string(), 1))
            }
        }
    })
    .await
    .context("spawn_blocking join failed")??;

    if text.is_empty() {
        anyhow::bail!("Error loading PDF: no extractable text in {}", path.display());
    }

    let doc = Document::new(path.to_path_buf(), text, pages);
    info!(
        name = %doc.name,
        pages = doc.pages,
        chars = doc.char_count(),
        fingerprint = &doc.fingerprint[..12],
        "Document loaded"
    );
    Ok(doc)
}
