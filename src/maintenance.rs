//! Offline data-root maintenance: `rebuild` and `check`.
//!
//! The store is the source of truth; snapshots are derived artifacts. A
//! crash between a database write and a snapshot write leaves the two out
//! of sync, and `rebuild` closes that gap by regenerating every snapshot
//! from stored state. `check` reports the same class of drift without
//! touching anything.

use crate::render::{self, RenderError};
use crate::store::{Store, StoreError};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaintenanceError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single inconsistency between the store and the data root.
#[derive(Debug, PartialEq, Eq)]
pub enum Problem {
    MissingDirectory { id: i64 },
    MissingSnapshot { id: i64 },
    MissingMedia { id: i64, filename: String },
    /// A file beside the snapshot and the declared media file.
    StrayFile { id: i64, filename: String },
    /// A numeric directory with no article row behind it.
    UnknownDirectory { name: String },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::MissingDirectory { id } => write!(f, "article {id}: directory missing"),
            Problem::MissingSnapshot { id } => write!(f, "article {id}: index.html missing"),
            Problem::MissingMedia { id, filename } => {
                write!(f, "article {id}: media file '{filename}' missing")
            }
            Problem::StrayFile { id, filename } => {
                write!(f, "article {id}: stray file '{filename}'")
            }
            Problem::UnknownDirectory { name } => {
                write!(f, "directory '{name}' has no article row")
            }
        }
    }
}

/// Regenerate every article's snapshot. Returns how many were written.
pub async fn rebuild_all(store: &Store, root: &Path) -> Result<usize, MaintenanceError> {
    let articles = store.list_articles().await?;
    for article in &articles {
        let comments = store.comments(article.id).await?;
        render::write_snapshot(root, article, &comments)?;
    }
    Ok(articles.len())
}

/// Compare the data root against the store, read-only.
pub async fn check(store: &Store, root: &Path) -> Result<Vec<Problem>, MaintenanceError> {
    let articles = store.list_articles().await?;
    let mut problems = Vec::new();
    let mut known_dirs = HashSet::new();

    for article in &articles {
        let dir = root.join(article.id.to_string());
        known_dirs.insert(article.id.to_string());

        if !dir.is_dir() {
            problems.push(Problem::MissingDirectory { id: article.id });
            continue;
        }
        if !dir.join("index.html").is_file() {
            problems.push(Problem::MissingSnapshot { id: article.id });
        }
        if let Some(media) = &article.media
            && !dir.join(media).is_file()
        {
            problems.push(Problem::MissingMedia {
                id: article.id,
                filename: media.clone(),
            });
        }

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let expected = name == "index.html" || Some(name.as_str()) == article.media.as_deref();
            if !expected {
                problems.push(Problem::StrayFile {
                    id: article.id,
                    filename: name,
                });
            }
        }
    }

    // Numeric directories nothing in the store points at
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.parse::<i64>().is_ok() && !known_dirs.contains(&name) {
            problems.push(Problem::UnknownDirectory { name });
        }
    }

    Ok(problems)
}
