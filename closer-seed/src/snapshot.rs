//! Load a persisted task snapshot from a file or an HTTP URL.
//!
//! Accepted formats:
//! - JSON: an array of Task records (camelCase keys, as the web app writes them)
//! - CSV: header row `id,title,revenue,timeTaken,priority,status,notes,createdAt,completedAt`
//!
//! A missing file or a non-success HTTP status means "no snapshot" (`Ok(None)`),
//! so the caller can fall back to generated data.

use crate::error::LoadError;
use closer_core::Task;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SnapshotSource {
    #[default]
    None,
    File(PathBuf),
    Url(String),
}

impl SnapshotSource {
    /// `http(s)://...` is a URL, `none` or blank means no snapshot, anything
    /// else is a file path.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            SnapshotSource::None
        } else if s.starts_with("http://") || s.starts_with("https://") {
            SnapshotSource::Url(s.to_string())
        } else {
            SnapshotSource::File(PathBuf::from(s))
        }
    }
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSource::None => write!(f, "none"),
            SnapshotSource::File(p) => write!(f, "{}", p.display()),
            SnapshotSource::Url(u) => write!(f, "{u}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Csv,
}

fn detect_format(name: &str) -> Format {
    let path = name.split(['?', '#']).next().unwrap_or(name);
    if path.to_ascii_lowercase().ends_with(".csv") {
        Format::Csv
    } else {
        Format::Json
    }
}

pub async fn load_snapshot(source: &SnapshotSource) -> Result<Option<Vec<Task>>, LoadError> {
    match source {
        SnapshotSource::None => Ok(None),
        SnapshotSource::File(path) => {
            if !path.exists() {
                info!(path = %path.display(), "snapshot file not found");
                return Ok(None);
            }
            let body = tokio::fs::read_to_string(path).await.map_err(|e| LoadError::Io {
                path: path.clone(),
                source: e,
            })?;
            let origin = path.display().to_string();
            parse_snapshot(&body, detect_format(&origin), &origin).map(Some)
        }
        SnapshotSource::Url(url) => {
            let res = reqwest::get(url).await.map_err(|e| LoadError::Transport {
                url: url.clone(),
                source: e,
            })?;
            if !res.status().is_success() {
                warn!(%url, status = %res.status(), "snapshot request not ok");
                return Ok(None);
            }
            let body = res.text().await.map_err(|e| LoadError::Transport {
                url: url.clone(),
                source: e,
            })?;
            parse_snapshot(&body, detect_format(url), url).map(Some)
        }
    }
}

fn parse_snapshot(body: &str, format: Format, origin: &str) -> Result<Vec<Task>, LoadError> {
    let parse_err = |reason: String| LoadError::Parse {
        origin: origin.to_string(),
        reason,
    };
    match format {
        Format::Json => serde_json::from_str(body).map_err(|e| parse_err(e.to_string())),
        Format::Csv => parse_csv(body).map_err(|e| parse_err(e.to_string())),
    }
}

fn parse_csv(body: &str) -> Result<Vec<Task>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    rdr.deserialize().collect()
}
