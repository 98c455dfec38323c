//! Snapshot load failures. Each of these is a hard failure; "absent" and
//! "empty" snapshots are not errors and fall back to generation instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetching {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing snapshot {origin}: {reason}")]
    Parse { origin: String, reason: String },
}
