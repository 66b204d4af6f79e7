use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by data-access collaborators.
///
/// The layout and hierarchy layers never produce these; data-shape
/// problems inside a snapshot are repaired, not reported. A `SourceError`
/// means the snapshot itself could not be fetched or decoded, and the
/// engine keeps its last good working set when one occurs.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Parse(String),

    #[error("snapshot has no usable task rows ({skipped} skipped)")]
    EmptySnapshot { skipped: usize },

    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}
