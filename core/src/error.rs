use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, persisting or loading an index.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Every input document was skipped or produced no indexed terms.
    #[error("no documents survived preprocessing")]
    EmptyCorpus,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed binary data in {path}: {source}")]
    Binary {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    /// A loaded index whose vocabulary disagrees with its postings.
    #[error("index invariant violated for term {term}: {reason}")]
    Invariant { term: String, reason: String },
}

impl PipelineError {
    /// Write failures only affect auxiliary artifacts; the in-memory index is still usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipelineError::Write { .. })
    }
}
