use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid path template: {0}")]
    Template(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Index '{index}' failed: {reason}")]
    Index { index: &'static str, reason: String },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    File(#[from] FileIndexError),
}

pub type Result<T> = std::result::Result<T, IndexerError>;

/// Stage of the read → parse → dispatch chain a file failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Read,
    Parse,
    Dispatch,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Read => "read",
            ErrorClass::Parse => "parse",
            ErrorClass::Dispatch => "dispatch",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to index a single file. Walkers count these instead of aborting.
#[derive(Error, Debug)]
#[error("{class} failure for {}: {source}", path.display())]
pub struct FileIndexError {
    pub path: PathBuf,
    pub class: ErrorClass,
    #[source]
    pub source: Box<IndexerError>,
}

impl FileIndexError {
    pub fn new(path: impl Into<PathBuf>, class: ErrorClass, source: IndexerError) -> Self {
        Self {
            path: path.into(),
            class,
            source: Box::new(source),
        }
    }
}
