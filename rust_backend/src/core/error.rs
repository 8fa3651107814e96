//! Error types for catalog and ranking operations.

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type for engine operations
///
/// Only [`EngineError::Io`] on the catalog snapshot itself is fatal to a run.
/// Row and target level variants are collected and reported next to the
/// successful results instead of aborting the batch.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("Unparsable timestamp for object {id}: {value:?}")]
    TimestampParse { id: String, value: String },

    #[error("Visibility computation failed for object {id}: {reason}")]
    VisibilityComputation { id: String, reason: String },

    #[error("Ephemeris error: {0}")]
    Ephemeris(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to persist {path}: {reason}")]
    Persist { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Build a [`EngineError::MalformedRow`] from anything printable.
    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        EngineError::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    /// Build a [`EngineError::VisibilityComputation`] for the given object id.
    pub fn visibility(id: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::VisibilityComputation {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Classify a csv error raised while reading one record.
    ///
    /// Undecodable records become [`EngineError::MalformedRow`]; I/O failures
    /// stay fatal for the file.
    pub fn from_record(err: csv::Error) -> Self {
        if matches!(err.kind(), csv::ErrorKind::Io(_)) {
            return EngineError::Csv(err);
        }
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        EngineError::malformed(line, err.to_string())
    }

    /// Whether the error only concerns a single row or target.
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            EngineError::MalformedRow { .. }
                | EngineError::TimestampParse { .. }
                | EngineError::VisibilityComputation { .. }
        )
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::Configuration(format!("Failed to parse config: {}", err))
    }
}
