use thiserror::Error;

/// Person tracker error types
#[derive(Error, Debug)]
pub enum DatmoError {
    /// Scan geometry asks for more beams than the pipeline was sized for.
    /// Fatal: the caller must stop rather than truncate the scan.
    #[error("Scan geometry yields {requested} beams, capacity is {capacity}")]
    BeamOverflow { requested: f64, capacity: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, DatmoError>;
