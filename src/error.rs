use thiserror::Error;

#[derive(Error, Debug)]
pub enum StandardizerError {
    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file has no header row: {0}")]
    EmptyInput(String),
}

pub type Result<T> = std::result::Result<T, StandardizerError>;
