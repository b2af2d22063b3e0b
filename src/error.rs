use thiserror::Error;

pub type Result<T> = std::result::Result<T, TableroError>;

#[derive(Debug, Error)]
pub enum TableroError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
