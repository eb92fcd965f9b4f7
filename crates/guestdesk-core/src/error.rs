use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid guest record: {0}")]
    InvalidGuest(String),

    #[error("Corrupt guest row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },

    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
