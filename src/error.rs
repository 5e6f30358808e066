use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Task not found on board: {0}")]
    TaskNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Invalid task ID: {0:?}")]
    InvalidTaskId(String),

    #[error("Invalid column ID: {0:?}")]
    InvalidColumnId(String),

    #[error("Column {0} does not accept dropped tasks")]
    ColumnReadOnly(String),

    #[error("No drag in progress for task {0}")]
    NoActiveDrag(String),

    #[error("A move for task {0} is still awaiting the server")]
    MoveInFlight(String),

    #[error("Invalid move state transition from {from} to {to}")]
    InvalidMoveTransition { from: String, to: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed move response: {0}")]
    MalformedResponse(String),

    #[error("Move rejected by server: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl SyncError {
    /// Text shown to the user when a move is rolled back.
    ///
    /// Only a server-supplied rejection reason is surfaced verbatim; network
    /// failures and malformed responses fall back to `generic`.
    pub fn user_message(&self, generic: &str) -> String {
        match self {
            Self::Rejected(Some(reason)) if !reason.trim().is_empty() => reason.clone(),
            _ => generic.to_string(),
        }
    }
}
