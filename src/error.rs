use thiserror::Error;

/// Warning shown when the backend can't be reached or returns garbage
pub const UNREACHABLE_WARNING: &str =
    "⚠️ Failed to connect to the assistant. Is the backend running?";

/// Warning shown when the backend answers with JSON that has no `answer`
pub const MALFORMED_WARNING: &str = "⚠️ The assistant replied without an answer.";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to assistant backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("assistant backend returned a non-JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("assistant backend response is missing a string `answer` field: {0}")]
    MalformedResponse(String),

    #[error("request task ended without a result: {0}")]
    Task(String),
}

impl BackendError {
    /// Text appended to the conversation in place of an answer
    pub fn user_message(&self) -> &'static str {
        match self {
            BackendError::MalformedResponse(_) => MALFORMED_WARNING,
            BackendError::Transport(_) | BackendError::Decode(_) | BackendError::Task(_) => {
                UNREACHABLE_WARNING
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}
