use thiserror::Error;

pub type Result<T, E = QuestError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum QuestError {
    /// Malformed or missing input. Never reaches persistence.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("food entry {0} not found")]
    NotFound(String),

    /// Storage or network failure. The in-memory state is left as it was.
    #[error("persistence failed: {0:#}")]
    Persistence(#[from] anyhow::Error),

    #[error("configuration error: {0}")]
    Configuration(String),

    /// The view that started the operation was reset before it resolved.
    #[error("result discarded: the log was reloaded while the operation was in flight")]
    Superseded,
}

impl QuestError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        QuestError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, QuestError::NotFound(_))
    }
}
