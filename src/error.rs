use thiserror::Error;

pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors raised by the scoring core and the ingestion paths around it.
///
/// Every variant is recoverable by the caller: a bad bracket aborts one
/// user's import, a missing championship makes standings unavailable.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid pick for {user}{}: {message}", slot_suffix(.slot))]
    Validation {
        user: String,
        slot: Option<u32>,
        message: String,
    },

    #[error("missing data: {0}")]
    MissingData(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid season configuration: {0}")]
    Config(String),

    #[error("game feed error: {0}")]
    Feed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

fn slot_suffix(slot: &Option<u32>) -> String {
    match slot {
        Some(n) => format!(" (CFP Game {})", n),
        None => String::new(),
    }
}

impl PoolError {
    pub fn validation(user: impl Into<String>, slot: Option<u32>, message: impl Into<String>) -> Self {
        Self::Validation {
            user: user.into(),
            slot,
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<reqwest::Error> for PoolError {
    fn from(e: reqwest::Error) -> Self {
        PoolError::Feed(e.to_string())
    }
}
