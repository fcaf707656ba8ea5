use thiserror::Error;

#[derive(Error, Debug)]
pub enum HunterError {
    #[error("Unknown baseline strategy: {0}")]
    UnknownBaselineStrategy(String),

    #[error("trim_ratio must be in [0, 0.5), got {0}")]
    InvalidTrimRatio(f64),

    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("Invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("No history available for repository: {0}")]
    UnknownRepository(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HunterError {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HunterError>;
