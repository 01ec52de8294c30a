use axum::http::StatusCode;
use thiserror::Error;

/// Failure of a single round trip to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path} not found")]
    NotFound { path: String },

    #[error("{path} answered {status}")]
    Status {
        path: String,
        status: reqwest::StatusCode,
    },

    #[error("request for {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} is not a workout document: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode workout document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("cannot address document {path}: {reason}")]
    InvalidPath { path: String, reason: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid STORE_URL {value:?}: {reason}")]
    InvalidStoreUrl { value: String, reason: String },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnknownUser(_) => Self::bad_request(err.to_string()),
            SessionError::Task(_) => Self::internal(err),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
