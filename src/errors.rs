// =============================================================================
// Engine error taxonomy
// =============================================================================
//
// Startup errors (configuration, data integrity) are fatal to engine
// construction. Query errors are local to a single call and recoverable by the
// caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Invalid static configuration, detected before any data is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("smoothing window must be positive, got {0}")]
    NonPositiveWindow(i64),

    #[error("smoothing window {0} is configured more than once")]
    DuplicateWindow(usize),

    #[error("no smoothing windows configured")]
    NoWindows,

    #[error("no partition years configured")]
    NoYears,

    #[error("partition year {0} is configured more than once")]
    DuplicateYear(i32),

    #[error("display cap must be at least 1")]
    ZeroDisplayCap,
}

/// Input series violates the ingestion contract. Rows are 0-based.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataIntegrityError {
    #[error("row {row}: {field} is not finite ({value})")]
    NonFinite {
        row: usize,
        field: &'static str,
        value: f64,
    },

    #[error("row {row}: OHLC bounds violated (open={open}, high={high}, low={low}, close={close})")]
    BoundViolation {
        row: usize,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("row {row}: duplicate timestamp {timestamp}")]
    DuplicateTimestamp {
        row: usize,
        timestamp: NaiveDateTime,
    },

    #[error("row {row}: timestamp {timestamp} is earlier than previous {previous}")]
    NonMonotonic {
        row: usize,
        previous: NaiveDateTime,
        timestamp: NaiveDateTime,
    },
}

/// Errors raised while building an engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("data integrity error: {0}")]
    DataIntegrity(#[from] DataIntegrityError),
}

/// Invalid view request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("year '{0}' is not a number")]
    InvalidYear(String),

    #[error("year {0} is not a configured partition year")]
    UnknownYear(i32),

    #[error("unknown indicator '{0}'")]
    UnknownIndicator(String),
}

impl QueryError {
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidYear(_) => "INVALID_YEAR",
            QueryError::UnknownYear(_) => "UNKNOWN_YEAR",
            QueryError::UnknownIndicator(_) => "UNKNOWN_INDICATOR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            QueryError::UnknownYear(_) => StatusCode::NOT_FOUND,
            QueryError::InvalidYear(_) | QueryError::UnknownIndicator(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "code": self.code(),
            "error": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
