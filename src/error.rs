use crate::database::DatabaseError;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database errors
    #[error("SQL error: {0}")]
    Sqlx(#[from] SqlxError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot source errors (store unavailable, feed closed)
    #[error("Snapshot source error: {0}")]
    Source(String),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Delivery failures reported by an event sink.
///
/// These never leave the notifier: they are logged and the event is dropped.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Transport-level failure (DNS, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Nobody is listening on the broadcast channel
    #[error("Broadcast error: {0}")]
    Broadcast(String),
}

impl SinkError {
    /// Whether the remote side rejected us for sending too fast
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SinkError::Api { status: 429, .. })
    }
}

/// Convenience function to convert Result<T, E> to AppResult<T>
pub fn map_to_app_error<T, E: std::error::Error>(result: Result<T, E>, context: &str) -> AppResult<T> {
    result.map_err(|e| AppError::Message(format!("{}: {}", context, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Config("POLL_INTERVAL_SECS must be greater than 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: POLL_INTERVAL_SECS must be greater than 0"
        );

        let err: AppError = DatabaseError::ConnectionTimeout.into();
        assert_eq!(err.to_string(), "Database error: Database connection timeout");
    }

    #[test]
    fn test_rate_limit_detection() {
        let err = SinkError::Api {
            status: 429,
            body: "Too Many Requests".to_string(),
        };
        assert!(err.is_rate_limited());
        assert!(!SinkError::Broadcast("no receivers".to_string()).is_rate_limited());
    }
}
