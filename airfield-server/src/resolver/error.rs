//! Resolver error types.

use std::fmt;
use std::time::Duration;

/// Errors from the external timezone resolver.
#[derive(Debug)]
pub enum ResolverError {
    /// HTTP request failed (network error, client-side timeout, etc.)
    Http(reqwest::Error),

    /// Response body was not the expected JSON
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned a non-success HTTP status
    ApiError { status: u16, message: String },

    /// API reported no timezone for the location
    NotFound,

    /// API answered with an explicit non-OK status in the body
    Status {
        status: String,
        message: Option<String>,
    },

    /// Rate limited by the API
    RateLimited,

    /// Invalid API key or unauthorized
    Unauthorized,

    /// No answer within the configured deadline
    Timeout(Duration),

    /// Client could not be set up
    NotConfigured(String),
}

impl ResolverError {
    /// Whether the API positively said there is no timezone here.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolverError::NotFound)
    }
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverError::Http(e) => write!(f, "HTTP error: {e}"),
            ResolverError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            ResolverError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            ResolverError::NotFound => write!(f, "no timezone found for location"),
            ResolverError::Status { status, message } => {
                write!(f, "API status {status}")?;
                if let Some(message) = message {
                    write!(f, ": {message}")?;
                }
                Ok(())
            }
            ResolverError::RateLimited => write!(f, "rate limited by timezone API"),
            ResolverError::Unauthorized => write!(f, "unauthorized (invalid API key)"),
            ResolverError::Timeout(d) => write!(f, "no response within {}ms", d.as_millis()),
            ResolverError::NotConfigured(msg) => write!(f, "not configured: {msg}"),
        }
    }
}

impl std::error::Error for ResolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolverError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ResolverError {
    fn from(err: reqwest::Error) -> Self {
        ResolverError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ResolverError::NotFound;
        assert_eq!(err.to_string(), "no timezone found for location");
        assert!(err.is_not_found());

        let err = ResolverError::ApiError {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");
        assert!(!err.is_not_found());

        let err = ResolverError::Status {
            status: "REQUEST_DENIED".into(),
            message: Some("The provided API key is invalid.".into()),
        };
        assert_eq!(
            err.to_string(),
            "API status REQUEST_DENIED: The provided API key is invalid."
        );

        let err = ResolverError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("<html>"));

        let err = ResolverError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "no response within 1500ms");
    }
}
