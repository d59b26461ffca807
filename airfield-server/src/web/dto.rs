//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

/// Query string for the by-code lookup endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    /// IATA code or ident, depending on the endpoint
    pub code: Option<String>,

    /// `true` (any case) to refresh and include timezone data
    pub include_timezone: Option<String>,
}

impl LookupQuery {
    /// Only the literal `true`, case-insensitively, enables the timezone.
    pub fn include_timezone(&self) -> bool {
        self.include_timezone
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// The code, or an empty string when absent.
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
