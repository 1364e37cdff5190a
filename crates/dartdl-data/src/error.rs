//! Error types for OpenDART data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while talking to OpenDART or reading the local cache.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error, with the request URL (and so the API key) stripped
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// Non-success HTTP status from an endpoint
    #[error("HTTP {status} from {endpoint}")]
    Http {
        /// Endpoint path that was requested
        endpoint: String,
        /// Status code returned by the server
        status: u16,
    },

    /// OpenDART answered with its own error status instead of data
    #[error("OpenDART API error {status}: {message}")]
    Api {
        /// OpenDART status code (e.g. "010" for an unregistered key)
        status: String,
        /// Message returned alongside the status
        message: String,
    },

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Date range the API cannot be queried with
    #[error("Invalid date range: {start} to {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Build an [`DataError::Http`] from a response status.
    pub fn http(endpoint: &str, status: reqwest::StatusCode) -> Self {
        Self::Http {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.without_url())
    }
}

impl From<quick_xml::Error> for DataError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<zip::result::ZipError> for DataError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Parse(format!("corrupt archive: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = DataError::http("/api/list.json", reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "HTTP 502 from /api/list.json");
    }

}
