use thiserror::Error;

/// Why no single token could be taken from a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// No channel carried a token, including every malformed header shape
    #[error("Unauthorized")]
    Unauthorized,

    /// More than one channel carried a token
    #[error("More than one method used for authentication")]
    BadRequest,
}

/// Status classification the HTTP layer maps to 401 or 400
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    Unauthorized,
    BadRequest,
}

impl ErrorStatus {
    pub fn as_u16(&self) -> u16 {
        match self {
            ErrorStatus::Unauthorized => 401,
            ErrorStatus::BadRequest => 400,
        }
    }
}

impl ExtractionError {
    pub fn status(&self) -> ErrorStatus {
        match self {
            ExtractionError::Unauthorized => ErrorStatus::Unauthorized,
            ExtractionError::BadRequest => ErrorStatus::BadRequest,
        }
    }

    /// Short machine-oriented reason
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractionError::Unauthorized => "no access token supplied",
            ExtractionError::BadRequest => "more than one method used for authentication",
        }
    }

    /// RFC 6750 §3.1 error code for the `WWW-Authenticate` challenge
    ///
    /// A request without any credential gets a bare challenge.
    pub fn oauth_error_code(&self) -> Option<&'static str> {
        match self {
            ExtractionError::Unauthorized => None,
            ExtractionError::BadRequest => Some("invalid_request"),
        }
    }
}

/// Unified error type for the HTTP server and binary
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("Invalid HTTP response: {0}")]
    Response(#[from] http::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed request body: {0}")]
    Body(String),

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;
