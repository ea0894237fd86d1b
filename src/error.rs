use std::fmt;
use thiserror::Error;

/// Boxed cause carried by transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Platform client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: ErrorBody },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for platform client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Payload of a non-2xx response
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// Parsed error envelope, when the service answered with JSON
    Json(serde_json::Value),
    /// Raw response text otherwise
    Text(String),
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorBody::Json(value) => write!(f, "{}", value),
            ErrorBody::Text(text) if text.is_empty() => f.write_str("<empty body>"),
            ErrorBody::Text(text) => f.write_str(text),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else {
            err.to_string()
        };
        Self::Transport {
            message,
            source: Box::new(err),
        }
    }
}

impl ClientError {
    /// Create an API error from a status code and response payload
    pub fn api_error(status: u16, body: ErrorBody) -> Self {
        Self::Api { status, body }
    }

    /// Create an authentication error
    pub fn auth_error(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Wrap an arbitrary I/O-level failure as a transport error
    pub fn transport(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            message: message.into(),
            source: source.into(),
        }
    }

    /// HTTP status of an `Api` error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
