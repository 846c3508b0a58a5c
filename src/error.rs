use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The request never completed (connect failure, timeout, reset).
    Network,
    /// The backend answered with a non-2xx status.
    Http { status: u16 },
    /// The body could not be decoded into the expected shape.
    Parse,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => f.write_str("network error"),
            Self::Http { status } => write!(f, "http {}", status),
            Self::Parse => f.write_str("parse error"),
        }
    }
}

/// Failure of a single catalog request. Every kind is retryable by issuing
/// the same request again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Network,
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Http { status },
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Parse,
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        true
    }

    /// Short text for the dismissible inline notice.
    pub fn notice(&self) -> String {
        match self.kind {
            FetchErrorKind::Network => "Couldn't reach the store. Check your connection and retry.".to_string(),
            FetchErrorKind::Http { status } => format!("The store returned an error ({}). Please retry.", status),
            FetchErrorKind::Parse => "The store sent an unexpected response. Please retry.".to_string(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::http(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            Self::parse(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid api base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid timeout {0:?}: expected milliseconds")]
    InvalidTimeout(String),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}
