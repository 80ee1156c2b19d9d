use std::path::PathBuf;

use thiserror::Error;

/// Error types that can occur when invoking a model.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Could not reach the provider (DNS, connect, timeout)
    #[error("Connection error: {0}")]
    Connection(String),
    /// Provider rejected the call because of rate limits
    #[error("Rate limited: {0}")]
    RateLimited(String),
    /// Provider is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    Http(String),
    /// Authentication and authorization errors
    #[error("Auth error: {0}")]
    Auth(String),
    /// Invalid request parameters or format
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Errors returned by the LLM provider
    #[error("Provider error: {0}")]
    Provider(String),
    /// API response parsing or format error
    #[error("Response format error: {message}. Raw response: {raw_response}")]
    ResponseFormat {
        message: String,
        raw_response: String,
    },
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    Json(String),
    /// Retry attempts exceeded
    #[error("Retry attempts exceeded after {attempts} tries: {last_error}")]
    RetryExceeded { attempts: usize, last_error: String },
}

impl InvokeError {
    /// Whether the failure is worth retrying (connectivity, rate limit, unavailable).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            InvokeError::Connection(_)
                | InvokeError::RateLimited(_)
                | InvokeError::ServiceUnavailable(_)
        )
    }
}

/// Converts reqwest HTTP errors into InvokeErrors
impl From<reqwest::Error> for InvokeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            InvokeError::Connection(err.to_string())
        } else {
            InvokeError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for InvokeError {
    fn from(err: serde_json::Error) -> Self {
        InvokeError::Json(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

/// Errors raised while loading questions, writing batches or reading results.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The question file does not exist; aborts a run before any request
    #[error("Input file not found at {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("{} is missing required column '{column}'", file.display())]
    MissingColumn { file: PathBuf, column: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("No CSV files found in {}", .0.display())]
    NoResults(PathBuf),
}

impl From<toml::de::Error> for BenchError {
    fn from(err: toml::de::Error) -> Self {
        BenchError::Config(err.to_string())
    }
}
