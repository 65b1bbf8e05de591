/*!
 * Error types for the srtran application.
 *
 * Providers translate their wire-level failures into `ProviderError`, the
 * translation service only cares about the `ErrorDisposition` of those
 * errors, and the binary wraps everything in `AppError`.
 */

use thiserror::Error;

/// How the batch retry loop must react to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Likely transient, eligible for backoff and another attempt
    Retryable,
    /// Cannot be resolved by waiting, abort the whole translation
    Fatal,
    /// The caller asked us to stop
    Cancelled,
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Provider signalled 429, quota or resource exhaustion
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Account has no credits left
    #[error("Insufficient credits: {0}")]
    InsufficientCredits(String),

    /// Content moderation refused the input
    #[error("Content rejected by moderation: {0}")]
    ContentRejected(String),

    /// The model produced no usable text
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    MalformedResponse(String),

    /// Parsed translation count differs from the batch size
    #[error("expected {expected} translations but got {received}")]
    CountMismatch {
        /// Units in the batch
        expected: usize,
        /// Line groups recovered from the response
        received: usize,
    },

    /// The request was abandoned because of cancellation
    #[error("Request cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Classify this error for the retry loop
    pub fn disposition(&self) -> ErrorDisposition {
        match self {
            Self::Cancelled => ErrorDisposition::Cancelled,
            Self::Configuration(_)
            | Self::AuthenticationError(_)
            | Self::InsufficientCredits(_)
            | Self::ContentRejected(_) => ErrorDisposition::Fatal,
            Self::ApiError { status_code, .. } => {
                if *status_code >= 500 || *status_code == 408 {
                    ErrorDisposition::Retryable
                } else {
                    ErrorDisposition::Fatal
                }
            }
            Self::RequestFailed(_)
            | Self::ConnectionError(_)
            | Self::RateLimited(_)
            | Self::EmptyResponse(_)
            | Self::MalformedResponse(_)
            | Self::CountMismatch { .. } => ErrorDisposition::Retryable,
        }
    }

    /// Shorthand for `disposition() == Retryable`
    pub fn is_retryable(&self) -> bool {
        self.disposition() == ErrorDisposition::Retryable
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        // Request URLs may carry credentials
        let error = error.without_url();
        if error.is_decode() {
            Self::MalformedResponse(error.to_string())
        } else if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_builder() {
            Self::Configuration(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The service could not be built from its configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A batch failed for good; earlier batches are discarded
    #[error("failed to translate batch {start}-{end} after {attempts} attempt(s): {source}")]
    Batch {
        /// First unit position of the batch (inclusive)
        start: usize,
        /// Last unit position of the batch (exclusive)
        end: usize,
        /// Attempts made before giving up
        attempts: u32,
        /// Last error observed
        #[source]
        source: ProviderError,
    },

    /// Translation was cancelled by the caller
    #[error("translation cancelled")]
    Cancelled,
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug, Clone)]
pub enum SubtitleError {
    /// No subtitle block could be recovered from the input
    #[error("no valid subtitles found in {0}")]
    Empty(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error loading or validating configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error, with its context chain
    #[error("{0}")]
    Unknown(String),
}

impl AppError {
    /// Process exit status; an interrupted run exits like SIGINT
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Translation(TranslationError::Cancelled) => 130,
            _ => 1,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        for cause in error.chain() {
            if let Some(TranslationError::Cancelled) = cause.downcast_ref::<TranslationError>() {
                return Self::Translation(TranslationError::Cancelled);
            }
            if let Some(subtitle) = cause.downcast_ref::<SubtitleError>() {
                return Self::Subtitle(subtitle.clone());
            }
        }
        Self::Unknown(format!("{:#}", error))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
