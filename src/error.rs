//! Error types for the image MCP server.
//!
//! A single `thiserror` hierarchy covers every failure class in the
//! request pipeline:
//!
//! - `ConfigError`: missing or invalid configuration
//! - `Error::Validation`: input validation failures (per-field)
//! - `Error::ReferenceImage`: a reference image could not be loaded
//! - `Error::Api`: OpenAI API errors (includes endpoint and status)
//! - `Error::MissingImageData`: API response without an image payload
//! - `Error::Io`: file system operations
//!
//! Only `Error::Validation` is escalated to a protocol-level
//! invalid-params error by the server; everything else becomes a tool
//! execution error so the calling agent receives actionable text.

use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Unified error type for the image server.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (missing env vars, invalid values)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input validation failures, one entry per violated field
    #[error("Invalid input arguments: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    /// A reference image path could not be read
    #[error("Failed to load reference image {path}: {message}")]
    ReferenceImage {
        /// The caller-supplied path (relative to the public directory)
        path: String,
        /// Error message describing the failure
        message: String,
    },

    /// API errors with endpoint and HTTP status context
    #[error("API error for {endpoint} (HTTP {status_code}): {message}")]
    Api {
        /// The API endpoint that was called
        endpoint: String,
        /// HTTP status code returned by the API
        status_code: u16,
        /// Error message from the API or describing the failure
        message: String,
    },

    /// The API returned a response without base64 image data
    #[error("Invalid or missing image data in OpenAI API response")]
    MissingImageData,

    /// File system I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Create a new API error with endpoint, status code, and message.
    pub fn api(endpoint: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            endpoint: endpoint.into(),
            status_code,
            message: message.into(),
        }
    }

    /// Create a new reference-image load error naming the offending path.
    pub fn reference_image(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ReferenceImage {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Required environment variable {0} is not set")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;
