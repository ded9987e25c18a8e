//! Error types shared by the scraping, rendering and filtering stages.

use thiserror::Error;

/// Error type for archive pipeline operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// HTTP client error (connect, timeout, non-success status)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing or joining error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing an audit CSV failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Building, saving or loading a PDF failed
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// A CSS selector in a site profile did not parse
    #[error("Invalid selector `{0}`")]
    Selector(String),

    /// An archive date could not be parsed
    #[error("Invalid archive date `{0}` (expected YYYY-MM-DD or DD.MM.YYYY)")]
    Date(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// A keyword could not be compiled into a pattern
    #[error("Keyword pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Text could not be represented in the requested character set
    #[error("Encoding error: {0}")]
    Encode(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ArchiveError>;

impl From<serde_yaml::Error> for ArchiveError {
    fn from(err: serde_yaml::Error) -> Self {
        ArchiveError::Config(err.to_string())
    }
}
