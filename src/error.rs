//! Error types for asset generation

use thiserror::Error;

/// Result type alias for asset operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause attached to a not-found error raised by a render function
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while resolving, rendering or encoding an asset
#[derive(Error, Debug)]
pub enum Error {
    /// No registered asset matches the requested id, or a render function
    /// decided the requested entity does not exist
    #[error("Asset not found")]
    NotFoundAsset {
        #[source]
        cause: Option<Cause>,
    },

    /// A configured font could not be read
    #[error("Failed to fetch font: {url}")]
    FontLoadError {
        url: String,
        #[source]
        source: Box<Error>,
    },

    /// A remote read returned a non-success status
    #[error("Failed to fetch {url}: HTTP {status}")]
    FetchError { url: String, status: u16 },

    /// A static image reference with an extension we cannot inline
    #[error("Must be a jpg, jpeg or png: {0}")]
    UnsupportedFormatError(String),

    /// Two registered assets derive the same name
    #[error("Duplicate asset name: {0}")]
    DuplicateAsset(String),

    /// Failed to produce vector markup
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to rasterize or encode the vector markup
    #[error("Rasterization failed: {0}")]
    RasterError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Local file access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// A not-found error without a cause
    pub fn not_found() -> Self {
        Error::NotFoundAsset { cause: None }
    }

    /// A not-found error wrapping whatever made the lookup fail
    pub fn not_found_caused_by<E>(cause: E) -> Self
    where
        E: Into<Cause>,
    {
        Error::NotFoundAsset {
            cause: Some(cause.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFoundAsset { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn not_found_message_is_stable() {
        assert_eq!(Error::not_found().to_string(), "Asset not found");
        assert!(Error::not_found().is_not_found());
    }

    #[test]
    fn not_found_keeps_cause() {
        let err = Error::not_found_caused_by("no post with slug 'x'");
        let cause = err.source().expect("cause");
        assert_eq!(cause.to_string(), "no post with slug 'x'");
    }

    #[test]
    fn font_error_names_url() {
        let err = Error::FontLoadError {
            url: "/fonts/Inter.ttf".into(),
            source: Box::new(Error::FetchError { url: "https://x/fonts/Inter.ttf".into(), status: 404 }),
        };
        assert_eq!(err.to_string(), "Failed to fetch font: /fonts/Inter.ttf");
        assert!(!err.is_not_found());
    }
}
