//! Error handling for domain checking operations.
//!
//! Probe-level network trouble never shows up here: probes report it as a
//! [`ProbeOutcome`](crate::ProbeOutcome) and it is folded into the vote. This
//! type covers the failures that are real errors for a caller: broken
//! configuration, unreadable input files, and clients that cannot be built.

use std::fmt;

/// Main error type for domain checking operations.
#[derive(Debug, Clone)]
pub enum DomainCheckError {
    /// Network-related errors (client construction, resolver setup, etc.)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// Configuration errors (invalid settings, unparsable TOML, etc.)
    ConfigError {
        message: String,
    },

    /// File I/O errors when reading domain lists or config files
    FileError {
        path: String,
        message: String,
    },

    /// JSON serialization / parsing errors
    ParseError {
        message: String,
    },

    /// Generic internal errors that don't fit other categories
    Internal {
        message: String,
    },
}

impl DomainCheckError {
    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DomainCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::ParseError { message } => {
                write!(f, "Parse error: {}", message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for DomainCheckError {}

// Implement From conversions for common error types
impl From<reqwest::Error> for DomainCheckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::network_with_source("Failed to build HTTP client", err.to_string())
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for DomainCheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON parsing failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for DomainCheckError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("Failed to parse TOML configuration: {}", err))
    }
}

impl From<std::io::Error> for DomainCheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DomainCheckError::network_with_source("resolver setup failed", "no nameservers");
        assert_eq!(
            err.to_string(),
            "Network error: resolver setup failed (source: no nameservers)"
        );

        let err = DomainCheckError::network("no route");
        assert_eq!(err.to_string(), "Network error: no route");

        let err = DomainCheckError::file_error("domains.txt", "not found");
        assert_eq!(err.to_string(), "File error at 'domains.txt': not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DomainCheckError = io.into();
        assert!(matches!(err, DomainCheckError::Internal { .. }));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Table>("probes = [").unwrap_err();
        let err: DomainCheckError = toml_err.into();
        assert!(matches!(err, DomainCheckError::ConfigError { .. }));
    }
}
