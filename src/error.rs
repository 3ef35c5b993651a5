//! Error types for manifest loading and indexing.
//!
//! Every variant here is recoverable. Loader callers log the error and skip the
//! offending source; nothing in this crate lets one of these cross a request boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading one manifest source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The manifest or dependency file does not exist.
    #[error("manifest not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest text is not a valid Custom Elements Manifest.
    #[error("malformed manifest {origin}: {message}")]
    Parse { origin: String, message: String },

    /// A remote manifest could not be fetched.
    #[error("failed to fetch {url}: {message}")]
    Network { url: String, message: String },
}

impl LoadError {
    pub fn parse(origin: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.to_string(),
        }
    }

    pub fn network(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Missing sources are expected and should not be reported to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::SourceNotFound(_))
    }
}

/// Failures while turning one raw declaration into component metadata.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// The component record is unusable; the rest of its manifest still indexes.
    #[error("malformed component record {name}: {reason}")]
    MalformedComponent { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_is_silent() {
        assert!(LoadError::SourceNotFound(PathBuf::from("custom-elements.json")).is_silent());
        assert!(!LoadError::parse("custom-elements.json", "eof").is_silent());
        assert!(!LoadError::network("https://cdn.example/cem.json", "timeout").is_silent());
    }

    #[test]
    fn test_messages_name_the_source() {
        let err = LoadError::parse("dist/custom-elements.json", "expected value");
        assert_eq!(
            err.to_string(),
            "malformed manifest dist/custom-elements.json: expected value"
        );
    }
}
