//! Error types and error handling

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the engine
pub type Result<T, E = StorefrontError> = std::result::Result<T, E>;

/// Engine error type
///
/// Parse failures of individual HTML files are not represented here: the
/// validator records them as findings and keeps going.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// No template directory matches the requested id
    #[error("template '{id}' not found (available: {})", available_list(.available))]
    NotFound {
        /// Requested template id
        id: String,
        /// Ids the registry does know about
        available: Vec<String>,
    },

    /// Destination cannot be written without clobbering something
    #[error("destination {}: {reason}", .path.display())]
    DestinationConflict {
        /// Offending destination path
        path: PathBuf,
        /// Why the destination was refused
        reason: String,
    },

    /// I/O failure while reading or writing a template tree
    #[error("{action} {}: {source}", .path.display())]
    Filesystem {
        /// What the engine was doing
        action: &'static str,
        /// Path involved in the failing operation
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded or extracted
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Generation manifest failed to render
    #[error("failed to render {name}: {source}")]
    Render {
        /// Template name being rendered
        name: &'static str,
        /// Underlying handlebars error
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// Structured output could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorefrontError {
    /// Error kind name as shown to CLI users
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFoundError",
            Self::DestinationConflict { .. } => "DestinationConflictError",
            Self::Filesystem { .. } => "FilesystemError",
            Self::Config(_) => "ConfigError",
            Self::Render { .. } => "RenderError",
            Self::Serialization(_) => "SerializationError",
        }
    }

    /// Build a [`StorefrontError::Filesystem`] from an I/O error
    pub fn filesystem(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Build a [`StorefrontError::DestinationConflict`]
    pub fn conflict(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DestinationConflict {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for StorefrontError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<walkdir::Error> for StorefrontError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        Self::filesystem("failed to walk", path, source)
    }
}

fn available_list(ids: &[String]) -> String {
    if ids.is_empty() {
        "none".to_string()
    } else {
        ids.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let err = StorefrontError::NotFound {
            id: "nope".to_string(),
            available: vec![],
        };
        assert_eq!(err.kind(), "NotFoundError");

        let err = StorefrontError::conflict("/tmp/out", "directory is not empty");
        assert_eq!(err.kind(), "DestinationConflictError");
    }

    #[test]
    fn test_not_found_lists_available() {
        let err = StorefrontError::NotFound {
            id: "nope".to_string(),
            available: vec!["landing-product".to_string(), "minimal-store".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'nope'"));
        assert!(msg.contains("landing-product, minimal-store"));
    }

    #[test]
    fn test_not_found_without_templates() {
        let err = StorefrontError::NotFound {
            id: "x".to_string(),
            available: vec![],
        };
        assert!(err.to_string().contains("available: none"));
    }

    #[test]
    fn test_filesystem_message() {
        let err = StorefrontError::filesystem(
            "failed to read",
            "/tmp/a.html",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), "FilesystemError");
        assert!(err.to_string().starts_with("failed to read /tmp/a.html"));
    }
}
