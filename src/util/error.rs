//! Error types for the dispersion scene.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scene and asset operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// glTF/GLB import failed
    #[error("glTF import failed: {0}")]
    Gltf(#[from] gltf::Error),

    /// No node or mesh with the requested name
    #[error("Mesh not found: {0}")]
    MeshNotFound(String),

    /// Mesh primitive carries no POSITION attribute
    #[error("Mesh '{0}' has no vertex positions")]
    MissingPositions(String),

    /// Index buffer references a vertex that does not exist
    #[error("Index {index} out of bounds (vertex count: {count})")]
    IndexOutOfBounds { index: u32, count: usize },

    /// Parameter name not present in the control table
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Settings file could not be parsed or serialized
    #[error("Invalid settings: {0}")]
    Settings(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Result type alias for scene operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::MeshNotFound("Suzanne".into());
        assert!(e.to_string().contains("Suzanne"));

        let e = Error::IndexOutOfBounds { index: 9, count: 3 };
        assert!(e.to_string().contains("9"));
        assert!(e.to_string().contains("3"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
