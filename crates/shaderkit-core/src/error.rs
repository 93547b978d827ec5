//! Error types for shaderkit.

use thiserror::Error;

/// The main error type for shaderkit operations.
#[derive(Error, Debug)]
pub enum ShaderKitError {
    /// A part with the given name is already present in the composer.
    #[error("part '{0}' already exists")]
    PartExists(String),

    /// A part with the given name (or identity) is not present in the composer.
    #[error("part '{0}' not found")]
    PartNotFound(String),

    /// Both `before` and `after` were given when adding a part.
    #[error("can only place a part before or after another part, not both")]
    ConflictingPlacement,

    /// A uniform name was empty.
    #[error("uniform name must be at least one character")]
    InvalidUniformName,

    /// A uniform value has an unsupported shape.
    #[error("invalid uniform value: {0}")]
    InvalidUniformValue(String),

    /// A uniform producer kept yielding producers.
    #[error("uniform '{name}' did not resolve to a value within {depth} producer calls")]
    ProducerDepthExceeded { name: String, depth: usize },

    /// A shader source was not found in the library.
    #[error("shader source '{0}' not found")]
    SourceNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for shaderkit operations.
pub type Result<T> = std::result::Result<T, ShaderKitError>;
