//! Error types for the shaderkit facade.

use shaderkit_core::ShaderKitError;
use thiserror::Error;

/// Errors raised while composing, linking or drawing a program.
#[derive(Error, Debug)]
pub enum Error {
    /// An error from composing code or applying uniforms.
    #[error(transparent)]
    Core(#[from] ShaderKitError),

    /// The backend could not link the composed stages.
    #[error("program link failed: {0}")]
    LinkFailed(String),
}

/// A specialized Result type for the shaderkit facade.
pub type Result<T> = std::result::Result<T, Error>;
