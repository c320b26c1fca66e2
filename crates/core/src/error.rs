//! Error types shared across the lumen crates.

use thiserror::Error;

/// Main error type for the renderer.
///
/// Only failures that cannot degrade end up here. Shader compile errors,
/// missing uniforms and incomplete framebuffers are reported through
/// [`crate::Diagnostics`] instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Graphics backend errors
    #[error("Graphics error: {0}")]
    Graphics(String),

    /// Shader source could not be loaded
    #[error("Shader error: {0}")]
    Shader(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using the renderer's Error type.
pub type Result<T> = std::result::Result<T, Error>;
