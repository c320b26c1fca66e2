//! RHI-specific error types.

use thiserror::Error;

use crate::shader::ShaderStage;

/// RHI-specific error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RhiError {
    /// Shader stage failed to compile
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompilation { stage: ShaderStage, log: String },

    /// Program failed to link
    #[error("Program failed to link: {log}")]
    ProgramLink { log: String },

    /// A handle that is null or already deleted was passed in
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Backend could not allocate a resource
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// Pixel layout not representable as a texture format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for RHI operations.
pub type RhiResult<T> = std::result::Result<T, RhiError>;

impl From<RhiError> for lumen_core::Error {
    fn from(err: RhiError) -> Self {
        match err {
            RhiError::ShaderCompilation { .. } | RhiError::ProgramLink { .. } => {
                lumen_core::Error::Shader(err.to_string())
            }
            _ => lumen_core::Error::Graphics(err.to_string()),
        }
    }
}
