//! Kernel error types.

use thiserror::Error;

/// Kernel errors.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid config file {path}: {message}")]
    InvalidConfigFile { path: String, message: String },

    #[error("template not found for theme key '{0}'")]
    MissingTemplate(String),

    #[error(transparent)]
    Settings(#[from] responsive_image::SettingsError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Result type alias using KernelError.
pub type KernelResult<T> = Result<T, KernelError>;
