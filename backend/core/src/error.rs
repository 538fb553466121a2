use thiserror::Error;

/// Top-level error type for the Afyabot runtime.
#[derive(Debug, Error)]
pub enum AfyaError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("dispatch failed: {0}")]
    DispatchFailed(String),
}
