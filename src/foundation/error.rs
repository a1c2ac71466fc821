/// Convenience result type used across Vignette.
pub type VignetteResult<T> = Result<T, VignetteError>;

/// Top-level error taxonomy used by scene and animation APIs.
///
/// Only conditions that cannot be recovered from are surfaced as errors. Missing optional
/// inputs (an image without `src`, a line without points) are logged through `tracing` and the
/// affected node falls back to an empty default.
#[derive(thiserror::Error, Debug)]
pub enum VignetteError {
    /// Invalid user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A host resource (offscreen layer, drawing context) could not be obtained.
    #[error("resource error: {0}")]
    Resource(String),

    /// An internal invariant would otherwise be violated silently.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Malformed markup, path data or color strings.
    #[error("parse error: {0}")]
    Parse(String),

    /// Errors while building or driving animation tasks.
    #[error("animation error: {0}")]
    Animation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VignetteError {
    /// Build a [`VignetteError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VignetteError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`VignetteError::Invariant`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Build a [`VignetteError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`VignetteError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
