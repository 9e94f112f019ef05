/// Convenience result type used across pinmark.
pub type PinmarkResult<T> = Result<T, PinmarkError>;

/// Top-level error taxonomy used by the public APIs.
///
/// Malformed annotation inputs (point JSON, overlay data URIs, individual markers) are recovered
/// from inside the pipeline and never surface here. What does surface is caller misuse and
/// unreadable base images.
#[derive(thiserror::Error, Debug)]
pub enum PinmarkError {
    /// Invalid options or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image bytes that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Failures while rasterizing markers or encoding outputs.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PinmarkError {
    /// Build a [`PinmarkError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PinmarkError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PinmarkError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PinmarkError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
