/// Convenience result type used across Roundel.
pub type RoundelResult<T> = Result<T, RoundelError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Nothing in this taxonomy is fatal to the editor: batch ingestion skips
/// the offending file, persistence failures leave the session unsaved, and
/// render-time resolution failures degrade to a background-only frame.
#[derive(thiserror::Error, Debug)]
pub enum RoundelError {
    /// Declared media type is not an image type; the file is skipped.
    #[error("unsupported media type: {0}")]
    UnsupportedType(String),

    /// Image bytes could not be decoded (corrupt file or unknown codec).
    #[error("decode error: {0}")]
    Decode(String),

    /// Save or export was invoked with nothing selected.
    #[error("no avatar selected")]
    NoSelection,

    /// Durable key-value storage could not be read or written.
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// Invalid user-provided or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RoundelError {
    /// Build a [`RoundelError::UnsupportedType`] value.
    pub fn unsupported_type(media_type: impl Into<String>) -> Self {
        Self::UnsupportedType(media_type.into())
    }

    /// Build a [`RoundelError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`RoundelError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build a [`RoundelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
