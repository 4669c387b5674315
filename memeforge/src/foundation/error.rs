/// Convenience result type used across memeforge.
pub type MemeResult<T> = Result<T, MemeError>;

/// Top-level error taxonomy used by editor APIs.
///
/// Every variant is recoverable: an editor that returns one of these keeps its prior state.
#[derive(thiserror::Error, Debug)]
pub enum MemeError {
    /// Invalid user input (file type, file size, font size, unknown template).
    #[error("validation error: {0}")]
    Validation(String),

    /// A source image could not be fetched or read.
    #[error("load error: {0}")]
    Load(String),

    /// Payload is not a recognized image format or is too large to rasterize.
    #[error("decode error: {0}")]
    Decode(String),

    /// Export was attempted on a surface that has no background.
    #[error("export error: {0}")]
    Export(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MemeError {
    /// Build a [`MemeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MemeError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`MemeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`MemeError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// True for failures that happened while bringing in a source image.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::Load(_) | Self::Decode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
