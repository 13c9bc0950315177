/// Convenience result type used across brandforge.
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ForgeError {
    /// Malformed or missing brief, brand rules, or run options.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A generation backend failed or is misconfigured.
    #[error("generation error: {0}")]
    Generation(String),

    /// Missing or undecodable logo, font, or base image.
    #[error("asset error: {0}")]
    Asset(String),

    /// I/O failure writing an output, sidecar, or report.
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid geometry or value passed to a core operation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ForgeError {
    /// Build a [`ForgeError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`ForgeError::Generation`] value.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Build a [`ForgeError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`ForgeError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build a [`ForgeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
