pub type VecfieldResult<T> = Result<T, VecfieldError>;

/// Error taxonomy of the rendering pipeline.
///
/// Only [`VecfieldError::Backend`] is allowed to escape a frame; every other class is recovered
/// at the executor or orchestrator boundary.
#[derive(thiserror::Error, Debug)]
pub enum VecfieldError {
    #[error("registry miss: no animation module registered as \"{0}\"")]
    RegistryMiss(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("execution fault in \"{id}\": {message}")]
    Execution { id: String, message: String },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VecfieldError {
    pub fn registry_miss(id: impl Into<String>) -> Self {
        Self::RegistryMiss(id.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn execution(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Return `true` for the error classes the pipeline recovers from on its own.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Backend(_) | Self::Other(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
