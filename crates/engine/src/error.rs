use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown dataset: {name}")]
    DatasetNotFound { name: String },

    #[error("bad payload: {message}")]
    Payload { message: String },

    #[error("{message}")]
    Unsupported { message: String },
}

impl EngineError {
    #[must_use]
    pub fn dataset_not_found(name: impl Into<String>) -> Self {
        Self::DatasetNotFound { name: name.into() }
    }

    #[must_use]
    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
