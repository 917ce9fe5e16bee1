//! The service-wide error taxonomy.
//!
//! Every failure a request can surface falls into one of four kinds:
//! an unknown artifact name, a request that does not match an operation's
//! declared schema, a transform the analytics engine rejects, or a
//! persistence-layer failure. The kind crosses the GraphQL boundary as an
//! error extension so clients can branch without parsing messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("artifact not found: {name}")]
    NotFound { name: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("transform failed: {message}")]
    Transform { message: String },

    #[error("store error: {source}")]
    Store {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn store(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store {
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Transform { .. } => ErrorKind::TransformFailure,
            Self::Store { .. } => ErrorKind::StoreFailure,
        }
    }
}

/// Wire-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    TransformFailure,
    StoreFailure,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::TransformFailure => "TRANSFORM_FAILURE",
            Self::StoreFailure => "STORE_FAILURE",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
