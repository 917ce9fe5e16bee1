use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("bad config file: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Service(#[from] ladder_common::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
