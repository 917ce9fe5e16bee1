//! Shared types, error definitions, and utilities used across all ladder crates.

pub mod error;
pub mod time;

pub use {
    error::{Error, ErrorKind, Result},
    time::now_ms,
};
