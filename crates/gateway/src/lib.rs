//! HTTP gateway for the ladder GraphQL API.
//!
//! Serves GraphiQL on GET `/graphql`, executes queries and mutations on
//! POST `/graphql`, and answers liveness checks on `/healthz`. The schema
//! and resolvers live in `ladder-graphql`; this crate owns configuration,
//! the router, and server startup.

pub mod config;
pub mod error;
pub mod server;

pub use {
    config::ServerConfig,
    error::{Error, Result},
    server::{build_service, router, serve},
};
