//! GraphQL API for ladder.
//!
//! Defines the typed schema over the triangle service: queries projecting
//! stored artifacts, one mutation per registered operation, and the raw
//! `applyChain` mutation for client-assembled chains. The gateway crate
//! owns HTTP transport and wires the schema into its router; this crate
//! only defines the schema, types, and resolvers.

pub mod error;
pub mod mutations;
pub mod queries;
pub mod schema;
pub mod types;

pub use schema::{LadderSchema, build_schema};
