//! The operation registry and command interpreter.
//!
//! Clients name transforms over the wire; this crate turns those names and
//! their raw arguments into values of a closed [`Operation`] enum, then
//! replays them against a stored triangle. Nothing a client sends is ever
//! dispatched by name onto the engine: an unknown operation or an argument
//! that misses its declared schema dies here with `InvalidArgument`, before
//! any engine or store call.

pub mod op;
pub mod parse;
pub mod service;

pub use {
    op::{AxisFilter, GrainArgs, GroupByArgs, IndexFilter, LocArgs, Operation, TrendArgs},
    parse::{parse_chain, parse_step},
    service::TriangleService,
};
