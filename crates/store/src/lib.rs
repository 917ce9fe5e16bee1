//! Artifact persistence: one row per triangle name.
//!
//! The store treats payloads as opaque text; only the engine crate knows
//! the format. `created_ms` is set once, `edited_ms` moves on every
//! successful write. Upserts are single statements so concurrent writers
//! on the same name can only interleave whole writes, never halves; the
//! read-modify-write cycle above the store is serialized per name with
//! [`NameLocks`].

pub mod locks;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use {
    locks::NameLocks,
    memory::MemoryStore,
    sqlite::SqliteStore,
    store::{Artifact, ArtifactStore},
};
