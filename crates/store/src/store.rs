//! Persistence trait and the stored record type.

use async_trait::async_trait;

use ladder_common::Result;

/// A named, persisted, serialized triangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    /// Opaque serialized triangle, owned by the engine.
    pub payload: String,
    pub created_ms: i64,
    pub edited_ms: i64,
}

/// Persistence backend for triangle artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<Artifact>>;

    /// Page through artifacts ordered by name.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Artifact>>;

    /// Create or overwrite the record for `name`. Creation stamps
    /// `created_ms`; overwriting preserves it and moves `edited_ms`.
    async fn upsert(&self, name: &str, payload: &str) -> Result<Artifact>;

    /// Remove the record for `name`; `NotFound` when absent.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Write `old`'s payload under `new`, leaving `old` untouched. An
    /// existing record under `new` is overwritten.
    async fn rename(&self, old: &str, new: &str) -> Result<Artifact>;
}
