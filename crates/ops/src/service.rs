//! The command interpreter: replay operation chains against stored
//! triangles.

use std::sync::Arc;

use tracing::{debug, info};

use {
    ladder_common::{Error, Result},
    ladder_engine::{Engine, Triangle},
    ladder_store::{Artifact, ArtifactStore, NameLocks},
};

use crate::op::{Operation, engine_err};

/// Stateless request-scope façade over the engine and the store.
///
/// Every mutation is a read-modify-write on one artifact name (two when
/// `assign_to` differs). The involved names are locked in sorted order for
/// the whole cycle, so concurrent chains on a name serialize instead of
/// losing writes, and chains on distinct names run side by side.
pub struct TriangleService {
    engine: Arc<dyn Engine>,
    store: Arc<dyn ArtifactStore>,
    locks: NameLocks,
}

impl TriangleService {
    #[must_use]
    pub fn new(engine: Arc<dyn Engine>, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            engine,
            store,
            locks: NameLocks::new(),
        }
    }

    /// Load a bundled dataset and persist it under its own name.
    pub async fn load_dataset(&self, name: &str) -> Result<Artifact> {
        let tri = self.engine.load_dataset(name).map_err(engine_err)?;
        let payload = tri.to_payload().map_err(engine_err)?;
        let lock = self.locks.lock_for(name);
        let _guard = lock.lock().await;
        let artifact = self.store.upsert(name, &payload).await?;
        info!(name, "dataset loaded");
        Ok(artifact)
    }

    pub async fn get(&self, name: &str) -> Result<Artifact> {
        self.store
            .get(name)
            .await?
            .ok_or_else(|| Error::not_found(name))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Artifact>> {
        self.store.list(limit, offset).await
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let lock = self.locks.lock_for(name);
        let _guard = lock.lock().await;
        self.store.delete(name).await?;
        info!(name, "artifact deleted");
        Ok(())
    }

    /// Copy `name`'s payload under `new_name`, leaving `name` untouched.
    /// An existing destination is overwritten.
    pub async fn rename(&self, name: &str, new_name: &str) -> Result<Artifact> {
        let _guards = self.lock_pair(name, new_name).await;
        let artifact = self.store.rename(name, new_name).await?;
        info!(name, new_name, "artifact renamed");
        Ok(artifact)
    }

    /// Revive an artifact's payload into a triangle for projection.
    pub fn revive(&self, artifact: &Artifact) -> Result<Box<dyn Triangle>> {
        self.engine.from_payload(&artifact.payload).map_err(engine_err)
    }

    /// Fold `ops` left-to-right over the artifact named `name` and persist
    /// the result under `assign_to` (or back under `name`).
    ///
    /// Nothing is written until the whole chain has succeeded; a failing
    /// step leaves the store byte-identical to its pre-call state. An
    /// empty chain with no destination returns the artifact as-is without
    /// touching `edited_ms`.
    pub async fn apply_chain(
        &self,
        name: &str,
        ops: &[Operation],
        assign_to: Option<&str>,
    ) -> Result<Artifact> {
        let dest = assign_to.unwrap_or(name);
        let _guards = self.lock_pair(name, dest).await;

        let artifact = self
            .store
            .get(name)
            .await?
            .ok_or_else(|| Error::not_found(name))?;
        if ops.is_empty() && assign_to.is_none() {
            return Ok(artifact);
        }

        let tri = self.engine.from_payload(&artifact.payload).map_err(engine_err)?;
        let ops_owned = ops.to_vec();
        // transform chains are CPU-bound; keep them off the async workers
        let payload = tokio::task::spawn_blocking(move || -> Result<String> {
            let mut tri = tri;
            for op in &ops_owned {
                debug!(op = op.code(), "applying operation");
                tri = op.apply(tri)?;
            }
            tri.to_payload().map_err(engine_err)
        })
        .await
        .map_err(|e| Error::transform(format!("chain execution failed: {e}")))??;

        let artifact = self.store.upsert(dest, &payload).await?;
        info!(name, dest, steps = ops.len(), "chain applied");
        Ok(artifact)
    }

    /// Lock `a` and `b` (deduplicated, in sorted order, so two chains
    /// touching the same pair cannot deadlock).
    async fn lock_pair(&self, a: &str, b: &str) -> Vec<tokio::sync::OwnedMutexGuard<()>> {
        let mut names = vec![a, b];
        names.sort_unstable();
        names.dedup();
        let mut guards = Vec::with_capacity(names.len());
        for name in names {
            guards.push(self.locks.lock_for(name).lock_owned().await);
        }
        guards
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{op::GrainArgs, parse::parse_chain};
    use {ladder_engine::mem::MemEngine, ladder_store::MemoryStore};

    fn service() -> TriangleService {
        TriangleService::new(Arc::new(MemEngine::new()), Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn load_then_get() {
        let svc = service();
        let loaded = svc.load_dataset("raa").await.unwrap();
        let fetched = svc.get("raa").await.unwrap();
        assert_eq!(loaded, fetched);
    }

    #[tokio::test]
    async fn load_unknown_dataset_is_not_found() {
        let svc = service();
        let err = svc.load_dataset("genins").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn empty_chain_is_a_noop() {
        let svc = service();
        let before = svc.load_dataset("raa").await.unwrap();
        let after = svc.apply_chain("raa", &[], None).await.unwrap();
        assert_eq!(after, before);
        assert_eq!(svc.get("raa").await.unwrap().edited_ms, before.edited_ms);
    }

    #[tokio::test]
    async fn conversion_pair_round_trips_the_payload() {
        let svc = service();
        let before = svc.load_dataset("raa").await.unwrap();
        let ops = parse_chain(&[
            ("cumToIncr".to_string(), None),
            ("incrToCum".to_string(), None),
        ])
        .unwrap();
        let after = svc.apply_chain("raa", &ops, None).await.unwrap();
        assert_eq!(after.payload, before.payload);
    }

    #[tokio::test]
    async fn failed_step_leaves_the_store_untouched() {
        let svc = service();
        let before = svc.load_dataset("raa").await.unwrap();
        // first step is valid, second fails in the engine
        let ops = parse_chain(&[
            ("cumToIncr".to_string(), None),
            ("groupBy".to_string(), Some(r#"["state"]"#.to_string())),
        ])
        .unwrap();
        let err = svc.apply_chain("raa", &ops, None).await.unwrap_err();
        assert!(matches!(err, Error::Transform { .. }));
        assert_eq!(svc.get("raa").await.unwrap().payload, before.payload);
        assert_eq!(svc.get("raa").await.unwrap().edited_ms, before.edited_ms);
    }

    #[tokio::test]
    async fn assign_to_writes_the_destination_only() {
        let svc = service();
        let before = svc.load_dataset("quarterly").await.unwrap();
        let ops = vec![Operation::Grain(GrainArgs {
            grain: "OYDY".into(),
            trailing: false,
        })];
        let dest = svc
            .apply_chain("quarterly", &ops, Some("quarterly_y"))
            .await
            .unwrap();
        assert_eq!(dest.name, "quarterly_y");
        assert_ne!(dest.payload, before.payload);
        assert_eq!(svc.get("quarterly").await.unwrap().payload, before.payload);
    }

    #[tokio::test]
    async fn empty_chain_with_assign_to_copies() {
        let svc = service();
        let before = svc.load_dataset("raa").await.unwrap();
        let copy = svc.apply_chain("raa", &[], Some("raa_copy")).await.unwrap();
        assert_eq!(copy.name, "raa_copy");
        assert_eq!(copy.payload, before.payload);
    }

    #[tokio::test]
    async fn chains_are_deterministic() {
        let svc = service();
        svc.load_dataset("raa").await.unwrap();
        let ops = parse_chain(&[
            ("trend".to_string(), Some(r#"{"trend": 0.05}"#.to_string())),
            ("latestDiagonal".to_string(), None),
        ])
        .unwrap();
        let a = svc.apply_chain("raa", &ops, Some("a")).await.unwrap();
        let b = svc.apply_chain("raa", &ops, Some("b")).await.unwrap();
        assert_eq!(a.payload, b.payload);
    }

    #[tokio::test]
    async fn concurrent_chains_on_one_name_both_land() {
        let svc = Arc::new(service());
        svc.load_dataset("raa").await.unwrap();
        let ops = parse_chain(&[("trend".to_string(), Some(r#"{"trend": 0.1}"#.to_string()))])
            .unwrap();

        let (left, right) = tokio::join!(
            svc.apply_chain("raa", &ops, None),
            svc.apply_chain("raa", &ops, None),
        );
        left.unwrap();
        right.unwrap();

        // both chains applied: the result is the sequential composition
        let twice = {
            let fresh = service();
            fresh.load_dataset("raa").await.unwrap();
            fresh.apply_chain("raa", &ops, None).await.unwrap();
            fresh.apply_chain("raa", &ops, None).await.unwrap()
        };
        assert_eq!(svc.get("raa").await.unwrap().payload, twice.payload);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let svc = service();
        let err = svc.delete("nonexistent").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn rename_keeps_the_source() {
        let svc = service();
        let before = svc.load_dataset("raa").await.unwrap();
        let renamed = svc.rename("raa", "raa_snapshot").await.unwrap();
        assert_eq!(renamed.payload, before.payload);
        assert!(svc.get("raa").await.is_ok());
    }
}
