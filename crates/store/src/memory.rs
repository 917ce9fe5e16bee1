//! In-memory store for tests.

use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;

use ladder_common::{Error, Result, now_ms};

use crate::store::{Artifact, ArtifactStore};

/// In-memory store backed by `BTreeMap`. No persistence; tests only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<String, Artifact>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<Artifact>> {
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        Ok(rows.get(name).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Artifact>> {
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        Ok(rows
            .values()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn upsert(&self, name: &str, payload: &str) -> Result<Artifact> {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let now = now_ms();
        let artifact = match rows.get(name) {
            Some(existing) => Artifact {
                payload: payload.to_string(),
                edited_ms: now,
                ..existing.clone()
            },
            None => Artifact {
                name: name.to_string(),
                payload: payload.to_string(),
                created_ms: now,
                edited_ms: now,
            },
        };
        rows.insert(name.to_string(), artifact.clone());
        Ok(artifact)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        if rows.remove(name).is_none() {
            return Err(Error::not_found(name));
        }
        Ok(())
    }

    async fn rename(&self, old: &str, new: &str) -> Result<Artifact> {
        let payload = {
            let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
            rows.get(old)
                .map(|a| a.payload.clone())
                .ok_or_else(|| Error::not_found(old))?
        };
        self.upsert(new, &payload).await
    }
}
