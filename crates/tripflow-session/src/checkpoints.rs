use crate::store::sanitize_id;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tripflow_core::{ConversationId, TripflowError, TripflowResult};
use tripflow_graph::RunCheckpoint;

/// Durable, keyed storage for at most one [`RunCheckpoint`] per conversation.
///
/// `save` overwrites any prior checkpoint for the same conversation (last
/// write wins — only one suspension can be outstanding), and `clear` is
/// idempotent.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Persists `checkpoint` under its conversation id.
    async fn save(&self, checkpoint: &RunCheckpoint) -> TripflowResult<()>;
    /// Loads the checkpoint for `id`, or `None` when nothing is suspended.
    async fn load(&self, id: &ConversationId) -> TripflowResult<Option<RunCheckpoint>>;
    /// Removes any checkpoint for `id`. Never errors on a missing record.
    async fn clear(&self, id: &ConversationId) -> TripflowResult<()>;
}

/// In-memory checkpoint store.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    inner: RwLock<HashMap<ConversationId, RunCheckpoint>>,
}

impl MemoryCheckpointStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn save(&self, checkpoint: &RunCheckpoint) -> TripflowResult<()> {
        self.inner
            .write()
            .await
            .insert(checkpoint.conversation.clone(), checkpoint.clone());
        Ok(())
    }

    async fn load(&self, id: &ConversationId) -> TripflowResult<Option<RunCheckpoint>> {
        Ok(self.inner.read().await.get(id).cloned())
    }

    async fn clear(&self, id: &ConversationId) -> TripflowResult<()> {
        self.inner.write().await.remove(id);
        Ok(())
    }
}

/// File-based checkpoint store: one JSON file per suspended conversation,
/// so a suspension survives a process restart.
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// Creates the store, creating `dir` if needed.
    pub async fn new(dir: PathBuf) -> TripflowResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &ConversationId) -> PathBuf {
        self.dir.join(format!("{}.checkpoint.json", sanitize_id(id)))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn save(&self, checkpoint: &RunCheckpoint) -> TripflowResult<()> {
        let json = serde_json::to_string_pretty(checkpoint)?;
        tokio::fs::write(self.path_for(&checkpoint.conversation), json).await?;
        Ok(())
    }

    async fn load(&self, id: &ConversationId) -> TripflowResult<Option<RunCheckpoint>> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(path).await?;
        // A checkpoint that exists but cannot be decoded is fatal for this
        // conversation and must never be silently ignored.
        let checkpoint: RunCheckpoint = serde_json::from_str(&data)
            .map_err(|e| TripflowError::MalformedCheckpoint(id.clone(), e.to_string()))?;
        Ok(Some(checkpoint))
    }

    async fn clear(&self, id: &ConversationId) -> TripflowResult<()> {
        let path = self.path_for(id);
        if path.exists() {
            tokio::fs::remove_file(path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tripflow_core::{ConversationState, Message, NodeName, PendingApproval};

    fn checkpoint(id: &str) -> RunCheckpoint {
        let mut state = ConversationState::new();
        state.push(Message::user("Book Hotel X"));
        RunCheckpoint::new(
            id.into(),
            state,
            PendingApproval::new("confirm_booking", NodeName::Booking, "Book Hotel X"),
            1,
        )
    }

    #[tokio::test]
    async fn memory_save_load_clear() {
        let store = MemoryCheckpointStore::new();
        let id = ConversationId::from("c2");

        store.save(&checkpoint("c2")).await.unwrap();
        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded.pending.action, "confirm_booking");

        store.clear(&id).await.unwrap();
        store.clear(&id).await.unwrap(); // idempotent
        assert!(store.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_save_overwrites_last_write_wins() {
        let store = MemoryCheckpointStore::new();
        let first = checkpoint("c2");
        let mut second = checkpoint("c2");
        second.hops = 3;

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();
        assert_eq!(store.load(&"c2".into()).await.unwrap().unwrap().hops, 3);
    }
}
