use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tripflow_core::{ConversationId, ConversationState, TripflowError, TripflowResult};

/// Durable storage for conversation state, keyed by [`ConversationId`].
///
/// Backing storage is pluggable; the orchestrator only requires that a
/// saved state loads back intact.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads the state for `id`, or `None` for a new conversation.
    async fn load(&self, id: &ConversationId) -> TripflowResult<Option<ConversationState>>;
    /// Saves the state for `id`, replacing any prior snapshot.
    async fn save(&self, id: &ConversationId, state: &ConversationState) -> TripflowResult<()>;
}

/// In-memory conversation store. Good for tests and single-process demos.
#[derive(Default)]
pub struct MemoryConversationStore {
    inner: RwLock<HashMap<ConversationId, ConversationState>>,
}

impl MemoryConversationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn load(&self, id: &ConversationId) -> TripflowResult<Option<ConversationState>> {
        Ok(self.inner.read().await.get(id).cloned())
    }

    async fn save(&self, id: &ConversationId, state: &ConversationState) -> TripflowResult<()> {
        self.inner.write().await.insert(id.clone(), state.clone());
        Ok(())
    }
}

/// File-based conversation store: one JSON file per conversation.
pub struct FileConversationStore {
    dir: PathBuf,
}

impl FileConversationStore {
    /// Creates the store, creating `dir` if needed.
    pub async fn new(dir: PathBuf) -> TripflowResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &ConversationId) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_id(id)))
    }
}

/// Maps a caller-supplied conversation id onto a safe file name.
pub(crate) fn sanitize_id(id: &ConversationId) -> String {
    id.as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[async_trait]
impl ConversationStore for FileConversationStore {
    async fn load(&self, id: &ConversationId) -> TripflowResult<Option<ConversationState>> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(path).await?;
        let state: ConversationState = serde_json::from_str(&data).map_err(|e| {
            TripflowError::Store(format!("failed to parse conversation '{id}': {e}"))
        })?;
        Ok(Some(state))
    }

    async fn save(&self, id: &ConversationId, state: &ConversationState) -> TripflowResult<()> {
        let json = serde_json::to_string_pretty(state)?;
        tokio::fs::write(self.path_for(id), json).await?;
        Ok(())
    }
}
