use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use eyre::Result;
use geomark_core::models::{DocumentPatch, UserDocument};
use tokio::sync::broadcast;

use crate::{documents, DbPool};

/// Buffered document updates per subscriber before older ones are dropped.
pub const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// The per-user document store contract.
///
/// `write` has partial-merge semantics: only the top-level fields named by
/// the patch are replaced. `subscribe` yields the merged document after each
/// local write; replication between processes is the backing store's own
/// concern and is last-write-wins on full-document replace.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read(&self, user_id: &str) -> Result<Option<UserDocument>>;

    async fn write(&self, user_id: &str, patch: DocumentPatch) -> Result<()>;

    fn subscribe(&self, user_id: &str) -> broadcast::Receiver<UserDocument>;
}

/// Postgres-backed store: one JSONB row per user.
pub struct PgStore {
    pool: DbPool,
    channels: Mutex<HashMap<String, broadcast::Sender<UserDocument>>>,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn sender(&self, user_id: &str) -> broadcast::Sender<UserDocument> {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(UPDATE_CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn read(&self, user_id: &str) -> Result<Option<UserDocument>> {
        documents::read_document(&self.pool, user_id).await
    }

    async fn write(&self, user_id: &str, patch: DocumentPatch) -> Result<()> {
        documents::merge_document(&self.pool, user_id, &patch).await?;

        // Echo the merged document to this process's subscribers.
        if let Some(document) = documents::read_document(&self.pool, user_id).await? {
            let _ = self.sender(user_id).send(document);
        }

        Ok(())
    }

    fn subscribe(&self, user_id: &str) -> broadcast::Receiver<UserDocument> {
        self.sender(user_id).subscribe()
    }
}
