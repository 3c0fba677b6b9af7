use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use eyre::Result;
use geomark_core::models::{DocumentPatch, UserDocument};
use tokio::sync::broadcast;

use crate::store::{DocumentStore, UPDATE_CHANNEL_CAPACITY};

/// In-memory store with the same merge and subscription semantics as
/// [`crate::PgStore`]. Used by tests and single-process runs.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, UserDocument>>,
    channels: Mutex<HashMap<String, broadcast::Sender<UserDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
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
impl DocumentStore for MemoryStore {
    async fn read(&self, user_id: &str) -> Result<Option<UserDocument>> {
        let documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        Ok(documents.get(user_id).cloned())
    }

    async fn write(&self, user_id: &str, patch: DocumentPatch) -> Result<()> {
        let merged = {
            let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
            let document = documents.entry(user_id.to_string()).or_default();
            document.apply(patch);
            document.clone()
        };

        let _ = self.sender(user_id).send(merged);
        Ok(())
    }

    fn subscribe(&self, user_id: &str) -> broadcast::Receiver<UserDocument> {
        self.sender(user_id).subscribe()
    }
}
