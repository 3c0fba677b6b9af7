use async_trait::async_trait;
use geomark_core::models::{DocumentPatch, UserDocument};
use mockall::mock;
use tokio::sync::broadcast;

use crate::store::DocumentStore;

// Mock store for testing
mock! {
    pub Store {}

    #[async_trait]
    impl DocumentStore for Store {
        async fn read(&self, user_id: &str) -> eyre::Result<Option<UserDocument>>;

        async fn write(&self, user_id: &str, patch: DocumentPatch) -> eyre::Result<()>;

        fn subscribe(&self, user_id: &str) -> broadcast::Receiver<UserDocument>;
    }
}
