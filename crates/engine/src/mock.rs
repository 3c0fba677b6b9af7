//! Test doubles for the engine's collaborator traits.

use std::sync::Mutex;

use async_trait::async_trait;
use geomark_core::errors::LocationError;
use mockall::mock;

use crate::providers::{GeoPoint, LocationProvider, Notification, NotificationSink};

mock! {
    pub Locator {}

    #[async_trait]
    impl LocationProvider for Locator {
        async fn current_location(&self) -> Result<GeoPoint, LocationError>;
    }
}

mock! {
    pub Sink {}

    #[async_trait]
    impl NotificationSink for Sink {
        async fn notify(&self, notification: Notification);
    }
}

/// Collects every notification for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}
