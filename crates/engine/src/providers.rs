//! The external collaborators the engine depends on, behind narrow traits:
//! a geolocation provider, a notification sink, and an identity provider.

use std::time::Duration;

use async_trait::async_trait;
use geomark_core::errors::LocationError;
use serde::Deserialize;
use tokio::sync::watch;

/// A device position fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: f64,
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<GeoPoint, LocationError>;
}

/// Acquires a location under a time budget; elapse becomes
/// [`LocationError::Timeout`].
pub async fn locate(
    provider: &dyn LocationProvider,
    budget: Duration,
) -> Result<GeoPoint, LocationError> {
    match tokio::time::timeout(budget, provider.current_location()).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout),
    }
}

/// Always reports the same position. Useful for stationary deployments and
/// tests.
pub struct FixedLocationProvider {
    point: GeoPoint,
}

impl FixedLocationProvider {
    pub fn new(point: GeoPoint) -> Self {
        Self { point }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_location(&self) -> Result<GeoPoint, LocationError> {
        Ok(self.point)
    }
}

#[derive(Debug, Deserialize)]
struct GeolocatePoint {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GeolocateResponse {
    location: GeolocatePoint,
    accuracy: f64,
}

/// Queries a network geolocation API (Google-geolocate wire format: POST,
/// key as a query parameter, `{location: {lat, lng}, accuracy}` response).
pub struct HttpLocationProvider {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpLocationProvider {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{}?key={}", self.url, key),
            None => self.url.clone(),
        }
    }
}

#[async_trait]
impl LocationProvider for HttpLocationProvider {
    async fn current_location(&self) -> Result<GeoPoint, LocationError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&serde_json::json!({ "considerIp": "true" }))
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if !response.status().is_success() {
            return Err(LocationError::Unavailable(format!(
                "geolocation API returned {}",
                response.status()
            )));
        }

        let payload: GeolocateResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        Ok(GeoPoint {
            lat: payload.location.lat,
            lng: payload.location.lng,
            accuracy: payload.accuracy,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// Fire-and-forget notification delivery.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Emits notifications through `tracing` at a level matching the severity.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info | Severity::Success => tracing::info!("{}", notification.message),
            Severity::Warning => tracing::warn!("{}", notification.message),
            Severity::Error => tracing::error!("{}", notification.message),
        }
    }
}

/// Yields the authenticated user, if any, and a feed of identity changes.
pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;

    fn subscribe(&self) -> watch::Receiver<Option<String>>;
}

/// A fixed identity taken from configuration; it never changes.
pub struct EnvIdentity {
    tx: watch::Sender<Option<String>>,
}

impl EnvIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(Some(user_id.into()));
        Self { tx }
    }
}

impl IdentityProvider for EnvIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}
