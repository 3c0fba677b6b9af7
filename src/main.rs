use std::sync::Arc;

use color_eyre::eyre::{eyre, Result};
use dotenv::dotenv;
use geomark_engine::config::EngineConfig;
use geomark_engine::providers::{
    EnvIdentity, FixedLocationProvider, GeoPoint, HttpLocationProvider, IdentityProvider,
    LocationProvider, LogSink,
};
use geomark_engine::{Evaluator, Session};
use geomark_store::{create_pool, schema::initialize_database, DocumentStore, PgStore};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = EngineConfig::from_env()?;

    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create database connection pool and schema
    let pool = create_pool(&config.database_url).await?;
    initialize_database(&pool).await?;

    let store: Arc<dyn DocumentStore> = Arc::new(PgStore::new(pool));

    // Resolve the identity this daemon evaluates attendance for
    let identity = EnvIdentity::new(config.user_id.clone());
    let user_id = identity
        .current_user_id()
        .ok_or_else(|| eyre!("No authenticated user"))?;

    let mut session = Session::load(&user_id, store).await?;

    // Pick the location source: network geolocation when an endpoint is
    // configured, otherwise a fixed position
    let location: Arc<dyn LocationProvider> = match config.geolocate_url.clone() {
        Some(url) => Arc::new(HttpLocationProvider::new(
            url,
            config.geolocate_api_key.clone(),
        )),
        None => match (config.fixed_lat, config.fixed_lng) {
            (Some(lat), Some(lng)) => Arc::new(FixedLocationProvider::new(GeoPoint {
                lat,
                lng,
                accuracy: 0.0,
            })),
            _ => {
                return Err(eyre!(
                    "Set GEOLOCATE_URL or both GEOMARK_LAT and GEOMARK_LNG"
                ))
            }
        },
    };

    let evaluator = Evaluator::new(location, Arc::new(LogSink), config.location_timeout());

    info!(
        "Evaluator running for user {} every {}s",
        user_id, config.eval_interval_seconds
    );

    // Run until interrupted; the periodic timer dies with the process
    tokio::select! {
        result = evaluator.run(&mut session, config.tick_period()) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
