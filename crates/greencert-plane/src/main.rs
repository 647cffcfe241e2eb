//! Green Certificate Plane Binary
//!
//! Runs the certificate issuance and verification HTTP server.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use greencert_plane::{
    build_state, create_router, CertificateStore, MemoryLedger, MemoryStore, PlaneConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration
    let config = PlaneConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Initialize storage
    let store = open_store(&config).await?;
    let ledger = Arc::new(MemoryLedger::new());

    info!(
        port = config.port,
        public_url = %config.public_url,
        verify_url = %config.verify_url,
        ledger_timeout_secs = config.ledger_timeout.as_secs(),
        "Starting certificate plane"
    );

    let port = config.port;
    let state = Arc::new(build_state(config, store, ledger).await?);
    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "Certificate plane listening");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "postgres")]
async fn open_store(
    config: &PlaneConfig,
) -> Result<Arc<dyn CertificateStore>, Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(url) => Ok(Arc::new(greencert_plane::storage::PostgresStore::new(url).await?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(not(feature = "postgres"))]
async fn open_store(
    config: &PlaneConfig,
) -> Result<Arc<dyn CertificateStore>, Box<dyn std::error::Error>> {
    if config.database_url.is_some() {
        tracing::warn!("GREENCERT_DATABASE_URL is set but the postgres feature is not compiled in; using memory store");
    }
    Ok(Arc::new(MemoryStore::new()))
}
