//! Face Gateway Service
//!
//! REST API for face detection, annotated retrieval and record management

use anyhow::{Context, Result};
use face_gateway::{
    create_router, AppState, Config, FaceApiClient, ImageRecordService, RedisMetadataStore,
    RedisObjectStore,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "face_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Starting Face Gateway Service");
    info!("Detection API: {}", config.face_api_url);
    info!("Metadata store: {}", config.metadata_redis_url);
    info!("Blob store: {}", config.blob_redis_url);

    // Collaborator handles
    let detector = FaceApiClient::new(
        config.face_api_url.clone(),
        config.face_api_key.clone(),
        config.face_api_secret.clone(),
        config.detect_timeout,
    )
    .context("Failed to initialize detection client")?;

    let objects = RedisObjectStore::new(&config.blob_redis_url)
        .await
        .context("Failed to initialize blob store")?;

    let metadata = RedisMetadataStore::new(&config.metadata_redis_url)
        .await
        .context("Failed to initialize metadata store")?;

    // Create application state
    let state = AppState {
        service: ImageRecordService::new(
            Arc::new(detector),
            Arc::new(objects),
            Arc::new(metadata),
        ),
    };

    // Create router
    let app = create_router(state, config.max_image_bytes);

    // Bind and serve
    let addr = config.gateway_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("Face Gateway Service running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
