//! Face Gateway Service
//!
//! REST gateway in front of an external face-detection API: uploads are
//! forwarded for detection, the image bytes land in an object store and the
//! detection result in a metadata store under the same image id, and
//! retrieval serves the image back with its face boxes drawn on.

pub mod annotate;
pub mod config;
pub mod error;
pub mod face_client;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod service;
pub mod storage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::{Error, Result};
pub use face_client::{DetectionClient, FaceApiClient};
pub use handlers::AppState;
pub use models::{BoxColor, Detection, Face, FaceRectangle, ImageRecord, RecordUpdate};
pub use service::ImageRecordService;
pub use storage::{MetadataStore, ObjectStore, RedisMetadataStore, RedisObjectStore};

/// Create the application router
pub fn create_router(state: AppState, max_image_bytes: usize) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/image", post(handlers::create_image_handler))
        .route("/image/:image_id", get(handlers::get_image_handler))
        .route("/image/:image_id", put(handlers::replace_image_handler))
        .route("/image/:image_id", delete(handlers::delete_image_handler))
        .with_state(shared_state)
        .layer(DefaultBodyLimit::max(max_image_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
