//! API request handlers for the face gateway

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::Error;
use crate::models::BoxColor;
use crate::service::ImageRecordService;

/// Shared application state
pub struct AppState {
    pub service: ImageRecordService,
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message
        });

        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::NoFacesFound | Error::RecordNotFound(_) => StatusCode::NOT_FOUND,
            Error::UpstreamError { code, .. } => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Error::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Error::BlobNotFound(_)
            | Error::StorageUnavailable(_)
            | Error::Json(_)
            | Error::Image(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

/// Response carrying an image id
#[derive(Debug, Serialize)]
pub struct ImageIdResponse {
    pub id: String,
}

/// Query parameters for annotated retrieval
#[derive(Debug, Deserialize)]
pub struct AnnotateParams {
    pub color: Option<String>,
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "face-gateway"
    }))
}

/// Detect faces in the uploaded image and store blob + record
pub async fn create_image_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ImageIdResponse>, ApiError> {
    info!("Creating image record from {} byte upload", body.len());

    let id = state.service.create(&body).await?;

    Ok(Json(ImageIdResponse { id }))
}

/// Fetch the stored image with face boxes drawn on
pub async fn get_image_handler(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<String>,
    Query(params): Query<AnnotateParams>,
) -> Result<Response, ApiError> {
    info!("Fetching annotated image: {}", image_id);

    let color: BoxColor = params
        .color
        .as_deref()
        .ok_or_else(|| {
            ApiError::from(Error::InvalidArgument(
                "missing required query parameter 'color'".to_string(),
            ))
        })?
        .parse()?;

    let png = state.service.fetch_annotated(&image_id, color).await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Re-detect on the uploaded image and replace record + blob
pub async fn replace_image_handler(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<String>,
    body: Bytes,
) -> Result<Json<ImageIdResponse>, ApiError> {
    info!("Replacing image: {}", image_id);

    let record = state.service.replace(&image_id, &body).await?;

    Ok(Json(ImageIdResponse {
        id: record.image_id,
    }))
}

/// Delete record and blob for an image
pub async fn delete_image_handler(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<String>,
) -> Result<Json<ImageIdResponse>, ApiError> {
    info!("Deleting image: {}", image_id);

    state.service.delete(&image_id).await?;

    Ok(Json(ImageIdResponse { id: image_id }))
}
