//! Integration tests for the face gateway API

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tower::ServiceExt; // for `oneshot`

use face_gateway::memory::{MemoryMetadataStore, MemoryObjectStore, StaticDetector};
use face_gateway::{
    create_router, AppState, Detection, Face, FaceRectangle, ImageRecordService, MetadataStore,
    ObjectStore,
};

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

fn sample_detection() -> Detection {
    Detection {
        image_id: "abc123".to_string(),
        request_id: "req-1".to_string(),
        time_used: 42,
        faces: vec![Face {
            face_rectangle: FaceRectangle {
                left: 10,
                top: 10,
                width: 20,
                height: 20,
            },
        }],
    }
}

/// Helper to create the test app over in-memory stores
fn create_test_app(
    detector: StaticDetector,
) -> (
    axum::Router,
    Arc<MemoryObjectStore>,
    Arc<MemoryMetadataStore>,
) {
    let objects = Arc::new(MemoryObjectStore::new());
    let metadata = Arc::new(MemoryMetadataStore::new());

    let state = AppState {
        service: ImageRecordService::new(
            Arc::new(detector),
            objects.clone() as Arc<dyn ObjectStore>,
            metadata.clone() as Arc<dyn MetadataStore>,
        ),
    };

    (
        create_router(state, MAX_IMAGE_BYTES),
        objects,
        metadata,
    )
}

fn white_png(width: u32, height: u32) -> Vec<u8> {
    let canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _objects, _metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "face-gateway");
}

#[tokio::test]
async fn test_create_image() {
    let (app, objects, metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/image")
                .method("POST")
                .body(Body::from(white_png(64, 64)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], "abc123");

    assert!(objects.contains("abc123"));
    assert!(metadata.contains("abc123"));
}

#[tokio::test]
async fn test_create_with_no_faces_is_not_found() {
    let (app, objects, metadata) = create_test_app(StaticDetector::no_faces());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/image")
                .method("POST")
                .body(Body::from(white_png(8, 8)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("no faces"));

    assert!(objects.is_empty());
    assert!(metadata.is_empty());
}

#[tokio::test]
async fn test_create_with_unreachable_detector_is_service_unavailable() {
    let (app, _objects, _metadata) = create_test_app(StaticDetector::unreachable());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/image")
                .method("POST")
                .body(Body::from(white_png(8, 8)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_create_with_empty_body_is_bad_request() {
    let (app, _objects, _metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/image")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_annotated_image() {
    let (app, _objects, _metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    let create = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/image")
                .method("POST")
                .body(Body::from(white_png(64, 64)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/image/abc123?color=red")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "image/png"
    );

    let png = body_bytes(response).await;
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();

    assert_eq!(decoded.dimensions(), (64, 64));
    assert_eq!(*decoded.get_pixel(10, 10), Rgba([255, 0, 0, 255]));
    assert_eq!(*decoded.get_pixel(30, 30), Rgba([255, 0, 0, 255]));
    assert_eq!(*decoded.get_pixel(20, 20), Rgba([255, 255, 255, 255]));
}

#[tokio::test]
async fn test_get_with_unsupported_color_is_bad_request() {
    let (app, _objects, _metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    // No record stored at all; the color is rejected regardless
    let response = app
        .oneshot(
            Request::builder()
                .uri("/image/abc123?color=purple")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("purple"));
}

#[tokio::test]
async fn test_get_without_color_is_bad_request() {
    let (app, _objects, _metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/image/abc123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_record_is_not_found() {
    let (app, _objects, _metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/image/unknown?color=red")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_dangling_record_is_server_error() {
    let (app, objects, _metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    let create = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/image")
                .method("POST")
                .body(Body::from(white_png(8, 8)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::OK);

    // Simulate the record-without-blob inconsistency
    objects.delete("abc123").await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/image/abc123?color=red")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_replace_missing_record_is_not_found() {
    let (app, objects, _metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/image/unknown")
                .method("PUT")
                .body(Body::from(white_png(8, 8)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(objects.is_empty());
}

#[tokio::test]
async fn test_replace_image() {
    let (app, objects, _metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    let create = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/image")
                .method("POST")
                .body(Body::from(white_png(8, 8)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::OK);

    let replacement = white_png(32, 32);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/image/abc123")
                .method("PUT")
                .body(Body::from(replacement.clone()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], "abc123");

    assert_eq!(objects.get("abc123").await.unwrap().unwrap(), replacement);
}

#[tokio::test]
async fn test_delete_image() {
    let (app, objects, metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    let create = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/image")
                .method("POST")
                .body(Body::from(white_png(8, 8)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/image/abc123")
                .method("DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], "abc123");

    assert!(objects.is_empty());
    assert!(metadata.is_empty());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (app, _objects, _metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/image/never-created")
                .method("DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_full_lifecycle() {
    let (app, _objects, _metadata) = create_test_app(StaticDetector::returning(sample_detection()));

    // Create
    let create = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/image")
                .method("POST")
                .body(Body::from(white_png(64, 64)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::OK);
    let json = body_json(create).await;
    assert_eq!(json["id"], "abc123");

    // Fetch annotated: red outline from (10,10) to (30,30)
    let fetch = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/image/abc123?color=red")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(fetch.status(), StatusCode::OK);
    let png = body_bytes(fetch).await;
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(*decoded.get_pixel(10, 10), Rgba([255, 0, 0, 255]));
    assert_eq!(*decoded.get_pixel(30, 10), Rgba([255, 0, 0, 255]));
    assert_eq!(*decoded.get_pixel(10, 30), Rgba([255, 0, 0, 255]));
    assert_eq!(*decoded.get_pixel(30, 30), Rgba([255, 0, 0, 255]));

    // Delete
    let delete = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/image/abc123")
                .method("DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(delete.status(), StatusCode::OK);

    // Fetch again: gone
    let fetch_again = app
        .oneshot(
            Request::builder()
                .uri("/image/abc123?color=red")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(fetch_again.status(), StatusCode::NOT_FOUND);
}
