//! Image record orchestration
//!
//! [`ImageRecordService`] is the sole writer of the object and metadata
//! stores. Each operation is a short-lived saga with a fixed write order;
//! partial-failure states are documented and tolerated rather than
//! auto-healed, so every collaborator failure propagates to the caller
//! unchanged.

use std::sync::Arc;

use tracing::{debug, info};

use crate::annotate;
use crate::error::{Error, Result};
use crate::face_client::DetectionClient;
use crate::models::{BoxColor, ImageRecord, RecordUpdate};
use crate::storage::{MetadataStore, ObjectStore};

/// Orchestrates detection, blob storage and metadata storage.
pub struct ImageRecordService {
    detector: Arc<dyn DetectionClient>,
    objects: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataStore>,
}

impl ImageRecordService {
    pub fn new(
        detector: Arc<dyn DetectionClient>,
        objects: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            detector,
            objects,
            metadata,
        }
    }

    /// Detect faces in `image` and persist blob + record under the detected
    /// image id.
    ///
    /// The blob is written before the record, so a record never points at a
    /// missing blob; a crash between the two writes leaves an orphan blob,
    /// which `fetch_annotated` never observes. A duplicate create (the
    /// detection service reused an id) succeeds with the existing id.
    pub async fn create(&self, image: &[u8]) -> Result<String> {
        if image.is_empty() {
            return Err(Error::InvalidArgument("empty image payload".to_string()));
        }

        let detection = self.detector.detect(image).await?;
        let record = ImageRecord::from_detection(&detection);
        let image_id = record.image_id.clone();

        info!(
            "Detected {} face(s) for image: {}",
            record.faces.len(),
            image_id
        );

        self.objects.put(&image_id, image).await?;

        let inserted = self.metadata.insert_if_absent(&record).await?;
        if !inserted {
            debug!("Duplicate create for image: {}", image_id);
        }

        Ok(image_id)
    }

    /// Fetch the stored image with its recorded face boxes drawn on, as PNG.
    ///
    /// A missing record is `RecordNotFound`; a record whose blob is missing
    /// is the distinct `BlobNotFound`, signaling store inconsistency.
    pub async fn fetch_annotated(&self, image_id: &str, color: BoxColor) -> Result<Vec<u8>> {
        debug!("Annotating image: {} in {}", image_id, color);

        let record = self
            .metadata
            .find_by_id(image_id)
            .await?
            .ok_or_else(|| Error::RecordNotFound(image_id.to_string()))?;

        let blob = self
            .objects
            .get(image_id)
            .await?
            .ok_or_else(|| Error::BlobNotFound(image_id.to_string()))?;

        annotate::render(&blob, &record.faces, color)
    }

    /// Re-detect on `image` and replace record fields and blob for an
    /// existing id.
    ///
    /// The record is updated before the blob: a replace of an id that was
    /// never created fails without touching the blob, and a blob-write
    /// failure after the record update leaves a window that a retried
    /// replace closes (blob `put` is idempotent).
    pub async fn replace(&self, image_id: &str, image: &[u8]) -> Result<ImageRecord> {
        if image.is_empty() {
            return Err(Error::InvalidArgument("empty image payload".to_string()));
        }

        let detection = self.detector.detect(image).await?;
        let update = RecordUpdate::from(&detection);

        let record = self
            .metadata
            .replace(image_id, &update)
            .await?
            .ok_or_else(|| Error::RecordNotFound(image_id.to_string()))?;

        self.objects.put(image_id, image).await?;

        info!("Replaced image: {}", image_id);
        Ok(record)
    }

    /// Delete blob and record for `image_id`.
    ///
    /// Idempotent end-to-end: succeeds even when nothing was stored. The
    /// blob goes first, so a crash in between leaves a dangling record that
    /// `fetch_annotated` already surfaces as `BlobNotFound`, never an
    /// undiscoverable blob.
    pub async fn delete(&self, image_id: &str) -> Result<()> {
        self.objects.delete(image_id).await?;
        self.metadata.delete(image_id).await?;

        info!("Deleted image: {}", image_id);
        Ok(())
    }
}
