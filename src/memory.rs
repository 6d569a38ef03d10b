//! In-memory store and client implementations
//!
//! Used by the test suites and for running the gateway locally without the
//! external services. They honor the same contracts as the Redis-backed
//! implementations, and additionally support simulating a store outage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::face_client::DetectionClient;
use crate::models::{Detection, ImageRecord, RecordUpdate};
use crate::storage::{MetadataStore, ObjectStore};

/// In-memory object store
#[derive(Default)]
pub struct MemoryObjectStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    unavailable: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`Error::StorageUnavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::StorageUnavailable(
                "simulated blob store outage".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, id: &str, bytes: &[u8]) -> Result<()> {
        self.check_available()?;
        self.blobs
            .lock()
            .unwrap()
            .insert(id.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Vec<u8>>> {
        self.check_available()?;
        Ok(self.blobs.lock().unwrap().get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check_available()?;
        self.blobs.lock().unwrap().remove(id);
        Ok(())
    }
}

/// In-memory metadata store
#[derive(Default)]
pub struct MemoryMetadataStore {
    records: Mutex<HashMap<String, ImageRecord>>,
    unavailable: AtomicBool,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`Error::StorageUnavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.lock().unwrap().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::StorageUnavailable(
                "simulated metadata store outage".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn insert_if_absent(&self, record: &ImageRecord) -> Result<bool> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.image_id) {
            return Ok(false);
        }
        records.insert(record.image_id.clone(), record.clone());
        Ok(true)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ImageRecord>> {
        self.check_available()?;
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn replace(&self, id: &str, update: &RecordUpdate) -> Result<Option<ImageRecord>> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        match records.get_mut(id) {
            Some(record) => {
                record.apply(update);
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check_available()?;
        self.records.lock().unwrap().remove(id);
        Ok(())
    }
}

enum CannedOutcome {
    Detection(Detection),
    NoFaces,
    Unreachable,
}

/// Detection client returning a canned outcome
pub struct StaticDetector {
    outcome: CannedOutcome,
}

impl StaticDetector {
    /// Always succeed with `detection`
    pub fn returning(detection: Detection) -> Self {
        Self {
            outcome: CannedOutcome::Detection(detection),
        }
    }

    /// Always fail with [`Error::NoFacesFound`]
    pub fn no_faces() -> Self {
        Self {
            outcome: CannedOutcome::NoFaces,
        }
    }

    /// Always fail with [`Error::Unreachable`]
    pub fn unreachable() -> Self {
        Self {
            outcome: CannedOutcome::Unreachable,
        }
    }
}

#[async_trait]
impl DetectionClient for StaticDetector {
    async fn detect(&self, _image: &[u8]) -> Result<Detection> {
        match &self.outcome {
            CannedOutcome::Detection(detection) => Ok(detection.clone()),
            CannedOutcome::NoFaces => Err(Error::NoFacesFound),
            CannedOutcome::Unreachable => {
                Err(Error::Unreachable("simulated transport failure".to_string()))
            }
        }
    }
}
