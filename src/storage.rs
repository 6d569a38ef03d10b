//! Store interfaces and their Redis-backed implementations
//!
//! The gateway talks to two independent stores: an object store holding the
//! raw image bytes and a metadata store holding the detection documents.
//! Both are capability traits so the orchestrator can run against in-memory
//! implementations in tests (see [`crate::memory`]).

use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{ImageRecord, RecordUpdate};

/// Opaque byte blobs keyed by image id.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a blob, overwriting any existing one under `id`.
    async fn put(&self, id: &str, bytes: &[u8]) -> Result<()>;

    /// Fetch a blob; `None` when absent.
    async fn get(&self, id: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a blob; a no-op when absent, so retried compensations are safe.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Detection documents keyed by image id.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a record unless one already exists under its `image_id`.
    ///
    /// Returns `true` if inserted, `false` if an entry already existed.
    /// Never overwrites: creation is first-write-wins.
    async fn insert_if_absent(&self, record: &ImageRecord) -> Result<bool>;

    /// Look up a record; `None` when absent.
    async fn find_by_id(&self, id: &str) -> Result<Option<ImageRecord>>;

    /// Apply `update` to an existing record, returning the updated record,
    /// or `None` when no record exists under `id`.
    async fn replace(&self, id: &str, update: &RecordUpdate) -> Result<Option<ImageRecord>>;

    /// Delete a record; a no-op when absent.
    async fn delete(&self, id: &str) -> Result<()>;
}

fn blob_key(id: &str) -> String {
    format!("blob:{id}")
}

fn record_key(id: &str) -> String {
    format!("record:{id}")
}

/// Object store backed by a Redis instance
pub struct RedisObjectStore {
    conn: ConnectionManager,
}

impl RedisObjectStore {
    /// Connect to the blob store
    pub async fn new(redis_url: &str) -> AnyResult<Self> {
        let client = redis::Client::open(redis_url)
            .context("Failed to create blob store Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to blob store Redis")?;

        info!("Connected to blob store at {}", redis_url);

        Ok(Self { conn })
    }
}

#[async_trait]
impl ObjectStore for RedisObjectStore {
    async fn put(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(blob_key(id), bytes).await?;

        info!("Stored {} byte blob for image: {}", bytes.len(), id);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let bytes: Option<Vec<u8>> = conn.get(blob_key(id)).await?;

        debug!("Blob lookup for image: {} found: {}", id, bytes.is_some());
        Ok(bytes)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let deleted: bool = conn.del(blob_key(id)).await?;

        if deleted {
            info!("Deleted blob for image: {}", id);
        }
        Ok(())
    }
}

/// Metadata store backed by a Redis instance, documents stored as JSON
pub struct RedisMetadataStore {
    conn: ConnectionManager,
}

impl RedisMetadataStore {
    /// Connect to the metadata store
    pub async fn new(redis_url: &str) -> AnyResult<Self> {
        let client = redis::Client::open(redis_url)
            .context("Failed to create metadata store Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to metadata store Redis")?;

        info!("Connected to metadata store at {}", redis_url);

        Ok(Self { conn })
    }
}

#[async_trait]
impl MetadataStore for RedisMetadataStore {
    async fn insert_if_absent(&self, record: &ImageRecord) -> Result<bool> {
        let json = serde_json::to_string(record)?;

        // SET NX keeps concurrent creates for the same id race-free
        let mut conn = self.conn.clone();
        let inserted: bool = conn.set_nx(record_key(&record.image_id), json).await?;

        if inserted {
            info!("Created record for image: {}", record.image_id);
        } else {
            debug!("Record already exists for image: {}", record.image_id);
        }
        Ok(inserted)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ImageRecord>> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(record_key(id)).await?;

        match json {
            Some(data) => {
                let record: ImageRecord = serde_json::from_str(&data)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn replace(&self, id: &str, update: &RecordUpdate) -> Result<Option<ImageRecord>> {
        let mut record = match self.find_by_id(id).await? {
            Some(record) => record,
            None => {
                debug!("Record not found for image: {}", id);
                return Ok(None);
            }
        };

        record.apply(update);
        let json = serde_json::to_string(&record)?;

        let mut conn = self.conn.clone();
        let _: () = conn.set(record_key(id), json).await?;

        info!("Updated record for image: {}", id);
        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let deleted: bool = conn.del(record_key(id)).await?;

        if deleted {
            info!("Deleted record for image: {}", id);
        }
        Ok(())
    }
}
