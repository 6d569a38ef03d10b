use thiserror::Error;

/// Classified failures surfaced by the gateway.
///
/// Every collaborator failure propagates verbatim as one of these variants;
/// there are no silent retries and no local recovery.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no faces found in the supplied image")]
    NoFacesFound,

    #[error("detection service error {code}: {message}")]
    UpstreamError { code: u16, message: String },

    #[error("detection service unreachable: {0}")]
    Unreachable(String),

    #[error("image record not found: {0}")]
    RecordNotFound(String),

    #[error("stored image missing for record: {0}")]
    BlobNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::StorageUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
