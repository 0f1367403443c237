use thiserror::Error;

/// Error taxonomy shared by every driver and the signing/fetch layers built on top of it.
///
/// Variants map onto the kinds a caller needs to distinguish, not onto individual
/// failure sites: a local file open and a local seek both surface as `LocalIoError`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid resource {resource:?}: {reason}")]
    InvalidResource { resource: String, reason: String },

    #[error("cache driver used before a cache root was initialized")]
    CacheNotInitialized,

    #[error("transfer failed for {bucket}/{key} after {attempts} attempt(s): {reason}")]
    TransferFailed {
        bucket: String,
        key: String,
        attempts: u32,
        reason: String,
    },

    #[error("http status {status} for {bucket}/{key}")]
    HttpStatusError {
        bucket: String,
        key: String,
        status: u16,
    },

    #[error("local io error: {0}")]
    LocalIoError(#[from] std::io::Error),

    #[error("signing error: {0}")]
    SigningError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_resource(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidResource {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Whether a retry loop (§4.3) should keep going after this error, or give up.
    ///
    /// Only `HttpStatusError` is retryable by policy; everything else is either
    /// already the terminal escalation (`TransferFailed`) or unrelated to transport.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::HttpStatusError { .. })
    }
}
