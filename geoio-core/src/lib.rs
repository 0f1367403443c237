//! Shared foundation for the geoio remote-object I/O stack: the `Driver` trait, the
//! scheme `Registry`, the `Asset` collaborator, and the error taxonomy every other
//! crate in the workspace builds on.

mod asset;
mod driver;
mod error;
mod registry;
pub mod time;

pub use asset::{Asset, StaticAsset};
pub use driver::Driver;
pub use error::{Error, Result};
pub use registry::{Factory, Registry};

/// Splits `resourcepath` at its first `/` into owned `(bucket, key)` strings.
///
/// This is the one piece of bucket/key splitting logic in the whole workspace;
/// the direct S3 driver (C5) and every resource-path translator (C7) call through
/// it after building their own prefix, rather than each re-implementing the split.
///
/// Unlike the source this crate is grounded on, `bucket` and `key` are independently
/// owned `String`s — no NUL is ever written into a shared allocation, and there is no
/// aliasing between the two halves after this function returns (§9).
pub fn split_bucket_key(resourcepath: &str) -> Result<(String, String)> {
    match resourcepath.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
            Ok((bucket.to_string(), key.to_string()))
        }
        _ => Err(Error::invalid_resource(
            resourcepath,
            "could not split into a non-empty bucket and key",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_first_slash() {
        let (bucket, key) = split_bucket_key("data/a/b/c.h5").unwrap();
        assert_eq!(bucket, "data");
        assert_eq!(key, "a/b/c.h5");
    }

    #[test]
    fn rejects_missing_slash() {
        assert!(split_bucket_key("nosep").is_err());
    }

    #[test]
    fn rejects_empty_key() {
        assert!(split_bucket_key("data/").is_err());
    }
}
