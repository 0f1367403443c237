//! The scripted-call surface (§6): the handful of flat functions an embedding calls
//! directly, each operating on a shared `Runtime` rather than a scheme-tagged resource.

use std::path::{Path, PathBuf};

use geoio_aws::{Credential, DEFAULT_ASSET_NAME, DEFAULT_REGION};
use geoio_cache::DEFAULT_MAX_CACHE_FILES;
use geoio_core::Result;

use crate::runtime::Runtime;

fn region_or_default(region: Option<&str>) -> &str {
    region.unwrap_or(DEFAULT_REGION)
}

fn asset_or_default(asset: Option<&str>) -> &str {
    asset.unwrap_or(DEFAULT_ASSET_NAME)
}

/// Downloads the whole object into memory, NUL-terminated (§4.3's streaming sink).
pub fn s3get(runtime: &Runtime, bucket: &str, key: &str, region: Option<&str>, asset: Option<&str>) -> Result<Vec<u8>> {
    let region = region_or_default(region);
    let asset = asset_or_default(asset);
    tracing::debug!(bucket, key, region, asset, "s3get");
    let credential = runtime.credentials().get(asset);
    runtime.fetcher().get_streaming(region, bucket, key, &credential)
}

/// Downloads the whole object to `filename`, defaulting to the last path segment of
/// `key` when `filename` is not given. Returns the number of bytes written.
pub fn s3download(
    runtime: &Runtime,
    bucket: &str,
    key: &str,
    filename: Option<&str>,
    region: Option<&str>,
    asset: Option<&str>,
) -> Result<u64> {
    let region = region_or_default(region);
    let asset = asset_or_default(asset);
    let destination = filename.map(PathBuf::from).unwrap_or_else(|| default_download_filename(key));
    tracing::debug!(bucket, key, region, asset, destination = %destination.display(), "s3download");
    let credential = runtime.credentials().get(asset);
    runtime.fetcher().get_file(region, bucket, key, &credential, &destination)
}

fn default_download_filename(key: &str) -> PathBuf {
    PathBuf::from(key.rsplit('/').next().unwrap_or(key))
}

/// Reads exactly `size` bytes (or fewer, at end-of-object) starting at `offset`.
#[allow(clippy::too_many_arguments)]
pub fn s3read(
    runtime: &Runtime,
    bucket: &str,
    key: &str,
    size: usize,
    offset: u64,
    region: Option<&str>,
    asset: Option<&str>,
) -> Result<Vec<u8>> {
    let region = region_or_default(region);
    let asset = asset_or_default(asset);
    tracing::debug!(bucket, key, size, offset, region, asset, "s3read");
    let credential = runtime.credentials().get(asset);
    let mut buf = vec![0u8; size];
    let n = runtime.fetcher().get_fixed(region, bucket, key, &credential, &mut buf, offset)?;
    buf.truncate(n);
    Ok(buf)
}

/// Uploads the whole contents of `filename` to `bucket`/`key`, returning bytes sent.
pub fn s3upload(
    runtime: &Runtime,
    bucket: &str,
    key: &str,
    filename: &Path,
    region: Option<&str>,
    asset: Option<&str>,
) -> Result<u64> {
    let region = region_or_default(region);
    let asset = asset_or_default(asset);
    tracing::debug!(bucket, key, region, asset, filename = %filename.display(), "s3upload");
    let credential = runtime.credentials().get(asset);
    runtime.fetcher().put_file(region, bucket, key, &credential, filename)
}

/// Initializes the shared disk cache. Subsequent `s3cache`-tagged `Runtime::open`
/// calls succeed once this has run; before it, they fail with `CacheNotInitialized`.
pub fn s3cache(runtime: &Runtime, root: impl AsRef<Path>, max_files: Option<usize>) -> Result<bool> {
    let max_files = max_files.unwrap_or(DEFAULT_MAX_CACHE_FILES);
    tracing::info!(root = %root.as_ref().display(), max_files, "s3cache");
    runtime.create_cache(root, max_files)?;
    Ok(true)
}

/// Reads the credential currently on file for `host` (anonymous if never `csput`).
pub fn csget(runtime: &Runtime, host: &str) -> Credential {
    tracing::debug!(host, "csget");
    runtime.credentials().get(host)
}

/// Installs `credential` as the current credential for `host`.
pub fn csput(runtime: &Runtime, host: &str, credential: Credential) -> bool {
    tracing::debug!(host, "csput");
    runtime.credentials().put(host, credential)
}
