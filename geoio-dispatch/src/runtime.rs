//! Process-wide wiring: the scheme registry, credential store, and the single
//! optional cache slot the `s3cache` tag checks before constructing a `CacheDriver`.

use std::sync::Arc;

use geoio_aws::{CredentialStore, FetchConfig, RangeFetcher, S3Driver};
use geoio_cache::{Cache, CacheDriver};
use geoio_core::{Asset, Driver, Error, Registry, Result};
use parking_lot::RwLock;

/// Everything the scripted-call surface (§6) needs, bound together once.
///
/// A `Runtime` is ordinary owned state, not a hidden global: callers that want one
/// process-wide instance build it once and share it behind an `Arc`, the same way
/// they would share any other collaborator. Tests build a fresh `Runtime` per test
/// instead of fighting over a shared singleton.
pub struct Runtime {
    credentials: Arc<CredentialStore>,
    fetcher: Arc<RangeFetcher>,
    cache: Arc<RwLock<Option<Arc<Cache>>>>,
    registry: Registry,
}

impl Runtime {
    pub fn new(fetch_config: FetchConfig) -> Result<Self> {
        let credentials = Arc::new(CredentialStore::new());
        let fetcher = Arc::new(RangeFetcher::new(fetch_config)?);
        let cache: Arc<RwLock<Option<Arc<Cache>>>> = Arc::new(RwLock::new(None));
        let registry = Registry::new();

        register_schemes(&registry, &credentials, &fetcher, &cache);

        Ok(Self {
            credentials,
            fetcher,
            cache,
            registry,
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn fetcher(&self) -> &RangeFetcher {
        &self.fetcher
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Opens `resource` against `asset` through the scheme tag `tag` names.
    pub fn open(&self, tag: &str, asset: &dyn Asset, resource: &str) -> Result<Box<dyn Driver>> {
        self.registry.create(tag, asset, resource)
    }

    /// Initializes the shared disk cache at `root`, bounded to `max_files` entries.
    /// Until this is called, the `s3cache` scheme tag fails with `CacheNotInitialized`.
    pub fn create_cache(&self, root: impl AsRef<std::path::Path>, max_files: usize) -> Result<()> {
        let cache = Cache::create(root, max_files)?;
        *self.cache.write() = Some(Arc::new(cache));
        Ok(())
    }

    /// The current cache, or `CacheNotInitialized` if `create_cache` was never called.
    pub fn cache(&self) -> Result<Arc<Cache>> {
        self.cache.read().clone().ok_or(Error::CacheNotInitialized)
    }
}

fn register_schemes(
    registry: &Registry,
    credentials: &Arc<CredentialStore>,
    fetcher: &Arc<RangeFetcher>,
    cache: &Arc<RwLock<Option<Arc<Cache>>>>,
) {
    {
        let credentials = credentials.clone();
        let fetcher = fetcher.clone();
        registry.register(
            "s3",
            Arc::new(move |asset, resource| {
                S3Driver::new(asset, resource, &credentials, fetcher.clone())
                    .map(|d| Box::new(d) as Box<dyn Driver>)
            }),
        );
    }
    {
        let credentials = credentials.clone();
        let fetcher = fetcher.clone();
        let cache = cache.clone();
        registry.register(
            "s3cache",
            Arc::new(move |asset, resource| {
                let cache = cache.read().clone().ok_or(Error::CacheNotInitialized)?;
                CacheDriver::new(asset, resource, &cache, &credentials, &fetcher)
                    .map(|d| Box::new(d) as Box<dyn Driver>)
            }),
        );
    }
    {
        let credentials = credentials.clone();
        let fetcher = fetcher.clone();
        registry.register(
            "s3gedi",
            Arc::new(move |asset, resource| {
                geoio_datasets::gedi::open(asset, resource, &credentials, fetcher.clone())
                    .map(|d| Box::new(d) as Box<dyn Driver>)
            }),
        );
    }
    {
        let credentials = credentials.clone();
        let fetcher = fetcher.clone();
        registry.register(
            "s3atl24",
            Arc::new(move |asset, resource| {
                geoio_datasets::atl24::open(asset, resource, &credentials, fetcher.clone())
                    .map(|d| Box::new(d) as Box<dyn Driver>)
            }),
        );
    }
    {
        let credentials = credentials.clone();
        let fetcher = fetcher.clone();
        registry.register(
            "cumulus",
            Arc::new(move |asset, resource| {
                geoio_datasets::cumulus::open(asset, resource, &credentials, fetcher.clone())
                    .map(|d| Box::new(d) as Box<dyn Driver>)
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoio_core::StaticAsset;

    #[test]
    fn s3cache_tag_fails_before_create_cache() {
        let runtime = Runtime::new(FetchConfig::default()).unwrap();
        let asset = StaticAsset::new("iam-role", "us-west-2", "", "bkt");
        let err = runtime.open("s3cache", &asset, "a/b.h5").unwrap_err();
        assert!(matches!(err, Error::CacheNotInitialized));
    }

    #[test]
    fn s3cache_tag_succeeds_after_create_cache() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/bkt/a/b.h5")
            .with_status(200)
            .with_body(vec![0x9u8; 8])
            .create();

        let runtime = Runtime::new(FetchConfig {
            base_url_override: Some(server.url()),
            ..Default::default()
        })
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        runtime.create_cache(dir.path(), 16).unwrap();

        let asset = StaticAsset::new("iam-role", "us-west-2", "", "bkt");
        assert!(runtime.open("s3cache", &asset, "a/b.h5").is_ok());
    }

    #[test]
    fn unknown_tag_is_invalid_resource() {
        let runtime = Runtime::new(FetchConfig::default()).unwrap();
        let asset = StaticAsset::new("iam-role", "us-west-2", "", "bkt");
        let err = runtime.open("not-a-tag", &asset, "r").unwrap_err();
        assert!(matches!(err, Error::InvalidResource { .. }));
    }
}
