use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use geoio_aws::{Credential, CredentialStore, RangeFetcher};
use geoio_core::{Asset, Driver, Error, Result};

use crate::lru::Cache;

/// Driver layering the bounded-entry LRU disk cache in front of the direct S3 driver
/// (C6). `read` is a local `pread` against the cached file once `fileGet` resolves it.
pub struct CacheDriver {
    bucket: String,
    key: String,
    file: File,
}

impl CacheDriver {
    pub fn new(
        asset: &dyn Asset,
        resource: &str,
        cache: &Cache,
        credentials: &CredentialStore,
        fetcher: &RangeFetcher,
    ) -> Result<Self> {
        let resourcepath = format!("{}/{}", asset.path(), resource);
        let (bucket, key) = geoio_core::split_bucket_key(&resourcepath)?;
        let credential: Credential = credentials.get(asset.name());

        let local_path = cache.file_get(&bucket, &key, asset.region(), &credential, fetcher)?;
        let file = File::open(&local_path).map_err(Error::LocalIoError)?;

        Ok(Self { bucket, key, file })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Driver for CacheDriver {
    fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        self.file.seek(SeekFrom::Start(offset)).map_err(Error::LocalIoError)?;

        let mut written = 0usize;
        while written < buf.len() {
            match self.file.read(&mut buf[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) => return Err(Error::LocalIoError(e)),
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoio_core::StaticAsset;

    fn init_test_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn cache_driver_reads_downloaded_bytes() {
        init_test_tracing();
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/bkt/a/b.h5")
            .with_status(200)
            .with_body(vec![0x55u8; 128])
            .create();

        let cache_dir = tempfile::tempdir().unwrap();
        let cache = Cache::create(cache_dir.path(), 16).unwrap();
        let credentials = CredentialStore::new();
        let fetcher = RangeFetcher::new(geoio_aws::FetchConfig {
            base_url_override: Some(server.url()),
            ..Default::default()
        })
        .unwrap();

        let asset = StaticAsset::new("iam-role", "us-west-2", "", "bkt");
        let mut driver = CacheDriver::new(&asset, "a/b.h5", &cache, &credentials, &fetcher).unwrap();

        let mut buf = [0u8; 32];
        let n = driver.read(&mut buf, 0).unwrap();
        assert_eq!(n, 32);
        assert_eq!(buf, [0x55u8; 32]);
        mock.assert();
    }

    #[test]
    fn second_construction_is_a_cache_hit_and_issues_no_download() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/bkt/a/b.h5")
            .with_status(200)
            .with_body(vec![0x77u8; 16])
            .expect(1)
            .create();

        let cache_dir = tempfile::tempdir().unwrap();
        let cache = Cache::create(cache_dir.path(), 16).unwrap();
        let credentials = CredentialStore::new();
        let fetcher = RangeFetcher::new(geoio_aws::FetchConfig {
            base_url_override: Some(server.url()),
            ..Default::default()
        })
        .unwrap();

        let asset = StaticAsset::new("iam-role", "us-west-2", "", "bkt");
        let _first = CacheDriver::new(&asset, "a/b.h5", &cache, &credentials, &fetcher).unwrap();
        let _second = CacheDriver::new(&asset, "a/b.h5", &cache, &credentials, &fetcher).unwrap();

        mock.assert();
    }
}
