use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use geoio_aws::{Credential, RangeFetcher};
use geoio_core::Error;
use parking_lot::Mutex;

/// Default cache root, relative to the process's current working directory (§6).
pub const DEFAULT_CACHE_ROOT: &str = ".cache";

/// Default maximum number of cached files (§6).
pub const DEFAULT_MAX_CACHE_FILES: usize = 16;

struct State {
    index_counter: u64,
    lookup: HashMap<String, u64>,
    files: BTreeMap<u64, String>,
}

/// Process-wide, mutex-guarded bounded-entry LRU over a flat on-disk directory (C6).
///
/// Built once (typically via the scripted `s3cache` entry point) and shared behind an
/// `Arc` by every `CacheDriver` constructed afterwards. Tests construct a fresh
/// `Cache` pointed at a `tempfile::tempdir()` rather than disturbing a shared instance.
pub struct Cache {
    root: PathBuf,
    max_size: usize,
    state: Mutex<State>,
}

impl Cache {
    /// Creates (or adopts) `root` as the cache directory, recovering up to
    /// `max_files` previously-cached entries by reversing the `/`→`#` filename
    /// encoding. "Already exists" is not an error.
    pub fn create(root: impl AsRef<Path>, max_files: usize) -> Result<Self, Error> {
        let root = root.as_ref().to_path_buf();
        // `create_dir_all` is already a no-op when the directory is present, so
        // "exists" never needs special-casing here.
        fs::create_dir_all(&root)?;

        let mut lookup = HashMap::new();
        let mut files = BTreeMap::new();
        let mut index_counter = 0u64;

        if let Ok(entries) = fs::read_dir(&root) {
            for entry in entries.flatten() {
                if lookup.len() >= max_files {
                    break;
                }
                let Ok(file_type) = entry.file_type() else {
                    continue;
                };
                if !file_type.is_file() {
                    continue;
                }
                let filename = entry.file_name();
                let Some(filename) = filename.to_str() else {
                    continue;
                };
                let key = decode_filename(filename);
                index_counter += 1;
                lookup.insert(key.clone(), index_counter);
                files.insert(index_counter, key);
            }
        }

        tracing::debug!(root = %root.display(), adopted = lookup.len(), "cache initialized");

        Ok(Self {
            root,
            max_size: max_files,
            state: Mutex::new(State {
                index_counter,
                lookup,
                files,
            }),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.state.lock().lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn local_path(&self, cache_key: &str) -> PathBuf {
        self.root.join(encode_key(cache_key))
    }

    /// Resolves `bucket`/`key` to a local file path, downloading through `fetcher` on
    /// a cache miss and evicting the least-recently-used entry if the cache is full.
    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(skip(self, credential, fetcher))]
    pub fn file_get(
        &self,
        bucket: &str,
        key: &str,
        region: &str,
        credential: &Credential,
        fetcher: &RangeFetcher,
    ) -> Result<PathBuf, Error> {
        let cache_key = format!("{bucket}/{key}");
        let local_path = self.local_path(&cache_key);

        if self.promote_if_present(&cache_key) {
            return Ok(local_path);
        }

        fetcher.get_file(region, bucket, key, credential, &local_path)?;
        self.insert_after_download(&cache_key);
        Ok(local_path)
    }

    /// Promotes `cache_key` to most-recently-used if present. Returns whether it was
    /// a hit; a hit performs no I/O at all.
    fn promote_if_present(&self, cache_key: &str) -> bool {
        let mut state = self.state.lock();
        let Some(&old_index) = state.lookup.get(cache_key) else {
            return false;
        };
        state.index_counter += 1;
        let new_index = state.index_counter;
        state.files.remove(&old_index);
        state.files.insert(new_index, cache_key.to_string());
        state.lookup.insert(cache_key.to_string(), new_index);
        true
    }

    fn insert_after_download(&self, cache_key: &str) {
        let mut state = self.state.lock();

        if state.lookup.len() >= self.max_size {
            if let Some((&victim_index, victim_key)) = state.files.iter().next() {
                let victim_key = victim_key.clone();
                let victim_path = self.local_path(&victim_key);
                if let Err(e) = fs::remove_file(&victim_path) {
                    tracing::warn!(path = %victim_path.display(), error = %e, "failed to remove evicted cache file");
                }
                state.files.remove(&victim_index);
                state.lookup.remove(&victim_key);
            }
        }

        state.index_counter += 1;
        let new_index = state.index_counter;
        state.files.insert(new_index, cache_key.to_string());
        state.lookup.insert(cache_key.to_string(), new_index);
    }
}

fn encode_key(key: &str) -> String {
    key.replace('/', "#")
}

fn decode_filename(filename: &str) -> String {
    filename.replace('#', "/")
}
