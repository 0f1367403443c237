use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::asset::Asset;
use crate::driver::Driver;
use crate::error::Result;

/// `(asset, resource) -> Driver` factory bound to one scheme tag.
pub type Factory = Arc<dyn Fn(&dyn Asset, &str) -> Result<Box<dyn Driver>> + Send + Sync>;

/// Process-wide map from scheme tag (`s3`, `s3cache`, `s3gedi`, ...) to a driver factory.
///
/// Registration is expected to happen once at process start; lookups happen on every
/// driver construction and are expected to be rare relative to `read` calls, so a plain
/// mutex-guarded `HashMap` is preferable to anything lock-free.
#[derive(Default)]
pub struct Registry {
    factories: Mutex<HashMap<String, Factory>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tag: impl Into<String>, factory: Factory) {
        let tag = tag.into();
        tracing::debug!(tag, "registering scheme factory");
        self.factories.lock().insert(tag, factory);
    }

    /// Looks up `tag` and constructs a driver for `resource` against `asset`.
    ///
    /// Returns `InvalidResource` if no factory was registered for `tag` — an unknown
    /// scheme is, from the caller's point of view, indistinguishable from a resource
    /// string that cannot be interpreted.
    pub fn create(&self, tag: &str, asset: &dyn Asset, resource: &str) -> Result<Box<dyn Driver>> {
        let factory = self.factories.lock().get(tag).cloned().ok_or_else(|| {
            tracing::warn!(tag, resource, "no factory registered for scheme tag");
            crate::Error::invalid_resource(resource, format!("unknown scheme tag {tag:?}"))
        })?;
        factory(asset, resource)
    }
}
