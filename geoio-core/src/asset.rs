/// Caller-supplied configuration object naming the origin of a family of resources.
///
/// The driver layer only ever borrows an `Asset`; callers are responsible for keeping
/// it alive for at least as long as any driver constructed from it.
pub trait Asset: Send + Sync {
    fn name(&self) -> &str;
    fn region(&self) -> &str;
    fn endpoint(&self) -> &str;
    fn path(&self) -> &str;
}

/// A plain-data `Asset` for callers that do not need a richer implementation.
#[derive(Debug, Clone)]
pub struct StaticAsset {
    name: String,
    region: String,
    endpoint: String,
    path: String,
}

impl StaticAsset {
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        endpoint: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            endpoint: endpoint.into(),
            path: path.into(),
        }
    }
}

impl Asset for StaticAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn path(&self) -> &str {
        &self.path
    }
}
