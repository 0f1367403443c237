use std::collections::{HashMap, HashSet};

use geoio_core::time::gettime_ms;
use parking_lot::Mutex;

/// A short-lived AWS access tuple. `provided = false` is a legal, anonymous credential:
/// the signer (§4.2) simply omits the `Authorization`/`x-amz-security-token` headers.
#[derive(Debug, Clone, Default)]
pub struct Credential {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub expiration_gps_ms: Option<i64>,
    pub provided: bool,
}

impl Credential {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
        expiration_gps_ms: Option<i64>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
            expiration_gps_ms,
            provided: true,
        }
    }
}

/// Process-wide mapping from host to its current credential, protected by one mutex.
///
/// `get`/`put` are both total: a miss on `get` returns an anonymous credential rather
/// than an error, and `put` always succeeds at replacing the map entry. The per-host
/// time-to-live metric sample and the lazy metric registration happen inside `put`.
pub struct CredentialStore {
    entries: Mutex<HashMap<String, Credential>>,
    metrics_registered: Mutex<HashSet<String>>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            metrics_registered: Mutex::new(HashSet::new()),
        }
    }

    /// Returns the current credential for `host`, or an anonymous sentinel if none
    /// has ever been `put`. Never fails.
    pub fn get(&self, host: &str) -> Credential {
        self.entries.lock().get(host).cloned().unwrap_or_default()
    }

    /// Inserts or replaces the credential for `host`.
    ///
    /// Emits a `time_to_live_seconds` gauge sample for `host` when the credential
    /// carries an expiration; logs at `CRITICAL` (via `tracing::error!`) and skips the
    /// sample otherwise. The gauge is registered lazily on the first `put` for a given
    /// host, matching the source's per-host metric-id registration.
    pub fn put(&self, host: &str, credential: Credential) -> bool {
        let first_put_for_host = self.metrics_registered.lock().insert(host.to_string());
        if first_put_for_host {
            tracing::debug!(host, "registering credential time-to-live metric");
        }

        match credential.expiration_gps_ms {
            Some(expiration) => {
                let ttl_seconds = (expiration - gettime_ms()) as f64 / 1000.0;
                metrics::gauge!("geoio_credential_ttl_seconds", "host" => host.to_string())
                    .set(ttl_seconds);
            }
            None => {
                tracing::error!(critical = true, host, "credential has no expiration; skipping time-to-live sample");
            }
        }

        self.entries.lock().insert(host.to_string(), credential);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_on_empty_store_is_anonymous() {
        let store = CredentialStore::new();
        let cred = store.get("s3.us-west-2.amazonaws.com");
        assert!(!cred.provided);
    }

    #[test]
    fn put_then_get_returns_latest() {
        let store = CredentialStore::new();
        let host = "s3.us-west-2.amazonaws.com";
        store.put(host, Credential::new("AKIA1", "secret1", None, None));
        store.put(host, Credential::new("AKIA2", "secret2", None, None));
        let cred = store.get(host);
        assert_eq!(cred.access_key_id, "AKIA2");
    }

    #[test]
    fn put_without_expiration_does_not_panic() {
        let store = CredentialStore::new();
        assert!(store.put("host", Credential::new("id", "secret", None, None)));
    }

    #[test]
    fn ttl_metric_sample_is_within_tolerance() {
        let store = CredentialStore::new();
        let now = gettime_ms();
        store.put(
            "host",
            Credential::new("id", "secret", None, Some(now + 3_600_000)),
        );
        // The gauge sample itself isn't readable back out of the `metrics` facade
        // without installing a recorder; this just exercises the arithmetic path
        // without panicking on a credential that does carry an expiration.
    }
}
