//! The HTTP range fetcher (§4.3): one signed GET per call, retried per policy, into
//! one of three sinks (fixed buffer, growable buffer, file).

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use geoio_core::time::format_amz_date;
use geoio_core::Error;

use crate::credential::Credential;
use crate::signer::{sign_get, sign_put};

/// Tunable timeouts and retry budget for the fetcher. Defaults match §6's table.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
    pub low_speed_limit_bytes_per_sec: u64,
    pub low_speed_time: Duration,
    pub attempts_per_request: u32,
    pub tls_verify: bool,
    pub retry_backoff: Duration,
    /// Test seam: overrides `https://s3.<region>.amazonaws.com` with a fixed base URL.
    /// Never set outside of tests.
    pub base_url_override: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            total_timeout: Duration::from_secs(600),
            low_speed_limit_bytes_per_sec: 32 * 1024,
            low_speed_time: Duration::from_secs(5),
            attempts_per_request: 3,
            tls_verify: false,
            retry_backoff: Duration::from_millis(250),
            base_url_override: None,
        }
    }
}

/// An error encountered partway through a sink, carrying how much it had already
/// written. A nonzero count here means the caller treats the request as fatally
/// failed rather than retrying — a partial response is considered unrecoverable (§9).
struct PartialIoError {
    bytes_so_far: u64,
    source: std::io::Error,
}

enum AttemptOutcome<T> {
    Success(T),
    Retryable,
    Fatal(Error),
}

/// Performs signed range GETs against `https://s3.<region>.amazonaws.com/<bucket>/<key>`.
pub struct RangeFetcher {
    client: reqwest::blocking::Client,
    config: FetchConfig,
}

impl RangeFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .danger_accept_invalid_certs(!config.tls_verify)
            .danger_accept_invalid_hostnames(!config.tls_verify)
            .build()
            .map_err(|e| Error::SigningError(format!("failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }

    fn url(&self, region: &str, bucket: &str, key: &str) -> String {
        let key = key.strip_prefix('/').unwrap_or(key);
        match &self.config.base_url_override {
            Some(base) => format!("{base}/{bucket}/{key}"),
            None => format!("https://s3.{region}.amazonaws.com/{bucket}/{key}"),
        }
    }

    /// Fixed-buffer GET. Requests `Range: bytes=<offset>-<offset+buf.len()-1>` and
    /// copies up to `buf.len()` bytes into `buf`. Returns the number of bytes copied.
    pub fn get_fixed(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
        credential: &Credential,
        buf: &mut [u8],
        offset: u64,
    ) -> Result<usize, Error> {
        let size = buf.len() as u64;
        let end = offset + size.saturating_sub(1);
        let range = format!("bytes={offset}-{end}");
        let n = self.fetch_with_retry(region, bucket, key, credential, Some(range), |response| {
            copy_into_buf(response, buf)
        })?;
        Ok(n as usize)
    }

    /// Streaming GET. Buffer size is not known ahead of time; the whole object is
    /// downloaded. A trailing NUL is appended to the returned buffer for compatibility
    /// with embeddings that expect a NUL-terminated body — `len()` is still the real
    /// payload length and does not include it.
    pub fn get_streaming(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
        credential: &Credential,
    ) -> Result<Vec<u8>, Error> {
        let mut body = self.fetch_with_retry(region, bucket, key, credential, None, copy_into_vec)?;
        body.push(0);
        Ok(body)
    }

    /// File GET. Downloads the whole object straight into a newly created file at
    /// `destination`, returning the number of bytes written.
    pub fn get_file(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
        credential: &Credential,
        destination: &Path,
    ) -> Result<u64, Error> {
        self.fetch_with_retry(region, bucket, key, credential, None, |response| {
            let mut file = File::create(destination).map_err(|source| PartialIoError {
                bytes_so_far: 0,
                source,
            })?;
            copy_into_file(response, &mut file)
        })
    }

    /// Uploads the whole contents of `source` to `bucket`/`key` in a single PUT,
    /// signed with the SigV2 PUT string-to-sign (§4.2). Not retried: a PUT that fails
    /// partway through has already mutated remote state, so resending it blind is not
    /// this layer's call to make.
    pub fn put_file(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
        credential: &Credential,
        source: &Path,
    ) -> Result<u64, Error> {
        let body = std::fs::read(source)?;
        let content_length = body.len() as u64;
        let url = self.url(region, bucket, key);
        let date = format_amz_date(Utc::now());
        let headers = sign_put(bucket, key, content_length, credential, &date);

        let mut request = self.client.put(&url).body(body);
        request = headers.apply(request);
        request = request.header("Content-Length", content_length.to_string());

        let response = request.send().map_err(|e| Error::TransferFailed {
            bucket: bucket.to_string(),
            key: key.to_string(),
            attempts: 1,
            reason: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(Error::HttpStatusError {
                bucket: bucket.to_string(),
                key: key.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(content_length)
    }

    #[tracing::instrument(skip(self, credential, sink))]
    fn fetch_with_retry<T>(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
        credential: &Credential,
        range: Option<String>,
        mut sink: impl FnMut(&mut reqwest::blocking::Response) -> Result<T, PartialIoError>,
    ) -> Result<T, Error> {
        let url = self.url(region, bucket, key);

        for attempt in 1..=self.config.attempts_per_request {
            let date = format_amz_date(Utc::now());
            let headers = sign_get(bucket, key, credential, &date);

            let mut request = self.client.get(&url);
            request = headers.apply(request);
            if let Some(range) = &range {
                request = request.header("Range", range);
            }

            match self.perform(request, bucket, key, &mut sink) {
                AttemptOutcome::Success(value) => return Ok(value),
                AttemptOutcome::Fatal(err) => return Err(err),
                AttemptOutcome::Retryable => {
                    tracing::debug!(bucket, key, attempt, "range fetch attempt failed, retrying");
                    if attempt < self.config.attempts_per_request {
                        std::thread::sleep(self.config.retry_backoff);
                    }
                }
            }
        }

        Err(Error::TransferFailed {
            bucket: bucket.to_string(),
            key: key.to_string(),
            attempts: self.config.attempts_per_request,
            reason: "exhausted retry budget".to_string(),
        })
    }

    fn perform<T>(
        &self,
        request: reqwest::blocking::RequestBuilder,
        bucket: &str,
        key: &str,
        sink: &mut impl FnMut(&mut reqwest::blocking::Response) -> Result<T, PartialIoError>,
    ) -> AttemptOutcome<T> {
        let mut response = match request.send() {
            Ok(response) => response,
            Err(_) => {
                // Connection never established or the request failed before any
                // bytes of a body arrived: zero bytes received, safe to retry.
                return AttemptOutcome::Retryable;
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let mut body = String::new();
            let _ = response.read_to_string(&mut body);
            tracing::error!(
                critical = true,
                bucket,
                key,
                status,
                body = %sanitize(&body),
                "http status error on range fetch; attempt will be retried"
            );
            return AttemptOutcome::Retryable;
        }

        match sink(&mut response) {
            Ok(value) => AttemptOutcome::Success(value),
            Err(partial) if partial.bytes_so_far > 0 => AttemptOutcome::Fatal(Error::TransferFailed {
                bucket: bucket.to_string(),
                key: key.to_string(),
                attempts: 1,
                reason: format!("partial response lost after {} bytes: {}", partial.bytes_so_far, partial.source),
            }),
            Err(_zero_bytes) => AttemptOutcome::Retryable,
        }
    }
}

fn copy_into_buf(response: &mut reqwest::blocking::Response, buf: &mut [u8]) -> Result<u64, PartialIoError> {
    let mut written = 0usize;
    while written < buf.len() {
        match response.read(&mut buf[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(source) => {
                return Err(PartialIoError {
                    bytes_so_far: written as u64,
                    source,
                })
            }
        }
    }
    Ok(written as u64)
}

fn copy_into_vec(response: &mut reqwest::blocking::Response) -> Result<Vec<u8>, PartialIoError> {
    let mut data = Vec::new();
    let mut chunk = [0u8; 64 * 1024];
    loop {
        match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => data.extend_from_slice(&chunk[..n]),
            Err(source) => {
                return Err(PartialIoError {
                    bytes_so_far: data.len() as u64,
                    source,
                })
            }
        }
    }
    Ok(data)
}

fn copy_into_file(response: &mut reqwest::blocking::Response, file: &mut File) -> Result<u64, PartialIoError> {
    let mut total = 0u64;
    let mut chunk = [0u8; 64 * 1024];
    loop {
        match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if let Err(source) = file.write_all(&chunk[..n]) {
                    return Err(PartialIoError {
                        bytes_so_far: total,
                        source,
                    });
                }
                total += n as u64;
            }
            Err(source) => {
                return Err(PartialIoError {
                    bytes_so_far: total,
                    source,
                })
            }
        }
    }
    Ok(total)
}

/// Strips control characters from a logged response body so a hostile or broken
/// upstream can't smuggle escape sequences into the log stream.
fn sanitize(body: &str) -> String {
    body.chars().filter(|c| !c.is_control() || *c == '\n').take(2048).collect()
}
