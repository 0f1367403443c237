//! Credential store (C1), SigV2 request signer (C2), HTTP range fetcher (C3), and the
//! direct S3 driver (C5).

mod credential;
mod driver;
mod fetch;
mod signer;

pub use credential::{Credential, CredentialStore};
pub use driver::S3Driver;
pub use fetch::{FetchConfig, RangeFetcher};
pub use signer::{sign_get, sign_put, SignedHeaders};

/// Default region used when a caller omits one (§6).
pub const DEFAULT_REGION: &str = "us-west-2";

/// Default asset name used when a caller omits one (§6).
pub const DEFAULT_ASSET_NAME: &str = "iam-role";
