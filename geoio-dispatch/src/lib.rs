//! Scheme registry wiring and the scripted-call surface (§6) over the rest of the
//! workspace. This is the crate an embedding or a binary depends on directly; every
//! other crate here is a collaborator it assembles into one `Runtime`.

mod runtime;
mod scripting;

pub use geoio_aws::{Credential, FetchConfig};
pub use runtime::Runtime;
pub use scripting::{csget, csput, s3cache, s3download, s3get, s3read, s3upload};
