//! Resource-path translators (C7): dataset-specific drivers that rewrite a logical
//! resource name into an S3 path before delegating to the direct S3 driver.

mod atlas_layout;
pub mod atl24;
pub mod cumulus;
pub mod gedi;
