//! ATL24 resource-path translator (`s3atl24`).

use geoio_aws::{CredentialStore, RangeFetcher, S3Driver};
use geoio_core::{Asset, Error, Result};

use crate::atlas_layout::layout;

const NUM_FIELDS: usize = 7;
const VERSION_FIELD: usize = 3;

/// Translates an ATL24 granule name, e.g. `ATL24_20241107234251_08052501_006_01_001_01.h5`
/// → `ATLAS/ATL24/006/2024/11/07/ATL24_20241107234251_08052501_006_01_001_01.h5`.
pub fn translate(resource: &str) -> Result<String> {
    let tokens: Vec<&str> = resource.split('_').collect();
    if tokens.len() < NUM_FIELDS {
        return Err(Error::invalid_resource(
            resource,
            format!("ATL24 resource requires at least {NUM_FIELDS} underscore-delimited fields, found {}", tokens.len()),
        ));
    }

    let product = tokens[0];
    let date = tokens[1];
    let version = tokens[VERSION_FIELD];

    layout(product, version, date, resource)
}

/// Builds a direct S3 driver for `resource` after translating it into its ATL24 path.
pub fn open(
    asset: &dyn Asset,
    resource: &str,
    credentials: &CredentialStore,
    fetcher: std::sync::Arc<RangeFetcher>,
) -> Result<S3Driver> {
    let translated = translate(resource)?;
    S3Driver::new(asset, &translated, credentials, fetcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_worked_example() {
        let resource = "ATL24_20241107234251_08052501_006_01_001_01.h5";
        let translated = translate(resource).unwrap();
        assert_eq!(
            translated,
            "ATLAS/ATL24/006/2024/11/07/ATL24_20241107234251_08052501_006_01_001_01.h5"
        );
    }

    #[test]
    fn too_few_fields_is_invalid_resource() {
        assert!(translate("ATL24_only_two").is_err());
    }
}
