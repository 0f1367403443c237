//! Cumulus resource-path translator (`cumulus`). Shares ATL24's `ATLAS/<product>/…`
//! layout but differs in field count and the position of the version field.

use geoio_aws::{CredentialStore, RangeFetcher, S3Driver};
use geoio_core::{Asset, Error, Result};

use crate::atlas_layout::layout;

const NUM_FIELDS: usize = 5;
const VERSION_FIELD: usize = 3;

/// Translates a cumulus granule name, e.g. `ATL06_20190626143632_13640310_005_01.h5`
/// → `ATLAS/ATL06/005/2019/06/26/ATL06_20190626143632_13640310_005_01.h5`.
pub fn translate(resource: &str) -> Result<String> {
    let tokens: Vec<&str> = resource.split('_').collect();
    if tokens.len() < NUM_FIELDS {
        return Err(Error::invalid_resource(
            resource,
            format!("cumulus resource requires at least {NUM_FIELDS} underscore-delimited fields, found {}", tokens.len()),
        ));
    }

    let product = tokens[0];
    let date = tokens[1];
    let version = tokens[VERSION_FIELD];

    layout(product, version, date, resource)
}

/// Builds a direct S3 driver for `resource` after translating it into its cumulus path.
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
        let resource = "ATL06_20190626143632_13640310_005_01.h5";
        let translated = translate(resource).unwrap();
        assert_eq!(
            translated,
            "ATLAS/ATL06/005/2019/06/26/ATL06_20190626143632_13640310_005_01.h5"
        );
    }

    #[test]
    fn too_few_fields_is_invalid_resource() {
        assert!(translate("ATL06_only").is_err());
    }
}
