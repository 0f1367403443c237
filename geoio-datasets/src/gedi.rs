//! GEDI resource-path translator (`s3gedi`).

use geoio_aws::{CredentialStore, RangeFetcher, S3Driver};
use geoio_core::{Asset, Error, Result};

const NUM_FIELDS: usize = 10;
const SUBDIRECTORY_LEN: usize = 54;

/// Translates a GEDI granule name into the S3 path suffix this crate's direct driver
/// expects, e.g. `GEDI02_A_2023075201011_..._V002.h5` →
/// `GEDI02_A.002/GEDI02_A_2023075201011_..._V002/GEDI02_A_2023075201011_..._V002.h5`.
pub fn translate(resource: &str) -> Result<String> {
    let tokens: Vec<&str> = resource.split('_').collect();
    if tokens.len() < NUM_FIELDS {
        return Err(Error::invalid_resource(
            resource,
            format!("GEDI resource requires at least {NUM_FIELDS} underscore-delimited fields, found {}", tokens.len()),
        ));
    }

    let product = tokens[0];
    let level = tokens[1];
    let version_tag = tokens[NUM_FIELDS - 1];
    if version_tag.len() < 4 {
        return Err(Error::invalid_resource(
            resource,
            format!("GEDI version tag {version_tag:?} is shorter than expected"),
        ));
    }
    let version = &version_tag[1..4];

    let subdirectory: String = resource.chars().take(SUBDIRECTORY_LEN).collect();

    Ok(format!("{product}_{level}.{version}/{subdirectory}/{resource}"))
}

/// Builds a direct S3 driver for `resource` after translating it into its GEDI path.
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
        let resource = "GEDI02_A_2023075201011_O24115_03_T08796_02_003_02_V002.h5";
        let translated = translate(resource).unwrap();
        assert_eq!(
            translated,
            "GEDI02_A.002/GEDI02_A_2023075201011_O24115_03_T08796_02_003_02_V002/GEDI02_A_2023075201011_O24115_03_T08796_02_003_02_V002.h5"
        );
    }

    #[test]
    fn too_few_fields_is_invalid_resource() {
        assert!(translate("GEDI02_A_only_three").is_err());
    }
}
