//! Shared by ATL24 and Cumulus (§4.7): both lay a resource out under
//! `ATLAS/<product>/<version>/<yyyy>/<mm>/<dd>/<resource>`, differing only in which
//! underscore-delimited field carries the version and how many fields are required.

use geoio_core::Error;

pub fn layout(product: &str, version: &str, date: &str, resource: &str) -> Result<String, Error> {
    if date.len() < 8 {
        return Err(Error::invalid_resource(
            resource,
            format!("date field {date:?} is shorter than the required yyyymmdd"),
        ));
    }
    let yyyy = &date[0..4];
    let mm = &date[4..6];
    let dd = &date[6..8];
    let translated = format!("ATLAS/{product}/{version}/{yyyy}/{mm}/{dd}/{resource}");
    tracing::trace!(resource, translated, "translated dataset resource path");
    Ok(translated)
}
