//! Static region to service URL table

use crate::error::{RegistryError, Result};

const REGION_URLS: &[(&str, &str)] = &[
    ("global", "https://icr.io"),
    ("ap-north", "https://jp.icr.io"),
    ("ap-south", "https://au.icr.io"),
    ("br-sao", "https://br.icr.io"),
    ("ca-mon", "https://ca2.icr.io"),
    ("ca-tor", "https://ca.icr.io"),
    ("eu-central", "https://de.icr.io"),
    ("eu-es", "https://es.icr.io"),
    ("eu-fr2", "https://fr2.icr.io"),
    ("in-che", "https://in.icr.io"),
    ("jp-osa", "https://jp2.icr.io"),
    ("uk-south", "https://uk.icr.io"),
    ("us-south", "https://us.icr.io"),
];

/// Service URL of a region, e.g. `us-south` -> `https://us.icr.io`
pub fn service_url_for_region(region: &str) -> Result<&'static str> {
    REGION_URLS
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, url)| *url)
        .ok_or_else(|| RegistryError::UnknownRegion(region.to_string()))
}

/// Every known region name
pub fn regions() -> impl Iterator<Item = &'static str> {
    REGION_URLS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_regions_resolve() {
        assert_eq!(service_url_for_region("us-south").unwrap(), "https://us.icr.io");
        assert_eq!(service_url_for_region("global").unwrap(), "https://icr.io");
        assert_eq!(service_url_for_region("eu-fr2").unwrap(), "https://fr2.icr.io");
    }

    #[test]
    fn lookup_is_stable() {
        assert_eq!(
            service_url_for_region("ap-north").unwrap(),
            service_url_for_region("ap-north").unwrap()
        );
    }

    #[test]
    fn unknown_region_is_an_error() {
        let err = service_url_for_region("US-SOUTH").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownRegion(ref r) if r == "US-SOUTH"));
        assert!(service_url_for_region("").is_err());
    }

    #[test]
    fn table_has_unique_names() {
        let mut names: Vec<_> = regions().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert!(total >= 13);
    }
}
