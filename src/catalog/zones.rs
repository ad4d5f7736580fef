//! Zone availability derived from the SKU catalog

use crate::catalog::projector::project_capability_catalog;
use crate::domain::ports::ZoneAvailabilityResolver;
use crate::error::{Error, Result};
use crate::model::{RawSkuRecord, ZoneAvailability, AML_FILESYSTEMS_RESOURCE_TYPE};
use async_trait::async_trait;

/// Zone support of `location` according to a raw catalog.
///
/// Returns `None` when no file-system SKU is offered there. A region
/// supports zones if any SKU supports zones in it; the offered labels are
/// collected in first-seen order.
pub fn zone_availability(catalog: &[RawSkuRecord], location: &str) -> Option<ZoneAvailability> {
    let projected = project_capability_catalog(catalog, Some(location));
    let first = projected.first()?;

    let mut zones: Vec<String> = Vec::new();
    let entries = catalog
        .iter()
        .filter(|r| r.resource_type == AML_FILESYSTEMS_RESOURCE_TYPE)
        .flat_map(|r| r.location_info.iter().flatten())
        .filter(|info| {
            info.location
                .as_deref()
                .is_some_and(|l| l.eq_ignore_ascii_case(location.trim()))
        });
    for zone in entries.flat_map(|info| info.zones.iter().flatten()) {
        if !zones.contains(zone) {
            zones.push(zone.clone());
        }
    }

    Some(ZoneAvailability {
        location: first.location.clone(),
        supports_zones: projected.iter().any(|r| r.supports_zones),
        zones,
    })
}

/// [`ZoneAvailabilityResolver`] backed by a fixed catalog snapshot
#[derive(Debug, Clone, Default)]
pub struct CatalogZoneResolver {
    catalog: Vec<RawSkuRecord>,
}

impl CatalogZoneResolver {
    pub fn new(catalog: Vec<RawSkuRecord>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ZoneAvailabilityResolver for CatalogZoneResolver {
    async fn resolve_zone_availability(&self, location: &str) -> Result<ZoneAvailability> {
        zone_availability(&self.catalog, location).ok_or_else(|| Error::ResourceNotFound {
            kind: "Location".into(),
            name: location.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawLocationInfo;

    fn record(resource_type: &str, name: &str, location: &str, zones: &[&str]) -> RawSkuRecord {
        RawSkuRecord {
            resource_type: resource_type.into(),
            name: name.into(),
            capabilities: vec![],
            location_info: Some(vec![RawLocationInfo {
                location: Some(location.into()),
                zones: Some(zones.iter().map(|z| z.to_string()).collect()),
            }]),
        }
    }

    fn catalog() -> Vec<RawSkuRecord> {
        vec![
            record("amlFilesystems", "AMLFS-Durable-Premium-40", "eastus", &["1"]),
            record("amlFilesystems", "AMLFS-Durable-Premium-125", "eastus", &["2", "1", "3"]),
            record("amlFilesystems", "AMLFS-Durable-Premium-40", "uaenorth", &[]),
            record("caches", "Standard_2G", "swedencentral", &["1", "2"]),
        ]
    }

    #[test]
    fn test_zone_availability_merges_skus() {
        let availability = zone_availability(&catalog(), "EASTUS").unwrap();
        assert_eq!(availability.location, "eastus");
        assert!(availability.supports_zones);
        assert_eq!(availability.zones, vec!["1", "2", "3"]);

        let single = zone_availability(&catalog(), "uaenorth").unwrap();
        assert!(!single.supports_zones);
        assert!(single.zones.is_empty());
    }

    #[test]
    fn test_unknown_and_foreign_locations() {
        assert!(zone_availability(&catalog(), "westus").is_none());
        // Only offered for another resource type.
        assert!(zone_availability(&catalog(), "swedencentral").is_none());
    }

    #[tokio::test]
    async fn test_resolver_reports_not_found() {
        let resolver = CatalogZoneResolver::new(catalog());
        assert!(resolver.resolve_zone_availability("uaenorth").await.is_ok());

        let err = resolver.resolve_zone_availability("westus").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }
}
