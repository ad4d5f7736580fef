//! Capability Catalog Projector
//!
//! Flattens the raw per-SKU catalog into one record per (SKU, location)
//! pair. The projection is stable: SKU order and location order follow the
//! input, nothing is sorted.

use crate::model::{
    ProjectedSkuRecord, RawSkuRecord, SkuCapability, AML_FILESYSTEMS_RESOURCE_TYPE,
};

/// Project a raw catalog, optionally keeping only one region.
///
/// The resource type must match [`AML_FILESYSTEMS_RESOURCE_TYPE`] exactly;
/// the region filter is compared case-insensitively. A blank filter is the
/// same as no filter.
pub fn project_capability_catalog(
    raw_catalog: &[RawSkuRecord],
    region_filter: Option<&str>,
) -> Vec<ProjectedSkuRecord> {
    let region_filter = region_filter.map(str::trim).filter(|r| !r.is_empty());
    let mut projected = Vec::new();

    for record in raw_catalog
        .iter()
        .filter(|r| r.resource_type == AML_FILESYSTEMS_RESOURCE_TYPE)
    {
        let capabilities = copy_capabilities(record);

        for info in record.location_info.iter().flatten() {
            let Some(location) = info.location.as_deref().filter(|l| !l.trim().is_empty()) else {
                continue;
            };

            if let Some(region) = region_filter {
                if !location.eq_ignore_ascii_case(region) {
                    continue;
                }
            }

            let supports_zones = info.zones.as_ref().is_some_and(|z| z.len() > 1);

            projected.push(ProjectedSkuRecord {
                sku_name: record.name.clone(),
                location: location.to_string(),
                supports_zones,
                capabilities: capabilities.clone(),
            });
        }
    }

    projected
}

/// Named capabilities of a record; entries with a blank name are dropped
fn copy_capabilities(record: &RawSkuRecord) -> Vec<SkuCapability> {
    record
        .capabilities
        .iter()
        .filter_map(|c| {
            let name = c.name.as_deref().filter(|n| !n.trim().is_empty())?;
            Some(SkuCapability {
                name: name.to_string(),
                value: c.value.clone().unwrap_or_default(),
            })
        })
        .collect()
}
