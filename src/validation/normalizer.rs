//! Request Normalizer
//!
//! Turns validated field sets into the canonical aggregates handed to the
//! provisioning backend: fills defaults, clears fields made irrelevant by
//! other choices, and resolves zone placement.

use crate::domain::ports::ZoneAvailabilityResolver;
use crate::error::{Error, Result};
use crate::model::{
    ArchiveRequest, FileSystemRef, ProvisioningRequest, RootSquashConfig, SubnetSizeRequest,
    UpdatePatch, ZoneAvailability, SINGLE_ZONE_SENTINEL,
};
use crate::validation::fields::{supplied, ArchiveFields, CreateFields, SubnetFields, UpdateFields};
use crate::validation::{primitives, rules, RequestMode, ValidationPolicy};
use tracing::debug;

// =============================================================================
// Create / Update
// =============================================================================

/// Validate a create request and normalize it into a [`ProvisioningRequest`]
pub async fn validate_and_normalize_create(
    fields: &CreateFields,
    policy: &ValidationPolicy,
    zones: &dyn ZoneAvailabilityResolver,
) -> Result<ProvisioningRequest> {
    let name = primitives::resource_name("name", supplied(&fields.name))?;
    let resource_group = primitives::non_blank("resource-group", supplied(&fields.resource_group))?;
    let location = primitives::non_blank("location", supplied(&fields.location))?;
    let sku = primitives::sku(supplied(&fields.sku))?;
    let size_tib = primitives::positive("size", fields.size)?;
    let subnet_id = primitives::non_blank("subnet-id", supplied(&fields.subnet_id))?;
    let zone = primitives::non_blank("zone", supplied(&fields.zone))?;

    let groups = rules::evaluate(&fields.groups(), RequestMode::Create, policy)?;
    let maintenance_window = groups.maintenance_window.ok_or_else(|| {
        Error::missing_group("maintenance window", ["maintenance-day", "maintenance-time"])
    })?;

    resolve_zone_placement(zones, location, zone).await?;

    Ok(ProvisioningRequest {
        name: name.to_string(),
        resource_group: resource_group.to_string(),
        location: location.to_string(),
        sku,
        size_tib,
        subnet_id: subnet_id.to_string(),
        zone: zone.to_string(),
        maintenance_window,
        hsm: groups.hsm,
        root_squash: normalize_root_squash(groups.root_squash).unwrap_or_default(),
        encryption: groups.encryption,
    })
}

/// Validate an update request and normalize it into an [`UpdatePatch`]
pub fn validate_and_normalize_update(
    fields: &UpdateFields,
    policy: &ValidationPolicy,
) -> Result<UpdatePatch> {
    let target = file_system_ref(&fields.name, &fields.resource_group)?;
    let groups = rules::evaluate(&fields.groups(), RequestMode::Update, policy)?;

    Ok(UpdatePatch {
        name: target.name,
        resource_group: target.resource_group,
        maintenance_window: groups.maintenance_window,
        root_squash: normalize_root_squash(groups.root_squash),
    })
}

/// Clear squash companions when the mode resolves to `None`
fn normalize_root_squash(config: Option<RootSquashConfig>) -> Option<RootSquashConfig> {
    config.map(|c| {
        let normalized = c.clone().normalized();
        if normalized != c {
            debug!("root-squash-mode is None; clearing squash uid/gid and nid list");
        }
        normalized
    })
}

// =============================================================================
// Zone Placement
// =============================================================================

/// Check a requested zone against a region's zone support
pub fn check_zone_placement(availability: &ZoneAvailability, requested_zone: &str) -> Result<()> {
    let unsupported = |reason: String| Error::ZoneUnsupported {
        location: availability.location.clone(),
        zone: requested_zone.to_string(),
        reason,
    };

    if !availability.supports_zones {
        if requested_zone == SINGLE_ZONE_SENTINEL {
            return Ok(());
        }
        return Err(unsupported(format!(
            "region has no availability zones; use zone '{}'",
            SINGLE_ZONE_SENTINEL
        )));
    }

    if availability.zones.is_empty() || availability.zones.iter().any(|z| z == requested_zone) {
        Ok(())
    } else {
        Err(unsupported(format!(
            "offered zones are {}",
            availability.zones.join(", ")
        )))
    }
}

/// Resolve the region's zone support and apply [`check_zone_placement`].
///
/// Resolver failures surface as [`Error::ZoneUnsupported`].
pub async fn resolve_zone_placement(
    zones: &dyn ZoneAvailabilityResolver,
    location: &str,
    requested_zone: &str,
) -> Result<ZoneAvailability> {
    let availability = zones
        .resolve_zone_availability(location)
        .await
        .map_err(|e| Error::ZoneUnsupported {
            location: location.to_string(),
            zone: requested_zone.to_string(),
            reason: e.to_string(),
        })?;

    check_zone_placement(&availability, requested_zone)?;
    Ok(availability)
}

// =============================================================================
// Auxiliary Requests
// =============================================================================

/// Validate a subnet sizing request (SKU and size only)
pub fn validate_subnet_size(fields: &SubnetFields) -> Result<SubnetSizeRequest> {
    Ok(SubnetSizeRequest {
        sku: primitives::sku(supplied(&fields.sku))?,
        size_tib: primitives::positive("size", fields.size)?,
        subnet_id: supplied(&fields.subnet_id).map(str::to_string),
        location: supplied(&fields.location).map(str::to_string),
    })
}

/// Validate a subnet check request; the subnet ID and location are mandatory
pub fn validate_subnet_check(fields: &SubnetFields) -> Result<SubnetSizeRequest> {
    let request = validate_subnet_size(fields)?;
    primitives::non_blank("subnet-id", request.subnet_id.as_deref())?;
    primitives::non_blank("location", request.location.as_deref())?;
    Ok(request)
}

/// Validate the target of an archive status or cancel request
pub fn validate_archive_target(fields: &ArchiveFields) -> Result<FileSystemRef> {
    file_system_ref(&fields.name, &fields.resource_group)
}

/// Validate an archive start request
pub fn validate_archive_start(fields: &ArchiveFields) -> Result<ArchiveRequest> {
    let target = validate_archive_target(fields)?;
    let path = primitives::absolute_path("path", supplied(&fields.path))?;
    Ok(ArchiveRequest {
        target,
        path: path.to_string(),
    })
}

fn file_system_ref(name: &Option<String>, resource_group: &Option<String>) -> Result<FileSystemRef> {
    Ok(FileSystemRef {
        name: primitives::resource_name("name", supplied(name))?.to_string(),
        resource_group: primitives::non_blank("resource-group", supplied(resource_group))?
            .to_string(),
    })
}
