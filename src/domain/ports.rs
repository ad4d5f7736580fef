//! Domain Ports - Collaborator trait definitions
//!
//! These traits define the boundaries between the validation core and the
//! managed-service control plane. Adapters implement these traits to provide
//! concrete functionality; transport, authentication and retry policy live
//! entirely behind them.

use crate::error::Result;
use crate::model::{
    ArchiveRequest, FileSystemRef, LustreFileSystem, ProvisioningRequest, RawSkuRecord, Sku,
    SubnetSizeRequest, UpdatePatch, ZoneAvailability,
};
use async_trait::async_trait;
use std::sync::Arc;

// =============================================================================
// Zone Availability Port
// =============================================================================

/// Port for resolving a region's availability-zone support
#[async_trait]
pub trait ZoneAvailabilityResolver: Send + Sync {
    /// Resolve zone support for a location; unknown locations are an error
    async fn resolve_zone_availability(&self, location: &str) -> Result<ZoneAvailability>;
}

// =============================================================================
// SKU Catalog Port
// =============================================================================

/// Port for fetching the raw per-SKU capability catalog
#[async_trait]
pub trait SkuCatalogSource: Send + Sync {
    /// Fetch every SKU record visible to the subscription
    async fn fetch_raw_sku_catalog(&self, subscription: &str) -> Result<Vec<RawSkuRecord>>;
}

// =============================================================================
// File System Provisioner Port
// =============================================================================

/// Port for file-system lifecycle operations.
///
/// Only called with requests that already passed validation.
#[async_trait]
pub trait FileSystemProvisioner: Send + Sync {
    /// Create a file system
    async fn submit_provisioning_request(
        &self,
        subscription: &str,
        request: ProvisioningRequest,
    ) -> Result<LustreFileSystem>;

    /// Patch maintenance window and/or root squash of an existing file system
    async fn submit_update_patch(
        &self,
        subscription: &str,
        patch: UpdatePatch,
    ) -> Result<LustreFileSystem>;

    /// List file systems, optionally limited to one resource group
    async fn list_file_systems(
        &self,
        subscription: &str,
        resource_group: Option<&str>,
    ) -> Result<Vec<LustreFileSystem>>;

    /// Number of IP addresses a file system of this SKU and size needs
    async fn required_subnet_size(&self, subscription: &str, sku: Sku, size_tib: u32) -> Result<u32>;

    /// Check whether a subnet can host a file system of this SKU and size
    async fn check_subnet(&self, subscription: &str, request: &SubnetSizeRequest) -> Result<bool>;

    /// Start archiving a path to the HSM container
    async fn start_archive(&self, subscription: &str, request: &ArchiveRequest) -> Result<()>;

    /// Status of the most recent archive job, if any
    async fn archive_status(&self, subscription: &str, target: &FileSystemRef)
        -> Result<Option<String>>;

    /// Cancel the running archive job
    async fn cancel_archive(&self, subscription: &str, target: &FileSystemRef) -> Result<()>;

    /// Get backend name
    fn backend_name(&self) -> &str;
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type ZoneAvailabilityResolverRef = Arc<dyn ZoneAvailabilityResolver>;
pub type SkuCatalogSourceRef = Arc<dyn SkuCatalogSource>;
pub type FileSystemProvisionerRef = Arc<dyn FileSystemProvisioner>;
