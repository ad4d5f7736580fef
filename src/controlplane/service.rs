//! Lustre Service - use-case entry points
//!
//! Every operation validates and normalizes its input first; the backend is
//! only called with requests that passed. Collaborator errors are passed
//! through unchanged, except catalog fetch failures which are wrapped in
//! [`Error::CatalogFetchFailed`].

use crate::catalog::project_capability_catalog;
use crate::controlplane::backends::InMemoryLustreBackend;
use crate::controlplane::metrics::ServiceMetrics;
use crate::domain::ports::{
    FileSystemProvisionerRef, SkuCatalogSourceRef, ZoneAvailabilityResolverRef,
};
use crate::error::{Error, Result};
use crate::model::{LustreFileSystem, ProjectedSkuRecord};
use crate::validation::{
    validate_and_normalize_create, validate_and_normalize_update, validate_archive_start,
    validate_archive_target, validate_subnet_check, validate_subnet_size, ArchiveFields,
    CreateFields, SubnetFields, UpdateFields, ValidationPolicy,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

// =============================================================================
// Service Configuration
// =============================================================================

/// Configuration for the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Validation settings passed to every engine call
    pub policy: ValidationPolicy,
    /// Subscription all operations run against
    pub default_subscription: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            policy: ValidationPolicy::default(),
            default_subscription: crate::controlplane::DEFAULT_SUBSCRIPTION.to_string(),
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Composes validation, normalization and projection with the collaborators
pub struct LustreService {
    config: ServiceConfig,
    zones: ZoneAvailabilityResolverRef,
    catalog: SkuCatalogSourceRef,
    provisioner: FileSystemProvisionerRef,
    metrics: ServiceMetrics,
}

impl LustreService {
    /// Create a new service
    pub fn new(
        config: ServiceConfig,
        zones: ZoneAvailabilityResolverRef,
        catalog: SkuCatalogSourceRef,
        provisioner: FileSystemProvisionerRef,
    ) -> Result<Arc<Self>> {
        info!(
            "Lustre service using backend '{}' for subscription {}",
            provisioner.backend_name(),
            config.default_subscription
        );

        Ok(Arc::new(Self {
            config,
            zones,
            catalog,
            provisioner,
            metrics: ServiceMetrics::new()?,
        }))
    }

    /// Create a service whose collaborators are all one in-memory backend
    pub fn with_in_memory_backend(
        config: ServiceConfig,
        backend: Arc<InMemoryLustreBackend>,
    ) -> Result<Arc<Self>> {
        Self::new(config, backend.clone(), backend.clone(), backend)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    fn subscription(&self) -> &str {
        &self.config.default_subscription
    }

    /// Record the outcome of an operation
    fn observe<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        self.metrics.record_request(operation);
        if let Err(e) = &result {
            self.metrics.record_failure(e);
            if e.is_validation() {
                warn!("{} rejected: {}", operation, e);
            } else {
                error!("{} failed: {}", operation, e);
            }
        }
        result
    }

    // =========================================================================
    // File System Lifecycle
    // =========================================================================

    /// Validate, normalize and submit a create request
    pub async fn create_file_system(&self, fields: &CreateFields) -> Result<LustreFileSystem> {
        let result = async {
            let request =
                validate_and_normalize_create(fields, &self.config.policy, self.zones.as_ref())
                    .await?;
            info!(
                "Creating file system {}/{} in {}",
                request.resource_group(),
                request.name(),
                request.location()
            );
            self.provisioner
                .submit_provisioning_request(self.subscription(), request)
                .await
        }
        .await;
        self.observe("create", result)
    }

    /// Validate, normalize and submit an update patch
    pub async fn update_file_system(&self, fields: &UpdateFields) -> Result<LustreFileSystem> {
        let result = async {
            let patch = validate_and_normalize_update(fields, &self.config.policy)?;
            info!(
                "Updating file system {}/{}",
                patch.resource_group(),
                patch.name()
            );
            self.provisioner
                .submit_update_patch(self.subscription(), patch)
                .await
        }
        .await;
        self.observe("update", result)
    }

    /// List file systems, optionally within one resource group
    pub async fn list_file_systems(
        &self,
        resource_group: Option<&str>,
    ) -> Result<Vec<LustreFileSystem>> {
        let resource_group = resource_group.map(str::trim).filter(|rg| !rg.is_empty());
        let result = self
            .provisioner
            .list_file_systems(self.subscription(), resource_group)
            .await;
        self.observe("list", result)
    }

    // =========================================================================
    // SKU Catalog
    // =========================================================================

    /// Fetch the raw catalog and project it, optionally for one region
    pub async fn sku_info(&self, region: Option<&str>) -> Result<Vec<ProjectedSkuRecord>> {
        let result = async {
            let raw = self
                .catalog
                .fetch_raw_sku_catalog(self.subscription())
                .await
                .map_err(|e| Error::CatalogFetchFailed(Box::new(e)))?;
            let projected = project_capability_catalog(&raw, region);
            debug!(
                "Projected {} of {} SKU records",
                projected.len(),
                raw.len()
            );
            self.metrics.record_projected(projected.len());
            Ok(projected)
        }
        .await;
        self.observe("sku_info", result)
    }

    // =========================================================================
    // Subnets
    // =========================================================================

    /// Number of IP addresses a file system of the given SKU and size needs
    pub async fn required_subnet_size(&self, fields: &SubnetFields) -> Result<u32> {
        let result = async {
            let request = validate_subnet_size(fields)?;
            self.provisioner
                .required_subnet_size(self.subscription(), request.sku, request.size_tib)
                .await
        }
        .await;
        self.observe("subnet_size", result)
    }

    /// Check whether a subnet can host a file system of the given SKU and size
    pub async fn check_subnet(&self, fields: &SubnetFields) -> Result<bool> {
        let result = async {
            let request = validate_subnet_check(fields)?;
            self.provisioner
                .check_subnet(self.subscription(), &request)
                .await
        }
        .await;
        self.observe("subnet_check", result)
    }

    // =========================================================================
    // Archive Jobs
    // =========================================================================

    /// Start archiving a path of a file system to its HSM container
    pub async fn start_archive(&self, fields: &ArchiveFields) -> Result<()> {
        let result = async {
            let request = validate_archive_start(fields)?;
            self.provisioner
                .start_archive(self.subscription(), &request)
                .await
        }
        .await;
        self.observe("archive_start", result)
    }

    /// Status of the most recent archive job
    pub async fn archive_status(&self, fields: &ArchiveFields) -> Result<Option<String>> {
        let result = async {
            let target = validate_archive_target(fields)?;
            self.provisioner
                .archive_status(self.subscription(), &target)
                .await
        }
        .await;
        self.observe("archive_status", result)
    }

    /// Cancel the running archive job
    pub async fn cancel_archive(&self, fields: &ArchiveFields) -> Result<()> {
        let result = async {
            let target = validate_archive_target(fields)?;
            self.provisioner
                .cancel_archive(self.subscription(), &target)
                .await
        }
        .await;
        self.observe("archive_cancel", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FileSystemProvisioner, SkuCatalogSource};
    use crate::error::ErrorKind;
    use crate::model::RawSkuRecord;
    use assert_matches::assert_matches;
    use async_trait::async_trait;

    struct FailingCatalog;

    #[async_trait]
    impl SkuCatalogSource for FailingCatalog {
        async fn fetch_raw_sku_catalog(&self, _subscription: &str) -> Result<Vec<RawSkuRecord>> {
            Err(Error::BackendOperationFailed {
                backend: "arm".into(),
                operation: "list_skus".into(),
                reason: "throttled".into(),
            })
        }
    }

    fn service() -> (Arc<LustreService>, Arc<InMemoryLustreBackend>) {
        let backend = Arc::new(InMemoryLustreBackend::default());
        let service =
            LustreService::with_in_memory_backend(ServiceConfig::default(), backend.clone())
                .unwrap();
        (service, backend)
    }

    fn create_fields() -> CreateFields {
        CreateFields {
            name: Some("fs1".into()),
            resource_group: Some("rg1".into()),
            location: Some("uaenorth".into()),
            sku: Some("AMLFS-Durable-Premium-250".into()),
            size: Some(8),
            subnet_id: Some("subnet-a".into()),
            zone: Some("1".into()),
            maintenance_day: Some("Saturday".into()),
            maintenance_time: Some("03:00".into()),
            hsm_container: Some("data".into()),
            hsm_log_container: Some("logs".into()),
            ..Default::default()
        }
    }

    fn archive_fields(path: Option<&str>) -> ArchiveFields {
        ArchiveFields {
            name: Some("fs1".into()),
            resource_group: Some("rg1".into()),
            path: path.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let (service, _) = service();
        let created = service.create_file_system(&create_fields()).await.unwrap();
        assert_eq!(created.name, "fs1");
        assert_eq!(created.hsm_container.as_deref(), Some("data"));

        let listed = service.list_file_systems(Some("  ")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(service.metrics().requests("create"), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_backend() {
        let (service, backend) = service();
        let mut fields = create_fields();
        fields.maintenance_time = None;

        assert_matches!(
            service.create_file_system(&fields).await,
            Err(Error::MissingRequiredGroup { .. })
        );
        let listed = backend
            .list_file_systems(crate::controlplane::DEFAULT_SUBSCRIPTION, None)
            .await
            .unwrap();
        assert!(listed.is_empty());
        assert_eq!(
            service.metrics().validation_failures("missing_required_group"),
            1
        );
    }

    #[tokio::test]
    async fn test_zone_rejected_in_single_zone_region() {
        let (service, _) = service();
        let mut fields = create_fields();
        fields.zone = Some("2".into());

        let err = service.create_file_system(&fields).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ZoneUnsupported);

        fields.location = Some("atlantis".into());
        fields.zone = Some("1".into());
        let err = service.create_file_system(&fields).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ZoneUnsupported);
    }

    #[tokio::test]
    async fn test_update_requires_some_group() {
        let (service, _) = service();
        service.create_file_system(&create_fields()).await.unwrap();

        let empty = UpdateFields {
            name: Some("fs1".into()),
            resource_group: Some("rg1".into()),
            ..Default::default()
        };
        assert_matches!(
            service.update_file_system(&empty).await,
            Err(Error::EmptyUpdatePatch)
        );

        let patch = UpdateFields {
            maintenance_day: Some("sunday".into()),
            maintenance_time: Some("23:30".into()),
            ..empty
        };
        let updated = service.update_file_system(&patch).await.unwrap();
        assert_eq!(updated.maintenance_day.as_deref(), Some("Sunday"));
        assert_eq!(updated.maintenance_time.as_deref(), Some("23:30"));
    }

    #[tokio::test]
    async fn test_sku_info_projects_catalog() {
        let (service, _) = service();
        let all = service.sku_info(None).await.unwrap();
        let east = service.sku_info(Some("EASTUS")).await.unwrap();

        assert!(all.len() > east.len());
        assert_eq!(east.len(), 4);
        assert!(east.iter().all(|r| r.supports_zones));
        assert_eq!(service.metrics().skus_projected(), (all.len() + 4) as u64);
    }

    #[tokio::test]
    async fn test_sku_info_wraps_fetch_failure() {
        let backend = Arc::new(InMemoryLustreBackend::default());
        let service = LustreService::new(
            ServiceConfig::default(),
            backend.clone(),
            Arc::new(FailingCatalog),
            backend,
        )
        .unwrap();

        let err = service.sku_info(Some("eastus")).await.unwrap_err();
        assert_matches!(
            &err,
            Error::CatalogFetchFailed(inner) if matches!(**inner, Error::BackendOperationFailed { .. })
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_subnet_operations() {
        let (service, _) = service();
        let fields = SubnetFields {
            sku: Some("AMLFS-Durable-Premium-500".into()),
            size: Some(8),
            subnet_id: None,
            location: None,
        };
        assert_eq!(service.required_subnet_size(&fields).await.unwrap(), 12);
        assert_matches!(
            service.check_subnet(&fields).await,
            Err(Error::InvalidField { field, .. }) if field == "subnet-id"
        );

        let without_location = SubnetFields {
            subnet_id: Some("subnet-a".into()),
            ..fields
        };
        assert_matches!(
            service.check_subnet(&without_location).await,
            Err(Error::InvalidField { field, .. }) if field == "location"
        );

        let with_subnet = SubnetFields {
            location: Some("eastus".into()),
            ..without_location
        };
        assert!(service.check_subnet(&with_subnet).await.unwrap());

        let unoffered = SubnetFields {
            location: Some("antarctica".into()),
            ..with_subnet.clone()
        };
        assert!(!service.check_subnet(&unoffered).await.unwrap());

        let bad_sku = SubnetFields {
            sku: Some("AMLFS-Durable-Premium-1000".into()),
            ..with_subnet
        };
        assert_matches!(
            service.required_subnet_size(&bad_sku).await,
            Err(Error::InvalidField { field, .. }) if field == "sku"
        );
    }

    #[tokio::test]
    async fn test_subnet_size_beyond_addressable_range() {
        let (service, _) = service();
        let fields = SubnetFields {
            sku: Some("AMLFS-Durable-Premium-500".into()),
            size: Some(u32::MAX as i64),
            subnet_id: None,
            location: None,
        };

        let err = service.required_subnet_size(&fields).await.unwrap_err();
        assert_matches!(err, Error::BackendOperationFailed { ref operation, .. } if operation == "required_subnet_size");
        assert_eq!(err.kind(), ErrorKind::Backend);
    }

    #[tokio::test]
    async fn test_archive_lifecycle() {
        let (service, _) = service();
        service.create_file_system(&create_fields()).await.unwrap();

        assert_matches!(
            service.start_archive(&archive_fields(Some("relative"))).await,
            Err(Error::InvalidField { field, .. }) if field == "path"
        );

        service.start_archive(&archive_fields(Some("/"))).await.unwrap();
        assert_eq!(
            service.archive_status(&archive_fields(None)).await.unwrap().as_deref(),
            Some("InProgress: /")
        );
        service.cancel_archive(&archive_fields(None)).await.unwrap();
        assert_eq!(
            service.archive_status(&archive_fields(None)).await.unwrap().as_deref(),
            Some("Cancelled: /")
        );
    }
}
