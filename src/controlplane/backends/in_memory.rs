//! In-Memory Lustre Backend
//!
//! Serves every collaborator port from process memory: a fixed SKU catalog,
//! file systems keyed by resource group and name, and one archive job per
//! file system. Used by the binary when no cloud control plane is wired in,
//! and by tests.

use crate::catalog::{project_capability_catalog, zone_availability};
use crate::domain::ports::{FileSystemProvisioner, SkuCatalogSource, ZoneAvailabilityResolver};
use crate::error::{Error, Result};
use crate::model::{
    round_capacity_tib, ArchiveRequest, FileSystemRef, LustreFileSystem, ProvisioningRequest,
    RawLocationInfo, RawSkuCapability, RawSkuRecord, RootSquashConfig, Sku, SubnetSizeRequest,
    UpdatePatch, ZoneAvailability, AML_FILESYSTEMS_RESOURCE_TYPE,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const BACKEND_NAME: &str = "in-memory";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the in-memory backend
#[derive(Debug, Clone)]
pub struct InMemoryBackendConfig {
    /// The only subscription this backend answers for
    pub subscription: String,
    /// Raw SKU catalog served to callers
    pub catalog: Vec<RawSkuRecord>,
    /// Fixed IP overhead of every file system
    pub base_ips: u32,
    /// IPs per capacity block (one SKU size increment)
    pub ips_per_block: u32,
    /// Free IPs per known subnet ID
    pub subnet_capacity: BTreeMap<String, u32>,
    /// Free IPs assumed for subnets not listed above (a /24)
    pub default_subnet_ips: u32,
}

impl Default for InMemoryBackendConfig {
    fn default() -> Self {
        Self {
            subscription: crate::controlplane::DEFAULT_SUBSCRIPTION.to_string(),
            catalog: builtin_catalog(),
            base_ips: 4,
            ips_per_block: 4,
            subnet_capacity: BTreeMap::new(),
            default_subnet_ips: 251,
        }
    }
}

/// Catalog snapshot used when no catalog file is configured
pub fn builtin_catalog() -> Vec<RawSkuRecord> {
    let regions: [(&str, &[&str]); 4] = [
        ("eastus", &["1", "2", "3"]),
        ("westeurope", &["1", "2", "3"]),
        ("australiaeast", &["1"]),
        ("uaenorth", &[]),
    ];

    Sku::ALL
        .iter()
        .map(|sku| RawSkuRecord {
            resource_type: AML_FILESYSTEMS_RESOURCE_TYPE.to_string(),
            name: sku.as_str().to_string(),
            capabilities: vec![
                capability("bandwidth", &sku.throughput_mbps_per_tib().to_string()),
                capability("durable", "True"),
                capability("storage increment", &sku.size_increment_tib().to_string()),
            ],
            location_info: Some(
                regions
                    .iter()
                    .map(|(location, zones)| RawLocationInfo {
                        location: Some(location.to_string()),
                        zones: Some(zones.iter().map(|z| z.to_string()).collect()),
                    })
                    .collect(),
            ),
        })
        .collect()
}

fn capability(name: &str, value: &str) -> RawSkuCapability {
    RawSkuCapability {
        name: Some(name.to_string()),
        value: Some(value.to_string()),
    }
}

// =============================================================================
// File System State
// =============================================================================

/// Archive job lifecycle: Idle -> InProgress -> Completed | Cancelled
#[derive(Debug, Clone, PartialEq, Eq)]
enum ArchiveState {
    Idle,
    InProgress { path: String },
    Completed { path: String },
    Cancelled { path: String },
}

impl ArchiveState {
    /// `<state>: <path>`, or `None` when no job ever ran
    fn status(&self) -> Option<String> {
        let (state, path) = match self {
            ArchiveState::Idle => return None,
            ArchiveState::InProgress { path } => ("InProgress", path),
            ArchiveState::Completed { path } => ("Completed", path),
            ArchiveState::Cancelled { path } => ("Cancelled", path),
        };
        Some(format!("{}: {}", state, path))
    }
}

#[derive(Debug, Clone)]
struct FileSystemState {
    descriptor: LustreFileSystem,
    root_squash: RootSquashConfig,
    archive: ArchiveState,
    created_at: chrono::DateTime<chrono::Utc>,
}

fn state_key(resource_group: &str, name: &str) -> String {
    format!("{}/{}", resource_group.to_lowercase(), name.to_lowercase())
}

// =============================================================================
// In-Memory Backend
// =============================================================================

/// Backend holding all state in process memory
pub struct InMemoryLustreBackend {
    config: InMemoryBackendConfig,
    file_systems: RwLock<BTreeMap<String, FileSystemState>>,
}

impl InMemoryLustreBackend {
    /// Create a new in-memory backend
    pub fn new(config: InMemoryBackendConfig) -> Self {
        Self {
            config,
            file_systems: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn config(&self) -> &InMemoryBackendConfig {
        &self.config
    }

    fn check_subscription(&self, subscription: &str) -> Result<()> {
        if subscription.eq_ignore_ascii_case(&self.config.subscription) {
            Ok(())
        } else {
            Err(Error::ResourceNotFound {
                kind: "Subscription".into(),
                name: subscription.to_string(),
            })
        }
    }

    fn failed(&self, operation: &str, reason: impl Into<String>) -> Error {
        Error::BackendOperationFailed {
            backend: BACKEND_NAME.into(),
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    fn not_found(target: &FileSystemRef) -> Error {
        Error::ResourceNotFound {
            kind: "AmlFilesystem".into(),
            name: target.to_string(),
        }
    }

    fn ips_for(&self, operation: &str, sku: Sku, size_tib: u32) -> Result<u32> {
        let blocks = size_tib.div_ceil(sku.size_increment_tib());
        blocks
            .checked_mul(self.config.ips_per_block)
            .and_then(|ips| ips.checked_add(self.config.base_ips))
            .ok_or_else(|| {
                self.failed(
                    operation,
                    format!("{} TiB of {} exceeds the addressable subnet size", size_tib, sku),
                )
            })
    }

    /// Root squash settings stored for a file system
    pub async fn root_squash(&self, target: &FileSystemRef) -> Option<RootSquashConfig> {
        let file_systems = self.file_systems.read().await;
        file_systems
            .get(&state_key(&target.resource_group, &target.name))
            .map(|s| s.root_squash.clone())
    }

    /// Mark the running archive job as finished
    pub async fn complete_archive(&self, target: &FileSystemRef) -> Result<()> {
        let mut file_systems = self.file_systems.write().await;
        let state = file_systems
            .get_mut(&state_key(&target.resource_group, &target.name))
            .ok_or_else(|| Self::not_found(target))?;

        match std::mem::replace(&mut state.archive, ArchiveState::Idle) {
            ArchiveState::InProgress { path } => {
                debug!("Archive of {} on {} completed", path, target);
                state.archive = ArchiveState::Completed { path };
                Ok(())
            }
            other => {
                state.archive = other;
                Err(self.failed("complete_archive", "no archive job in progress"))
            }
        }
    }
}

impl Default for InMemoryLustreBackend {
    fn default() -> Self {
        Self::new(InMemoryBackendConfig::default())
    }
}

#[async_trait]
impl ZoneAvailabilityResolver for InMemoryLustreBackend {
    async fn resolve_zone_availability(&self, location: &str) -> Result<ZoneAvailability> {
        zone_availability(&self.config.catalog, location).ok_or_else(|| Error::ResourceNotFound {
            kind: "Location".into(),
            name: location.to_string(),
        })
    }
}

#[async_trait]
impl SkuCatalogSource for InMemoryLustreBackend {
    async fn fetch_raw_sku_catalog(&self, subscription: &str) -> Result<Vec<RawSkuRecord>> {
        self.check_subscription(subscription)?;
        Ok(self.config.catalog.clone())
    }
}

#[async_trait]
impl FileSystemProvisioner for InMemoryLustreBackend {
    async fn submit_provisioning_request(
        &self,
        subscription: &str,
        request: ProvisioningRequest,
    ) -> Result<LustreFileSystem> {
        self.check_subscription(subscription)?;

        let increment = request.sku().size_increment_tib();
        if request.size_tib() % increment != 0 {
            return Err(self.failed(
                "create",
                format!(
                    "size {} TiB is not a multiple of {} TiB for {}",
                    request.size_tib(),
                    increment,
                    request.sku()
                ),
            ));
        }

        let offered = project_capability_catalog(&self.config.catalog, Some(request.location()))
            .iter()
            .any(|r| r.sku_name == request.sku().as_str());
        if !offered {
            return Err(self.failed(
                "create",
                format!("{} is not offered in {}", request.sku(), request.location()),
            ));
        }

        let key = state_key(request.resource_group(), request.name());
        let mut file_systems = self.file_systems.write().await;
        if file_systems.contains_key(&key) {
            return Err(self.failed(
                "create",
                format!(
                    "file system {} already exists in resource group {}",
                    request.name(),
                    request.resource_group()
                ),
            ));
        }

        info!(
            "Creating file system {}/{} ({} TiB, {})",
            request.resource_group(),
            request.name(),
            request.size_tib(),
            request.sku()
        );

        let window = request.maintenance_window();
        let descriptor = LustreFileSystem {
            name: request.name().to_string(),
            id: format!(
                "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.StorageCache/amlFilesystems/{}",
                subscription,
                request.resource_group(),
                request.name()
            ),
            resource_group: request.resource_group().to_string(),
            subscription_id: subscription.to_string(),
            location: request.location().to_string(),
            provisioning_state: Some("Succeeded".into()),
            health: Some("Available".into()),
            mgs_address: Some(format!("10.0.0.{}", file_systems.len() + 4)),
            sku: Some(request.sku().to_string()),
            storage_capacity_tib: round_capacity_tib(Some(f64::from(request.size_tib()))),
            hsm_container: request.hsm().map(|h| h.container.clone()),
            maintenance_day: Some(window.day_of_week.to_string()),
            maintenance_time: Some(window.time_of_day_utc.clone()),
        };

        file_systems.insert(
            key,
            FileSystemState {
                descriptor: descriptor.clone(),
                root_squash: request.root_squash().clone(),
                archive: ArchiveState::Idle,
                created_at: chrono::Utc::now(),
            },
        );

        Ok(descriptor)
    }

    async fn submit_update_patch(
        &self,
        subscription: &str,
        patch: UpdatePatch,
    ) -> Result<LustreFileSystem> {
        self.check_subscription(subscription)?;

        let target = FileSystemRef {
            resource_group: patch.resource_group().to_string(),
            name: patch.name().to_string(),
        };
        let mut file_systems = self.file_systems.write().await;
        let state = file_systems
            .get_mut(&state_key(&target.resource_group, &target.name))
            .ok_or_else(|| Self::not_found(&target))?;

        if let Some(window) = patch.maintenance_window() {
            state.descriptor.maintenance_day = Some(window.day_of_week.to_string());
            state.descriptor.maintenance_time = Some(window.time_of_day_utc.clone());
        }
        if let Some(root_squash) = patch.root_squash() {
            state.root_squash = root_squash.clone();
        }

        debug!("Updated file system {}", target);
        Ok(state.descriptor.clone())
    }

    async fn list_file_systems(
        &self,
        subscription: &str,
        resource_group: Option<&str>,
    ) -> Result<Vec<LustreFileSystem>> {
        self.check_subscription(subscription)?;

        let file_systems = self.file_systems.read().await;
        let mut listed: Vec<&FileSystemState> = file_systems
            .values()
            .filter(|s| {
                resource_group.map_or(true, |rg| s.descriptor.resource_group.eq_ignore_ascii_case(rg))
            })
            .collect();
        listed.sort_by_key(|s| s.created_at);

        Ok(listed.into_iter().map(|s| s.descriptor.clone()).collect())
    }

    async fn required_subnet_size(&self, subscription: &str, sku: Sku, size_tib: u32) -> Result<u32> {
        self.check_subscription(subscription)?;
        self.ips_for("required_subnet_size", sku, size_tib)
    }

    async fn check_subnet(&self, subscription: &str, request: &SubnetSizeRequest) -> Result<bool> {
        self.check_subscription(subscription)?;

        let Some(subnet_id) = request.subnet_id.as_deref() else {
            return Err(self.failed("check_subnet", "subnet ID is required"));
        };

        if let Some(location) = request.location.as_deref() {
            if zone_availability(&self.config.catalog, location).is_none() {
                debug!("Subnet check for unsupported location {}", location);
                return Ok(false);
            }
        }

        let required = self.ips_for("check_subnet", request.sku, request.size_tib)?;
        let available = self
            .config
            .subnet_capacity
            .get(subnet_id)
            .copied()
            .unwrap_or(self.config.default_subnet_ips);

        if available < required {
            warn!(
                "Subnet {} has {} free IPs, {} required",
                subnet_id, available, required
            );
        }
        Ok(available >= required)
    }

    async fn start_archive(&self, subscription: &str, request: &ArchiveRequest) -> Result<()> {
        self.check_subscription(subscription)?;

        let mut file_systems = self.file_systems.write().await;
        let state = file_systems
            .get_mut(&state_key(&request.target.resource_group, &request.target.name))
            .ok_or_else(|| Self::not_found(&request.target))?;

        if state.descriptor.hsm_container.is_none() {
            return Err(self.failed(
                "start_archive",
                format!("file system {} has no HSM container", request.target),
            ));
        }
        if let ArchiveState::InProgress { path } = &state.archive {
            return Err(self.failed(
                "start_archive",
                format!("archive of {} is already in progress", path),
            ));
        }

        info!("Archiving {} on {}", request.path, request.target);
        state.archive = ArchiveState::InProgress {
            path: request.path.clone(),
        };
        Ok(())
    }

    async fn archive_status(
        &self,
        subscription: &str,
        target: &FileSystemRef,
    ) -> Result<Option<String>> {
        self.check_subscription(subscription)?;

        let file_systems = self.file_systems.read().await;
        file_systems
            .get(&state_key(&target.resource_group, &target.name))
            .map(|s| s.archive.status())
            .ok_or_else(|| Self::not_found(target))
    }

    async fn cancel_archive(&self, subscription: &str, target: &FileSystemRef) -> Result<()> {
        self.check_subscription(subscription)?;

        let mut file_systems = self.file_systems.write().await;
        let state = file_systems
            .get_mut(&state_key(&target.resource_group, &target.name))
            .ok_or_else(|| Self::not_found(target))?;

        match &state.archive {
            ArchiveState::InProgress { path } => {
                info!("Cancelling archive of {} on {}", path, target);
                state.archive = ArchiveState::Cancelled { path: path.clone() };
                Ok(())
            }
            _ => Err(self.failed("cancel_archive", "no archive job in progress")),
        }
    }

    fn backend_name(&self) -> &str {
        BACKEND_NAME
    }
}
