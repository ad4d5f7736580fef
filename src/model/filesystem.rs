//! File System Configuration Types
//!
//! Typed configuration groups for a managed Lustre file system and the two
//! normalized aggregates handed to the provisioning backend.

use crate::error::{Error, Result};
use crate::model::sku::Sku;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Zone label that regions without availability-zone support accept
pub const SINGLE_ZONE_SENTINEL: &str = "1";

// =============================================================================
// Root Squash
// =============================================================================

/// Root squash policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootSquashMode {
    #[default]
    None,
    RootOnly,
    All,
}

impl RootSquashMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootSquashMode::None => "None",
            RootSquashMode::RootOnly => "RootOnly",
            RootSquashMode::All => "All",
        }
    }
}

impl std::fmt::Display for RootSquashMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootSquashMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(RootSquashMode::None),
            "rootonly" => Ok(RootSquashMode::RootOnly),
            "all" => Ok(RootSquashMode::All),
            _ => Err(Error::invalid_field(
                "root-squash-mode",
                "one of All, RootOnly, None",
            )),
        }
    }
}

/// Root squash settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootSquashConfig {
    pub mode: RootSquashMode,
    pub squash_uid: Option<u64>,
    pub squash_gid: Option<u64>,
    /// Comma-separated NIDs exempt from squashing
    pub no_squash_nid_list: String,
}

impl RootSquashConfig {
    /// Root squashing switched off, with every companion field cleared
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Clear companion fields when the mode is `None`
    pub fn normalized(self) -> Self {
        match self.mode {
            RootSquashMode::None => Self::disabled(),
            _ => self,
        }
    }
}

// =============================================================================
// Maintenance Window
// =============================================================================

/// Day of the week for the maintenance window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|day| day.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::invalid_field(
                    "maintenance-day",
                    "one of Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, Sunday",
                )
            })
    }
}

/// Weekly maintenance window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWindow {
    pub day_of_week: DayOfWeek,
    /// Start time in UTC, `HH:MM` 24-hour
    pub time_of_day_utc: String,
}

// =============================================================================
// HSM and Encryption
// =============================================================================

/// Blob storage integration (hierarchical storage management)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HsmConfig {
    pub container: String,
    pub log_container: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_prefix: Option<String>,
}

/// Customer-managed key encryption. Present only when enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionConfig {
    pub key_url: String,
    pub source_vault_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_assigned_identity_id: Option<String>,
}

// =============================================================================
// Zones
// =============================================================================

/// Zone support of a region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAvailability {
    pub location: String,
    pub supports_zones: bool,
    /// Zone labels offered by the region; empty when unknown
    #[serde(default)]
    pub zones: Vec<String>,
}

// =============================================================================
// Normalized Aggregates
// =============================================================================

/// Fully validated create request.
///
/// Only the normalizer constructs it; there is no mutable access afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningRequest {
    pub(crate) name: String,
    pub(crate) resource_group: String,
    pub(crate) location: String,
    pub(crate) sku: Sku,
    pub(crate) size_tib: u32,
    pub(crate) subnet_id: String,
    pub(crate) zone: String,
    pub(crate) maintenance_window: MaintenanceWindow,
    pub(crate) hsm: Option<HsmConfig>,
    pub(crate) root_squash: RootSquashConfig,
    pub(crate) encryption: Option<EncryptionConfig>,
}

impl ProvisioningRequest {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn sku(&self) -> Sku {
        self.sku
    }

    pub fn size_tib(&self) -> u32 {
        self.size_tib
    }

    pub fn subnet_id(&self) -> &str {
        &self.subnet_id
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn maintenance_window(&self) -> &MaintenanceWindow {
        &self.maintenance_window
    }

    pub fn hsm(&self) -> Option<&HsmConfig> {
        self.hsm.as_ref()
    }

    pub fn root_squash(&self) -> &RootSquashConfig {
        &self.root_squash
    }

    pub fn encryption(&self) -> Option<&EncryptionConfig> {
        self.encryption.as_ref()
    }
}

/// Fully validated update patch; at least one group is present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatch {
    pub(crate) name: String,
    pub(crate) resource_group: String,
    pub(crate) maintenance_window: Option<MaintenanceWindow>,
    pub(crate) root_squash: Option<RootSquashConfig>,
}

impl UpdatePatch {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    pub fn maintenance_window(&self) -> Option<&MaintenanceWindow> {
        self.maintenance_window.as_ref()
    }

    pub fn root_squash(&self) -> Option<&RootSquashConfig> {
        self.root_squash.as_ref()
    }
}

// =============================================================================
// Auxiliary Requests
// =============================================================================

/// Validated subnet sizing/check request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSizeRequest {
    pub sku: Sku,
    pub size_tib: u32,
    pub subnet_id: Option<String>,
    pub location: Option<String>,
}

/// Identifies an existing file system
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemRef {
    pub resource_group: String,
    pub name: String,
}

impl std::fmt::Display for FileSystemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.resource_group, self.name)
    }
}

/// Validated archive job request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequest {
    pub target: FileSystemRef,
    /// File-system path to archive, starting with `/`
    pub path: String,
}

// =============================================================================
// Provisioned Resource
// =============================================================================

/// Descriptor of a provisioned file system as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LustreFileSystem {
    pub name: String,
    pub id: String,
    pub resource_group: String,
    pub subscription_id: String,
    pub location: String,
    pub provisioning_state: Option<String>,
    pub health: Option<String>,
    pub mgs_address: Option<String>,
    pub sku: Option<String>,
    pub storage_capacity_tib: Option<i64>,
    pub hsm_container: Option<String>,
    pub maintenance_day: Option<String>,
    pub maintenance_time: Option<String>,
}

/// Round a backend-reported capacity to whole TiB
pub fn round_capacity_tib(capacity: Option<f64>) -> Option<i64> {
    capacity.map(|c| c.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_squash_mode_is_case_insensitive() {
        assert_eq!("none".parse::<RootSquashMode>().unwrap(), RootSquashMode::None);
        assert_eq!("ROOTONLY".parse::<RootSquashMode>().unwrap(), RootSquashMode::RootOnly);
        assert_eq!("All".parse::<RootSquashMode>().unwrap(), RootSquashMode::All);
        assert!("some".parse::<RootSquashMode>().is_err());
    }

    #[test]
    fn test_day_of_week_is_case_insensitive() {
        assert_eq!("monday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Monday);
        assert_eq!("SUNDAY".parse::<DayOfWeek>().unwrap(), DayOfWeek::Sunday);
        assert!("Funday".parse::<DayOfWeek>().is_err());
    }

    #[test]
    fn test_root_squash_none_clears_companions() {
        let config = RootSquashConfig {
            mode: RootSquashMode::None,
            squash_uid: Some(1000),
            squash_gid: Some(1000),
            no_squash_nid_list: "10.0.0.5".into(),
        };
        assert_eq!(config.normalized(), RootSquashConfig::disabled());

        let kept = RootSquashConfig {
            mode: RootSquashMode::All,
            squash_uid: Some(0),
            squash_gid: Some(0),
            no_squash_nid_list: "nid1".into(),
        };
        assert_eq!(kept.clone().normalized(), kept);
    }

    #[test]
    fn test_round_capacity_tib() {
        assert_eq!(round_capacity_tib(Some(127.6)), Some(128));
        assert_eq!(round_capacity_tib(Some(4.2)), Some(4));
        assert_eq!(round_capacity_tib(None), None);
    }
}
