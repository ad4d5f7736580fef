//! Raw field sets
//!
//! Caller-supplied values, already type-coerced but otherwise unchecked.
//! Field names follow the command option names (`root-squash-mode`,
//! `maintenance-day`, ...). Blank strings count as not supplied.

use serde::{Deserialize, Serialize};

/// Returns the trimmed value when it is present and non-blank
pub(crate) fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Use-case Field Sets
// =============================================================================

/// Fields accepted by the create use case
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CreateFields {
    pub name: Option<String>,
    pub resource_group: Option<String>,
    pub location: Option<String>,
    pub sku: Option<String>,
    /// Size in TiB
    pub size: Option<i64>,
    pub subnet_id: Option<String>,
    pub zone: Option<String>,

    pub maintenance_day: Option<String>,
    pub maintenance_time: Option<String>,

    pub hsm_container: Option<String>,
    pub hsm_log_container: Option<String>,
    pub import_prefix: Option<String>,

    pub root_squash_mode: Option<String>,
    pub no_squash_nid_list: Option<String>,
    pub squash_uid: Option<i64>,
    pub squash_gid: Option<i64>,

    pub custom_encryption: Option<bool>,
    pub key_url: Option<String>,
    pub source_vault: Option<String>,
    pub user_assigned_identity_id: Option<String>,
}

impl CreateFields {
    pub fn groups(&self) -> FieldGroups<'_> {
        FieldGroups {
            maintenance: MaintenanceFields {
                day: supplied(&self.maintenance_day),
                time: supplied(&self.maintenance_time),
            },
            root_squash: RootSquashFields {
                mode: supplied(&self.root_squash_mode),
                squash_uid: self.squash_uid,
                squash_gid: self.squash_gid,
                no_squash_nid_list: supplied(&self.no_squash_nid_list),
            },
            hsm: HsmFields {
                container: supplied(&self.hsm_container),
                log_container: supplied(&self.hsm_log_container),
                import_prefix: supplied(&self.import_prefix),
            },
            encryption: EncryptionFields {
                enabled: self.custom_encryption.unwrap_or(false),
                key_url: supplied(&self.key_url),
                source_vault_id: supplied(&self.source_vault),
                user_assigned_identity_id: supplied(&self.user_assigned_identity_id),
            },
        }
    }
}

/// Fields accepted by the update use case
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UpdateFields {
    pub name: Option<String>,
    pub resource_group: Option<String>,

    pub maintenance_day: Option<String>,
    pub maintenance_time: Option<String>,

    pub root_squash_mode: Option<String>,
    pub no_squash_nid_list: Option<String>,
    pub squash_uid: Option<i64>,
    pub squash_gid: Option<i64>,
}

impl UpdateFields {
    pub fn groups(&self) -> FieldGroups<'_> {
        FieldGroups {
            maintenance: MaintenanceFields {
                day: supplied(&self.maintenance_day),
                time: supplied(&self.maintenance_time),
            },
            root_squash: RootSquashFields {
                mode: supplied(&self.root_squash_mode),
                squash_uid: self.squash_uid,
                squash_gid: self.squash_gid,
                no_squash_nid_list: supplied(&self.no_squash_nid_list),
            },
            hsm: HsmFields::default(),
            encryption: EncryptionFields::default(),
        }
    }
}

/// Fields accepted by the subnet sizing and subnet check use cases
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SubnetFields {
    pub sku: Option<String>,
    pub size: Option<i64>,
    pub subnet_id: Option<String>,
    pub location: Option<String>,
}

/// Fields accepted by the archive use cases
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ArchiveFields {
    pub name: Option<String>,
    pub resource_group: Option<String>,
    pub path: Option<String>,
}

// =============================================================================
// Rule Groups
// =============================================================================

/// Borrowed view of the grouped fields the rule engine inspects
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldGroups<'a> {
    pub maintenance: MaintenanceFields<'a>,
    pub root_squash: RootSquashFields<'a>,
    pub hsm: HsmFields<'a>,
    pub encryption: EncryptionFields<'a>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaintenanceFields<'a> {
    pub day: Option<&'a str>,
    pub time: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RootSquashFields<'a> {
    pub mode: Option<&'a str>,
    pub squash_uid: Option<i64>,
    pub squash_gid: Option<i64>,
    pub no_squash_nid_list: Option<&'a str>,
}

impl RootSquashFields<'_> {
    /// True if any root squash field was supplied
    pub fn any_supplied(&self) -> bool {
        self.mode.is_some()
            || self.squash_uid.is_some()
            || self.squash_gid.is_some()
            || self.no_squash_nid_list.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HsmFields<'a> {
    pub container: Option<&'a str>,
    pub log_container: Option<&'a str>,
    pub import_prefix: Option<&'a str>,
}

impl HsmFields<'_> {
    pub fn any_supplied(&self) -> bool {
        self.container.is_some() || self.log_container.is_some() || self.import_prefix.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EncryptionFields<'a> {
    pub enabled: bool,
    pub key_url: Option<&'a str>,
    pub source_vault_id: Option<&'a str>,
    pub user_assigned_identity_id: Option<&'a str>,
}
