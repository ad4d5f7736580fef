//! Cross-Field Rule Engine
//!
//! Independent rule functions, one per configuration group, composed by
//! [`evaluate`] in a fixed order. The first failing rule wins; errors are
//! never aggregated.

use crate::error::{Error, Result};
use crate::model::{
    EncryptionConfig, HsmConfig, MaintenanceWindow, RootSquashConfig, RootSquashMode,
};
use crate::validation::fields::{
    EncryptionFields, FieldGroups, HsmFields, MaintenanceFields, RootSquashFields,
};
use crate::validation::primitives;
use crate::validation::{IdentityRequirement, RequestMode, ValidationPolicy};
use serde::Serialize;
use tracing::debug;

/// Validated configuration groups.
///
/// A group is `None` when the caller supplied none of its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedGroups {
    pub maintenance_window: Option<MaintenanceWindow>,
    pub root_squash: Option<RootSquashConfig>,
    pub hsm: Option<HsmConfig>,
    pub encryption: Option<EncryptionConfig>,
}

/// Run every rule in order and stop at the first failure
pub fn evaluate(
    groups: &FieldGroups<'_>,
    mode: RequestMode,
    policy: &ValidationPolicy,
) -> Result<NormalizedGroups> {
    let maintenance_window = maintenance_rule(&groups.maintenance, mode)?;
    let root_squash = root_squash_rule(&groups.root_squash)?;
    let hsm = hsm_rule(&groups.hsm)?;
    let encryption = encryption_rule(&groups.encryption, policy)?;

    let normalized = NormalizedGroups {
        maintenance_window,
        root_squash,
        hsm,
        encryption,
    };

    if mode == RequestMode::Update {
        update_non_empty_rule(&normalized)?;
    }

    debug!(
        ?mode,
        maintenance = normalized.maintenance_window.is_some(),
        root_squash = normalized.root_squash.is_some(),
        hsm = normalized.hsm.is_some(),
        encryption = normalized.encryption.is_some(),
        "Configuration rules passed"
    );

    Ok(normalized)
}

// =============================================================================
// Rules
// =============================================================================

/// Both maintenance fields or neither; on create, neither is also an error
pub fn maintenance_rule(
    fields: &MaintenanceFields<'_>,
    mode: RequestMode,
) -> Result<Option<MaintenanceWindow>> {
    match (fields.day, fields.time) {
        (Some(day), Some(time)) => Ok(Some(MaintenanceWindow {
            day_of_week: primitives::day_of_week(day)?,
            time_of_day_utc: primitives::time_of_day(time)?,
        })),
        (None, None) if mode == RequestMode::Update => Ok(None),
        (day, time) => {
            let mut missing = Vec::new();
            if day.is_none() {
                missing.push("maintenance-day");
            }
            if time.is_none() {
                missing.push("maintenance-time");
            }
            Err(Error::missing_group("maintenance window", missing))
        }
    }
}

/// A mode other than `None` requires squash UID, GID and NID list
pub fn root_squash_rule(fields: &RootSquashFields<'_>) -> Result<Option<RootSquashConfig>> {
    let Some(raw_mode) = fields.mode else {
        if fields.any_supplied() {
            return Err(Error::missing_group("root squash", ["root-squash-mode"]));
        }
        return Ok(None);
    };

    let mode = primitives::root_squash_mode(raw_mode)?;
    if mode == RootSquashMode::None {
        return Ok(Some(RootSquashConfig {
            mode,
            squash_uid: fields.squash_uid.and_then(|v| u64::try_from(v).ok()),
            squash_gid: fields.squash_gid.and_then(|v| u64::try_from(v).ok()),
            no_squash_nid_list: fields.no_squash_nid_list.unwrap_or_default().to_string(),
        }));
    }

    match (fields.squash_uid, fields.squash_gid, fields.no_squash_nid_list) {
        (Some(uid), Some(gid), Some(nids)) => Ok(Some(RootSquashConfig {
            mode,
            squash_uid: Some(primitives::non_negative("squash-uid", uid)?),
            squash_gid: Some(primitives::non_negative("squash-gid", gid)?),
            no_squash_nid_list: nids.to_string(),
        })),
        (uid, gid, nids) => {
            let mut missing = Vec::new();
            if nids.is_none() {
                missing.push("no-squash-nid-list");
            }
            if uid.is_none() {
                missing.push("squash-uid");
            }
            if gid.is_none() {
                missing.push("squash-gid");
            }
            Err(Error::missing_group("root squash", missing))
        }
    }
}

/// Any HSM field requires both the data and the log container
pub fn hsm_rule(fields: &HsmFields<'_>) -> Result<Option<HsmConfig>> {
    if !fields.any_supplied() {
        return Ok(None);
    }

    match (fields.container, fields.log_container) {
        (Some(container), Some(log_container)) => Ok(Some(HsmConfig {
            container: container.to_string(),
            log_container: log_container.to_string(),
            import_prefix: fields.import_prefix.map(str::to_string),
        })),
        (container, log_container) => {
            let mut missing = Vec::new();
            if container.is_none() {
                missing.push("hsm-container");
            }
            if log_container.is_none() {
                missing.push("hsm-log-container");
            }
            Err(Error::missing_group("HSM", missing))
        }
    }
}

/// Enabled encryption requires the key URL and source vault, plus the
/// managed identity when the policy demands it
pub fn encryption_rule(
    fields: &EncryptionFields<'_>,
    policy: &ValidationPolicy,
) -> Result<Option<EncryptionConfig>> {
    if !fields.enabled {
        if fields.key_url.is_some()
            || fields.source_vault_id.is_some()
            || fields.user_assigned_identity_id.is_some()
        {
            debug!("custom-encryption is off; ignoring supplied key vault options");
        }
        return Ok(None);
    }

    let identity_missing = policy.encryption_identity == IdentityRequirement::RequiredWhenEncrypted
        && fields.user_assigned_identity_id.is_none();

    match (fields.key_url, fields.source_vault_id) {
        (Some(key_url), Some(source_vault_id)) if !identity_missing => Ok(Some(EncryptionConfig {
            key_url: key_url.to_string(),
            source_vault_id: source_vault_id.to_string(),
            user_assigned_identity_id: fields.user_assigned_identity_id.map(str::to_string),
        })),
        (key_url, source_vault_id) => {
            let mut missing = Vec::new();
            if key_url.is_none() {
                missing.push("key-url");
            }
            if source_vault_id.is_none() {
                missing.push("source-vault");
            }
            if identity_missing {
                missing.push("user-assigned-identity-id");
            }
            Err(Error::missing_group("custom encryption", missing))
        }
    }
}

/// An update must carry a maintenance window or a root squash group
pub fn update_non_empty_rule(groups: &NormalizedGroups) -> Result<()> {
    if groups.maintenance_window.is_none() && groups.root_squash.is_none() {
        return Err(Error::EmptyUpdatePatch);
    }
    Ok(())
}
