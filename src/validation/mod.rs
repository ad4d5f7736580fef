//! Request validation and normalization
//!
//! Three layers, applied in order by each use case:
//!
//! 1. [`primitives`]: single-field syntactic checks
//! 2. [`rules`]: cross-field rules per configuration group
//! 3. [`normalizer`]: defaults, clearing and zone placement
//!
//! Everything here is synchronous and stateless except zone placement,
//! which awaits an injected [`ZoneAvailabilityResolver`](crate::domain::ports::ZoneAvailabilityResolver).

pub mod fields;
pub mod normalizer;
pub mod primitives;
pub mod rules;

pub use fields::{ArchiveFields, CreateFields, SubnetFields, UpdateFields};
pub use normalizer::{
    check_zone_placement, resolve_zone_placement, validate_and_normalize_create,
    validate_and_normalize_update, validate_archive_start, validate_archive_target,
    validate_subnet_check, validate_subnet_size,
};
pub use rules::NormalizedGroups;

use serde::{Deserialize, Serialize};

/// Which use case a field set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    Create,
    Update,
}

/// Whether enabled encryption also needs a user-assigned identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentityRequirement {
    #[default]
    Optional,
    RequiredWhenEncrypted,
}

/// Immutable validation settings passed explicitly to every call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationPolicy {
    pub encryption_identity: IdentityRequirement,
}
