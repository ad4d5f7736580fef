//! SKU Types
//!
//! The fixed set of orderable file-system SKUs, and the raw and projected
//! shapes of the per-region capability catalog.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Resource type token identifying file-system entries in the SKU catalog.
///
/// Matched exactly and case-sensitively.
pub const AML_FILESYSTEMS_RESOURCE_TYPE: &str = "amlFilesystems";

// =============================================================================
// Orderable SKUs
// =============================================================================

/// File-system SKU (throughput tier in MB/s per TiB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sku {
    #[serde(rename = "AMLFS-Durable-Premium-40")]
    DurablePremium40,
    #[serde(rename = "AMLFS-Durable-Premium-125")]
    DurablePremium125,
    #[serde(rename = "AMLFS-Durable-Premium-250")]
    DurablePremium250,
    #[serde(rename = "AMLFS-Durable-Premium-500")]
    DurablePremium500,
}

impl Sku {
    /// Every orderable SKU, in ascending throughput order
    pub const ALL: [Sku; 4] = [
        Sku::DurablePremium40,
        Sku::DurablePremium125,
        Sku::DurablePremium250,
        Sku::DurablePremium500,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sku::DurablePremium40 => "AMLFS-Durable-Premium-40",
            Sku::DurablePremium125 => "AMLFS-Durable-Premium-125",
            Sku::DurablePremium250 => "AMLFS-Durable-Premium-250",
            Sku::DurablePremium500 => "AMLFS-Durable-Premium-500",
        }
    }

    /// Throughput per provisioned TiB, in MB/s
    pub fn throughput_mbps_per_tib(&self) -> u32 {
        match self {
            Sku::DurablePremium40 => 40,
            Sku::DurablePremium125 => 125,
            Sku::DurablePremium250 => 250,
            Sku::DurablePremium500 => 500,
        }
    }

    /// Capacity step in TiB; provisioned sizes are multiples of it
    pub fn size_increment_tib(&self) -> u32 {
        match self {
            Sku::DurablePremium40 => 48,
            Sku::DurablePremium125 => 16,
            Sku::DurablePremium250 => 8,
            Sku::DurablePremium500 => 4,
        }
    }

    /// Human-readable list of accepted values
    pub fn accepted_values() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
        format!("one of {}", names.join(", "))
    }
}

impl std::fmt::Display for Sku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sku {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|sku| sku.as_str() == s)
            .ok_or_else(|| Error::invalid_field("sku", Self::accepted_values()))
    }
}

// =============================================================================
// Raw Catalog (backend shape)
// =============================================================================

/// A capability entry as returned by the backend; either half may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSkuCapability {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Location availability for one SKU
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLocationInfo {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub zones: Option<Vec<String>>,
}

/// One SKU entry of the raw capability catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSkuRecord {
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<RawSkuCapability>,
    #[serde(default)]
    pub location_info: Option<Vec<RawLocationInfo>>,
}

// =============================================================================
// Projected Catalog
// =============================================================================

/// A named capability of a SKU (e.g. `bandwidth`, `durable`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuCapability {
    pub name: String,
    pub value: String,
}

/// Capability record for one (SKU, location) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedSkuRecord {
    pub sku_name: String,
    pub location: String,
    pub supports_zones: bool,
    pub capabilities: Vec<SkuCapability>,
}
