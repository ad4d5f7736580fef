//! SKU capability catalog
//!
//! Projection of the raw backend catalog into per-region capability records,
//! and zone availability derived from it.

pub mod projector;
pub mod zones;

pub use projector::project_capability_catalog;
pub use zones::{zone_availability, CatalogZoneResolver};

use crate::error::Result;
use crate::model::RawSkuRecord;
use std::path::Path;
use tracing::info;

/// Load a raw catalog snapshot from a JSON array of SKU records
pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<Vec<RawSkuRecord>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let catalog: Vec<RawSkuRecord> = serde_json::from_str(&contents)?;
    info!("Loaded {} SKU records from {}", catalog.len(), path.display());
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_load_catalog_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"resourceType":"amlFilesystems","name":"AMLFS-Durable-Premium-40",
                "locationInfo":[{{"location":"eastus","zones":["1","2"]}}]}}]"#
        )
        .unwrap();

        let catalog = load_catalog_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(project_capability_catalog(&catalog, None).len(), 1);
    }

    #[test]
    fn test_load_catalog_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert_matches!(load_catalog_file(file.path()), Err(Error::JsonParse(_)));

        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            load_catalog_file(dir.path().join("missing.json")),
            Err(Error::Io(_))
        );
    }
}
