//! Primitive Validators
//!
//! Single-field syntactic checks. Each one is a pure function that either
//! returns the typed value or an [`Error::InvalidField`] naming the field and
//! the accepted domain.

use crate::error::{Error, Result};
use crate::model::{DayOfWeek, RootSquashMode, Sku};
use chrono::NaiveTime;

/// Require a non-blank string
pub fn non_blank<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::invalid_field(field, "a non-blank value"))
}

/// Require a DNS-friendly resource name (letters, digits and hyphens)
pub fn resource_name<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    let name = non_blank(field, value)?;
    let dns_friendly = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-');
    if dns_friendly {
        Ok(name)
    } else {
        Err(Error::invalid_field(
            field,
            "a DNS-friendly name of letters, numbers and hyphens",
        ))
    }
}

/// Require an integer in `[0, +inf)`
pub fn non_negative(field: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::invalid_field(field, "an integer >= 0"))
}

/// Require an integer in `[1, u32::MAX]`
pub fn positive(field: &str, value: Option<i64>) -> Result<u32> {
    value
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| Error::invalid_field(field, format!("an integer in 1..={}", u32::MAX)))
}

/// Require one of the orderable SKU names, matched exactly
pub fn sku(value: Option<&str>) -> Result<Sku> {
    non_blank("sku", value)
        .map_err(|_| Error::invalid_field("sku", Sku::accepted_values()))?
        .parse()
}

/// Require a root squash mode, matched case-insensitively
pub fn root_squash_mode(value: &str) -> Result<RootSquashMode> {
    value.parse()
}

/// Require a weekday name, matched case-insensitively
pub fn day_of_week(value: &str) -> Result<DayOfWeek> {
    value.parse()
}

/// Require a 24-hour `HH:MM` time; returns the canonical form
pub fn time_of_day(value: &str) -> Result<String> {
    let invalid = || Error::invalid_field("maintenance-time", "a 24-hour time formatted HH:MM");
    let value = value.trim();
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| invalid())
}

/// Require an absolute path inside the file system (starting with `/`)
pub fn absolute_path<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    let path = non_blank(field, value)?;
    if path.starts_with('/') {
        Ok(path)
    } else {
        Err(Error::invalid_field(field, "a path starting with '/'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("name", Some(" fs1 ")).unwrap(), "fs1");
        assert_matches!(
            non_blank("name", Some("   ")),
            Err(Error::InvalidField { field, .. }) if field == "name"
        );
        assert!(non_blank("name", None).is_err());
    }

    #[test]
    fn test_resource_name() {
        assert!(resource_name("name", Some("uae-amlfs-001")).is_ok());
        assert!(resource_name("name", Some("bad_name")).is_err());
        assert!(resource_name("name", Some("-leading")).is_err());
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative("squash-uid", 0).unwrap(), 0);
        assert_eq!(non_negative("squash-uid", 1000).unwrap(), 1000);
        assert_matches!(
            non_negative("squash-uid", -1),
            Err(Error::InvalidField { field, expected }) if field == "squash-uid" && expected.contains(">= 0")
        );
    }

    #[test]
    fn test_positive() {
        assert_eq!(positive("size", Some(128)).unwrap(), 128);
        assert!(positive("size", Some(0)).is_err());
        assert!(positive("size", Some(-4)).is_err());
        assert!(positive("size", None).is_err());
        assert!(positive("size", Some(i64::MAX)).is_err());
    }

    #[test]
    fn test_sku_reports_allowed_values() {
        assert_eq!(sku(Some("AMLFS-Durable-Premium-500")).unwrap(), Sku::DurablePremium500);
        assert_matches!(
            sku(None),
            Err(Error::InvalidField { expected, .. }) if expected.contains("AMLFS-Durable-Premium-40")
        );
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(time_of_day("00:00").unwrap(), "00:00");
        assert_eq!(time_of_day("23:59").unwrap(), "23:59");
        assert!(time_of_day("24:00").is_err());
        assert!(time_of_day("1:00").is_err());
        assert!(time_of_day("01:60").is_err());
        assert!(time_of_day("0100").is_err());
        assert!(time_of_day("ab:cd").is_err());
    }

    #[test]
    fn test_absolute_path() {
        assert_eq!(absolute_path("path", Some("/ingest/")).unwrap(), "/ingest/");
        assert!(absolute_path("path", Some("ingest")).is_err());
    }
}
