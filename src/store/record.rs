use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Name used when the caller does not supply one.
pub const DEFAULT_NAME: &str = "device_scan";

/// Number of id characters embedded in the storage key and used for prefix lookups.
pub const ID_PREFIX_LEN: usize = 8;

/// Longest accepted name in bytes. Leaves room for the key suffix under the
/// usual 255-byte filename limit.
pub const MAX_NAME_BYTES: usize = 200;

const KEY_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A persisted scan result. Field names on disk follow the result file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "test_id")]
    pub id: String,
    #[serde(rename = "test_name")]
    pub name: String,
    #[serde(rename = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "scan_data")]
    pub payload: Value,
    #[serde(rename = "filename")]
    pub storage_key: String,
}

impl Record {
    pub fn new(id: String, name: &str, created_at: NaiveDateTime, payload: Value) -> Self {
        let storage_key = storage_key(name, created_at, &id);
        Record {
            id,
            name: name.to_string(),
            created_at,
            payload,
            storage_key,
        }
    }

    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            storage_key: self.storage_key.clone(),
        }
    }
}

/// Listing view of a record, without the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    #[serde(rename = "test_id")]
    pub id: String,
    #[serde(rename = "test_name")]
    pub name: String,
    #[serde(rename = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "filename")]
    pub storage_key: String,
}

/// Current local time truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

/// `<name>_<YYYYMMDD_HHMMSS>_<first 8 chars of id>.json`
pub fn storage_key(name: &str, created_at: NaiveDateTime, id: &str) -> String {
    format!(
        "{name}_{}_{}.json",
        created_at.format(KEY_TIME_FORMAT),
        id_prefix(id)
    )
}

/// First `ID_PREFIX_LEN` characters of an identifier, or all of it when shorter.
pub fn id_prefix(identifier: &str) -> &str {
    match identifier.char_indices().nth(ID_PREFIX_LEN) {
        Some((end, _)) => &identifier[..end],
        None => identifier,
    }
}

/// Names end up in filenames, so anything that would escape the results
/// directory is rejected.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("test name must not be empty".into()));
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(Error::Validation(format!(
            "test name is {} bytes, longer than {MAX_NAME_BYTES}",
            name.len()
        )));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(Error::Validation(format!(
            "test name '{name}' contains path characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
    }

    #[test]
    fn overlong_name_is_rejected() {
        assert!(validate_name(&"n".repeat(MAX_NAME_BYTES)).is_ok());

        let err = validate_name(&"n".repeat(MAX_NAME_BYTES + 1)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn storage_key_combines_name_time_and_prefix() {
        let key = storage_key(
            "device_scan",
            at(14, 5, 7),
            "3f2a9c1e-77b4-4d0a-9a51-0c8e2b6d1f00",
        );
        assert_eq!(key, "device_scan_20240309_140507_3f2a9c1e.json");
    }

    #[test]
    fn id_prefix_handles_short_and_multibyte_input() {
        assert_eq!(id_prefix("abc"), "abc");
        assert_eq!(id_prefix("0123456789"), "01234567");
        assert_eq!(id_prefix("ééééééééé"), "éééééééé");
    }

    #[test]
    fn record_serializes_with_result_file_field_names() {
        let record = Record::new(
            "3f2a9c1e-77b4-4d0a-9a51-0c8e2b6d1f00".into(),
            "bench",
            at(1, 2, 3),
            serde_json::json!({"cpu": {"percent": 12.5}}),
        );
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["test_id"], "3f2a9c1e-77b4-4d0a-9a51-0c8e2b6d1f00");
        assert_eq!(value["test_name"], "bench");
        assert_eq!(value["timestamp"], "2024-03-09T01:02:03");
        assert_eq!(value["scan_data"]["cpu"]["percent"], 12.5);
        assert_eq!(value["filename"], "bench_20240309_010203_3f2a9c1e.json");
    }

    #[test]
    fn accepts_timestamps_with_fractional_seconds() {
        let raw = r#"{
            "test_id": "abc",
            "test_name": "n",
            "timestamp": "2024-03-09T01:02:03.456789",
            "scan_data": {},
            "filename": "n_20240309_010203_abc.json"
        }"#;
        let record: Record = serde_json::from_str(raw).unwrap();
        assert_eq!(record.created_at.trunc_subsecs(0), at(1, 2, 3));
    }

    #[test]
    fn names_with_path_characters_are_rejected() {
        assert!(validate_name("device_scan").is_ok());
        assert!(validate_name("nightly run").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("../etc").is_err());
        assert!(validate_name("a\\b").is_err());
    }
}
