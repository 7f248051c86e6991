//! Lightweight preview of a stored record.
//!
//! Extracts a fixed subset of the payload:
//! - system identity (copied as-is)
//! - cpu core counts and load
//! - memory totals and usage
//! - disk capacity summed across every reported volume
//!
//! Missing or oddly shaped fields become `null` instead of failing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::Record;
use crate::util::round2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDigest {
    #[serde(rename = "test_id")]
    pub id: String,
    #[serde(rename = "test_name")]
    pub name: String,
    #[serde(rename = "timestamp")]
    pub created_at: NaiveDateTime,
    pub summary: DigestBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestBody {
    pub system: Map<String, Value>,
    pub cpu: CpuDigest,
    pub memory: MemoryDigest,
    pub disk: DiskDigest,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuDigest {
    pub physical_cores: Option<u64>,
    pub logical_cores: Option<u64>,
    pub cpu_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDigest {
    pub total_gb: Option<f64>,
    pub used_gb: Option<f64>,
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskDigest {
    pub total_gb: f64,
}

impl RecordDigest {
    pub fn from_record(record: &Record) -> Self {
        let payload = &record.payload;

        let system = payload
            .get("system")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let cpu = section(payload, "cpu");
        let memory = section(payload, "memory");

        RecordDigest {
            id: record.id.clone(),
            name: record.name.clone(),
            created_at: record.created_at,
            summary: DigestBody {
                system,
                cpu: CpuDigest {
                    physical_cores: cpu.and_then(|c| c.get("physical_cores")).and_then(Value::as_u64),
                    logical_cores: cpu.and_then(|c| c.get("logical_cores")).and_then(Value::as_u64),
                    cpu_percent: cpu.and_then(|c| c.get("cpu_percent")).and_then(Value::as_f64),
                },
                memory: MemoryDigest {
                    total_gb: memory.and_then(|m| m.get("total_gb")).and_then(Value::as_f64),
                    used_gb: memory.and_then(|m| m.get("used_gb")).and_then(Value::as_f64),
                    percent: memory.and_then(|m| m.get("percent")).and_then(Value::as_f64),
                },
                disk: DiskDigest {
                    total_gb: disk_total_gb(payload),
                },
            },
        }
    }
}

fn section<'a>(payload: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    payload.get(key).and_then(Value::as_object)
}

// volumes that are not objects (e.g. a probe "error" string) contribute nothing
fn disk_total_gb(payload: &Value) -> f64 {
    let Some(disks) = section(payload, "disk") else {
        return 0.0;
    };

    let total: f64 = disks
        .values()
        .filter_map(|disk| disk.get("total_gb").and_then(Value::as_f64))
        .sum();

    round2(total)
}
