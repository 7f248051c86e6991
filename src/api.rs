//! Wire types for the scan service http contract.
//!
//! Every response except health, the raw record and downloads is an
//! [`Envelope`]: `{"status": "success", ...fields}` or
//! `{"status": "error", "kind": ..., "message": ...}`.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::scan::ApiInfo;
use crate::store::{RecordSummary, StoreStats};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success(T),
    Error(ErrorBody),
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T, Error> {
        match self {
            Envelope::Success(value) => Ok(value),
            Envelope::Error(body) => Err(body.into_error()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub message: String,
}

impl ErrorBody {
    pub fn from_error(err: &Error) -> Self {
        ErrorBody {
            kind: Some(err.kind().as_str().to_string()),
            message: err.to_string(),
        }
    }

    /// Rebuild a local error from a remote one. Only not-found and validation
    /// failures keep their meaning across the wire.
    pub fn into_error(self) -> Error {
        match self.kind.as_deref() {
            Some("not_found") => {
                let identifier = self
                    .message
                    .strip_prefix("result not found: ")
                    .unwrap_or(&self.message);
                Error::not_found(identifier)
            }
            Some("validation_failure") => Error::Validation(self.message),
            _ => Error::Remote(self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanCreated {
    pub message: String,
    pub test_id: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultList {
    pub count: usize,
    pub results: Vec<RecordSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_results: usize,
    pub total_size_mb: f64,
    pub results_directory: String,
}

impl From<StoreStats> for Statistics {
    fn from(stats: StoreStats) -> Self {
        Statistics {
            total_results: stats.count,
            total_size_mb: stats.total_size_mb(),
            results_directory: stats.directory.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCatalog {
    pub apis: BTreeMap<String, ApiInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: NaiveDateTime,
    pub port: u16,
}
