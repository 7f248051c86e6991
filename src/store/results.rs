use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::digest::RecordDigest;
use super::record::{self, Record, RecordSummary};
use crate::error::{Error, Result};
use crate::util::round2;

// a prefix collision in the same second needs a fresh id, not an overwrite
const MAX_SAVE_ATTEMPTS: usize = 4;

/// Aggregate numbers for capacity reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub count: usize,
    pub total_bytes: u64,
    pub directory: PathBuf,
}

impl StoreStats {
    pub fn total_size_mb(&self) -> f64 {
        round2(self.total_bytes as f64 / 1_024_f64 / 1_024_f64)
    }
}

/// Handle on a results directory. Open once, share by reference.
///
/// Holds no cache: every call re-reads the directory, so files added or
/// removed by other processes are visible immediately.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| Error::io("creating", &dir, e))?;
        Ok(ResultStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a payload as a new record with a fresh id.
    pub fn save(&self, payload: Value, name: &str) -> Result<Record> {
        self.save_with(payload, name, record::now(), || Uuid::new_v4().to_string())
    }

    fn save_with(
        &self,
        payload: Value,
        name: &str,
        created_at: NaiveDateTime,
        mut next_id: impl FnMut() -> String,
    ) -> Result<Record> {
        record::validate_name(name)?;

        let mut record = Record::new(next_id(), name, created_at, payload);

        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            if self.write_new(&record)? {
                info!(id = %record.id, file = %record.storage_key, "saved result");
                return Ok(record);
            }

            warn!(
                file = %record.storage_key,
                attempt,
                "result file already exists, retrying with a new id"
            );
            record = Record::new(next_id(), name, created_at, record.payload);
        }

        let path = self.dir.join(&record.storage_key);
        Err(Error::io(
            "saving",
            path,
            io::Error::new(io::ErrorKind::AlreadyExists, "storage key collision"),
        ))
    }

    /// Write to a temp file beside the target, then move it into place without
    /// replacing an existing file. Returns false when the target already exists.
    fn write_new(&self, record: &Record) -> Result<bool> {
        let path = self.dir.join(&record.storage_key);
        let bytes = serde_json::to_vec_pretty(record)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| Error::io("creating temp file in", &self.dir, e))?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| Error::io("writing", tmp.path(), e))?;

        match tmp.persist_noclobber(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(Error::io("writing", path, e.error)),
        }
    }

    /// Resolve a full id, an id prefix, or a storage key to its record.
    ///
    /// Candidates are files whose name contains the first 8 characters of the
    /// identifier, visited in reverse filename order; the first whose id
    /// starts with the identifier wins. When two records share an 8-character
    /// prefix and only the short form is given, the winner is decided by
    /// filename sort, not by creation time.
    pub fn resolve(&self, identifier: &str) -> Result<Record> {
        self.locate(identifier).map(|(_, record)| record)
    }

    /// Summaries of stored records in reverse filename order, at most `limit`
    /// of them (`None` or `Some(0)` means all). Unreadable files are skipped.
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<RecordSummary>> {
        let limit = limit.filter(|&n| n > 0);
        let mut summaries = Vec::new();

        for file_name in self.entries()? {
            if limit.is_some_and(|n| summaries.len() >= n) {
                break;
            }

            match read_record(&self.dir.join(&file_name)) {
                Ok(record) => summaries.push(record.summary()),
                Err(e) => warn!(file = %file_name, error = %e, "skipping unreadable result"),
            }
        }

        Ok(summaries)
    }

    /// Remove the record the identifier resolves to.
    pub fn delete(&self, identifier: &str) -> Result<Record> {
        let (path, record) = self.locate(identifier)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                info!(id = %record.id, file = %record.storage_key, "deleted result");
                Ok(record)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::not_found(identifier)),
            Err(e) => Err(Error::io("removing", path, e)),
        }
    }

    pub fn summarize(&self, identifier: &str) -> Result<RecordDigest> {
        let record = self.resolve(identifier)?;
        Ok(RecordDigest::from_record(&record))
    }

    /// Count result files and sum their on-disk sizes.
    pub fn stats(&self) -> Result<StoreStats> {
        let mut count = 0;
        let mut total_bytes: u64 = 0;

        for file_name in self.entries()? {
            match fs::metadata(self.dir.join(&file_name)) {
                Ok(meta) => {
                    count += 1;
                    total_bytes = total_bytes.saturating_add(meta.len());
                }
                // removed since enumeration
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io("reading", self.dir.join(&file_name), e)),
            }
        }

        let directory = fs::canonicalize(&self.dir).unwrap_or_else(|_| self.dir.clone());

        Ok(StoreStats { count, total_bytes, directory })
    }

    fn locate(&self, identifier: &str) -> Result<(PathBuf, Record)> {
        if identifier.is_empty() {
            return Err(Error::not_found(identifier));
        }

        if is_storage_key(identifier) {
            let path = self.dir.join(identifier);
            return match read_record(&path) {
                Ok(record) => Ok((path, record)),
                Err(Error::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                    Err(Error::not_found(identifier))
                }
                Err(e) => Err(e),
            };
        }

        let key = record::id_prefix(identifier);
        debug!(identifier, key, "resolving result");

        for file_name in self.entries()? {
            if !file_name.contains(key) {
                continue;
            }

            let path = self.dir.join(&file_name);
            let record = match read_record(&path) {
                Ok(record) => record,
                Err(Error::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                    debug!(file = %file_name, "result vanished during lookup");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if record.id.starts_with(identifier) {
                return Ok((path, record));
            }
        }

        Err(Error::not_found(identifier))
    }

    /// `.json` file names in reverse lexicographic order.
    fn entries(&self) -> Result<Vec<String>> {
        let read_dir = fs::read_dir(&self.dir).map_err(|e| Error::io("reading", &self.dir, e))?;

        let mut names: Vec<String> = read_dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".json"))
            .collect();

        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }
}

fn is_storage_key(identifier: &str) -> bool {
    identifier.ends_with(".json") && !identifier.contains(['/', '\\'])
}

fn read_record(path: &Path) -> Result<Record> {
    let bytes = fs::read(path).map_err(|e| Error::io("reading", path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
