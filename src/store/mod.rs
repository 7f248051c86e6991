//! Flat-directory result storage.
//!
//! Persists scan results as one JSON file per record in a results directory:
//! - filename: `<name>_<YYYYMMDD_HHMMSS>_<first 8 chars of id>.json`
//! - content: test_id, test_name, timestamp, scan_data, filename
//!
//! Supports:
//! - Atomic save with collision retry
//! - Lookup by full id, id prefix, or filename
//! - Listing, digests, deletion and directory statistics

pub mod digest;
pub mod record;
pub mod results;

pub use digest::RecordDigest;
pub use record::{Record, RecordSummary, DEFAULT_NAME};
pub use results::{ResultStore, StoreStats};
