//! Host hardware and OS scanner.
//!
//! Probes the local machine, persists scans as JSON records in a flat
//! results directory and serves them over http to remote clients.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod platform;
pub mod report;
pub mod scan;
pub mod server;
pub mod store;
pub mod util;

pub use error::{Error, ErrorKind, Result};
