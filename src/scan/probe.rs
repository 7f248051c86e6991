use std::fmt;
use std::str::FromStr;
use std::thread;

use serde::Serialize;
use serde_json::{json, Value};
use sysinfo::System;

use crate::error::Error;

/// One section of a host scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanKind {
    System,
    Cpu,
    Memory,
    Gpu,
    Disk,
    Network,
    Process,
    Uptime,
}

impl ScanKind {
    pub const ALL: [ScanKind; 8] = [
        ScanKind::System,
        ScanKind::Cpu,
        ScanKind::Memory,
        ScanKind::Gpu,
        ScanKind::Disk,
        ScanKind::Network,
        ScanKind::Process,
        ScanKind::Uptime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanKind::System => "system",
            ScanKind::Cpu => "cpu",
            ScanKind::Memory => "memory",
            ScanKind::Gpu => "gpu",
            ScanKind::Disk => "disk",
            ScanKind::Network => "network",
            ScanKind::Process => "process",
            ScanKind::Uptime => "uptime",
        }
    }
}

impl fmt::Display for ScanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScanKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::Validation(format!("unknown info type: {s}")))
    }
}

/// What a scan covers: every probe, or a single section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanScope {
    #[default]
    Full,
    Only(ScanKind),
}

impl ScanScope {
    pub fn kinds(&self) -> Vec<ScanKind> {
        match self {
            ScanScope::Full => ScanKind::ALL.to_vec(),
            ScanScope::Only(kind) => vec![*kind],
        }
    }
}

impl FromStr for ScanScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "full" {
            Ok(ScanScope::Full)
        } else {
            s.parse().map(ScanScope::Only)
        }
    }
}

pub struct ProbeResult {
    pub section: Value,
    pub diagnostics: Vec<String>,
}

impl ProbeResult {
    pub fn new(section: Value) -> Self {
        ProbeResult {
            section,
            diagnostics: Vec::new(),
        }
    }

    /// A failed section keeps its slot in the payload as `{"error": ...}`.
    pub fn with_error(message: String) -> Self {
        ProbeResult {
            section: json!({ "error": message.clone() }),
            diagnostics: vec![message],
        }
    }
}

/// Shared sampling state for one scan. The sysinfo snapshot is taken on first
/// use and reused by every probe that needs it.
pub struct ProbeContext {
    system: Option<System>,
}

impl ProbeContext {
    pub fn new() -> Self {
        ProbeContext { system: None }
    }

    /// Usage figures need two refreshes separated by the minimum interval.
    pub fn system(&mut self) -> &System {
        self.system.get_or_insert_with(|| {
            let mut system = System::new_all();
            thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
            system.refresh_all();
            system
        })
    }
}

impl Default for ProbeContext {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Probe {
    fn kind(&self) -> ScanKind;
    fn collect(&self, ctx: &mut ProbeContext) -> ProbeResult;
}
