//! Host metric collection.
//!
//! Each probe fills one section of the scan payload. A scan runs every
//! probe in scope and merges the sections into one JSON object keyed by
//! section name. The payload is opaque to the result store.

pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod memory;
pub mod network;
pub mod probe;
pub mod process;
pub mod system;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use probe::{Probe, ProbeContext, ProbeResult};
pub use probe::{ScanKind, ScanScope};

#[derive(Serialize)]
pub struct ScanResult {
    pub payload: Map<String, Value>,
    pub diagnostics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_memory_bytes: Option<usize>,
}

impl ScanResult {
    pub fn empty() -> Self {
        ScanResult {
            payload: Map::new(),
            diagnostics: Vec::new(),
            duration_ms: None,
            peak_memory_bytes: None,
        }
    }

    fn merge(&mut self, name: &str, result: ProbeResult) {
        self.payload.insert(name.to_string(), result.section);
        self.diagnostics
            .extend(result.diagnostics.into_iter().map(|d| format!("{name}: {d}")));
    }

    pub fn into_payload(self) -> Value {
        Value::Object(self.payload)
    }
}

fn probe_for(kind: ScanKind) -> Box<dyn Probe> {
    match kind {
        ScanKind::System => Box::new(system::SystemProbe),
        ScanKind::Cpu => Box::new(cpu::CpuProbe),
        ScanKind::Memory => Box::new(memory::MemoryProbe),
        ScanKind::Gpu => Box::new(gpu::GpuProbe),
        ScanKind::Disk => Box::new(disk::DiskProbe),
        ScanKind::Network => Box::new(network::NetworkProbe),
        ScanKind::Process => Box::new(process::ProcessProbe),
        ScanKind::Uptime => Box::new(system::UptimeProbe),
    }
}

/// Run every probe in scope. Blocks for at least the sysinfo refresh
/// interval when any probe needs usage figures.
pub fn run(scope: ScanScope) -> ScanResult {
    let start = std::time::Instant::now();
    let mut scan_result = ScanResult::empty();
    let mut ctx = ProbeContext::new();
    let mut peak_memory = current_rss();

    for kind in scope.kinds() {
        let probe = probe_for(kind);
        let probe_start = std::time::Instant::now();

        let result = probe.collect(&mut ctx);

        debug!(
            probe = probe.kind().as_str(),
            elapsed_ms = probe_start.elapsed().as_millis() as u64,
            diagnostics = result.diagnostics.len(),
            "probe complete"
        );

        peak_memory = peak_memory.max(current_rss());
        scan_result.merge(kind.as_str(), result);
    }

    scan_result.duration_ms = Some(start.elapsed().as_millis());
    scan_result.peak_memory_bytes = peak_memory;

    info!(
        sections = scan_result.payload.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "scan finished"
    );

    scan_result
}

fn current_rss() -> Option<usize> {
    memory_stats::memory_stats().map(|stats| stats.physical_mem)
}

/// Producer of scan payloads for the scan service.
pub trait MetricSource: Send + Sync {
    fn scan(&self, scope: ScanScope) -> ScanResult;
}

/// Probes the machine the process runs on.
pub struct HostSource;

impl MetricSource for HostSource {
    fn scan(&self, scope: ScanScope) -> ScanResult {
        run(scope)
    }
}

/// Description of one scan operation, served by the api catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub description: String,
    pub returns: String,
    pub category: String,
}

pub fn catalog() -> BTreeMap<String, ApiInfo> {
    let entries = [
        (
            "get_system_info",
            "Retrieve operating system and platform information",
            "System platform, release, architecture, processor, hostname",
            "System",
        ),
        (
            "get_cpu_info",
            "Retrieve CPU specifications and usage",
            "Physical/logical cores, frequency, CPU usage percentage",
            "CPU",
        ),
        (
            "get_memory_info",
            "Retrieve RAM and memory usage information",
            "Total, available, used memory in GB, memory percentage",
            "Memory",
        ),
        (
            "get_gpu_info",
            "Retrieve GPU information if available",
            "GPU list (empty when no probe is available)",
            "GPU",
        ),
        (
            "get_disk_info",
            "Retrieve disk partitions and usage information",
            "Disk device, mount point, total/used/free space, usage percentage",
            "Storage",
        ),
        (
            "get_network_info",
            "Retrieve network interface information",
            "Network interface names, MAC and IP addresses with prefix length",
            "Network",
        ),
        (
            "get_process_info",
            "Retrieve top processes by CPU and memory usage",
            "Top running processes with PID, name, CPU and memory usage",
            "Process",
        ),
        (
            "get_uptime",
            "Retrieve system uptime and boot time",
            "System uptime in days/hours/minutes, boot timestamp",
            "System",
        ),
        (
            "scan_all",
            "Perform complete device scan",
            "All device information combined",
            "Scan",
        ),
    ];

    entries
        .into_iter()
        .map(|(name, description, returns, category)| {
            let info = ApiInfo {
                description: description.to_string(),
                returns: returns.to_string(),
                category: category.to_string(),
            };
            (name.to_string(), info)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_only_scan_has_single_section() {
        let result = run(ScanScope::Only(ScanKind::Gpu));
        assert_eq!(result.payload.len(), 1);
        assert_eq!(result.payload["gpu"]["gpus"], serde_json::json!([]));
        assert!(result.duration_ms.is_some());
    }

    #[test]
    fn merge_prefixes_diagnostics_with_section() {
        let mut result = ScanResult::empty();
        result.merge("disk", ProbeResult::with_error("denied".into()));
        assert_eq!(result.diagnostics, vec!["disk: denied".to_string()]);
        assert_eq!(result.payload["disk"]["error"], "denied");
    }

    #[test]
    fn catalog_lists_every_probe_and_full_scan() {
        let apis = catalog();
        assert_eq!(apis.len(), ScanKind::ALL.len() + 1);
        assert_eq!(apis["scan_all"].category, "Scan");
        assert_eq!(apis["get_cpu_info"].category, "CPU");
    }
}
