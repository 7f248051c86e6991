//! Top processes by cpu and memory usage.

use serde::Serialize;
use serde_json::json;

use crate::util::round2;
use super::probe::{Probe, ProbeContext, ProbeResult, ScanKind};

const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ProcessEntry {
    pid: u32,
    name: String,
    cpu_percent: f64,
    memory_percent: f64,
}

pub struct ProcessProbe;

impl Probe for ProcessProbe {
    fn kind(&self) -> ScanKind {
        ScanKind::Process
    }

    fn collect(&self, ctx: &mut ProbeContext) -> ProbeResult {
        let system = ctx.system();
        let total_memory = system.total_memory();

        let processes: Vec<ProcessEntry> = system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().to_string(),
                cpu_percent: round2(f64::from(process.cpu_usage())),
                memory_percent: if total_memory > 0 {
                    round2(process.memory() as f64 / total_memory as f64 * 100.0)
                } else {
                    0.0
                },
            })
            .collect();

        ProbeResult::new(json!({
            "top_cpu": top_by(&processes, |p| p.cpu_percent),
            "top_memory": top_by(&processes, |p| p.memory_percent),
        }))
    }
}

fn top_by(processes: &[ProcessEntry], key: impl Fn(&ProcessEntry) -> f64) -> Vec<ProcessEntry> {
    let mut sorted = processes.to_vec();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)).then(a.pid.cmp(&b.pid)));
    sorted.truncate(TOP_N);
    sorted
}
