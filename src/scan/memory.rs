//! RAM totals and usage, reported in GB.

use serde_json::{json, Value};

use crate::util::{bytes_to_gb, round2};
use super::probe::{Probe, ProbeContext, ProbeResult, ScanKind};

pub struct MemoryProbe;

impl Probe for MemoryProbe {
    fn kind(&self) -> ScanKind {
        ScanKind::Memory
    }

    fn collect(&self, ctx: &mut ProbeContext) -> ProbeResult {
        let system = ctx.system();
        let total = system.total_memory();

        if total == 0 {
            return ProbeResult::with_error("no memory information available".into());
        }

        ProbeResult::new(memory_section(total, system.available_memory(), system.used_memory()))
    }
}

fn memory_section(total: u64, available: u64, used: u64) -> Value {
    let percent = if total > 0 {
        round2(used as f64 / total as f64 * 100.0)
    } else {
        0.0
    };

    json!({
        "total_gb": bytes_to_gb(total),
        "available_gb": bytes_to_gb(available),
        "used_gb": bytes_to_gb(used),
        "percent": percent,
    })
}
