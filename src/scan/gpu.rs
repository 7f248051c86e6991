use serde_json::json;

use super::probe::{Probe, ProbeContext, ProbeResult, ScanKind};

/// Placeholder section: there is no portable way to query GPUs without
/// vendor libraries, so the section is always present but empty.
pub struct GpuProbe;

impl Probe for GpuProbe {
    fn kind(&self) -> ScanKind {
        ScanKind::Gpu
    }

    fn collect(&self, _ctx: &mut ProbeContext) -> ProbeResult {
        ProbeResult::new(json!({
            "gpus": [],
            "note": "gpu probing is not supported on this build",
        }))
    }
}
