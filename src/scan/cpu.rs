//! Core counts, frequency and load.

use serde_json::json;

use crate::util::round2;
use super::probe::{Probe, ProbeContext, ProbeResult, ScanKind};

pub struct CpuProbe;

impl Probe for CpuProbe {
    fn kind(&self) -> ScanKind {
        ScanKind::Cpu
    }

    fn collect(&self, ctx: &mut ProbeContext) -> ProbeResult {
        let system = ctx.system();
        let cpus = system.cpus();

        if cpus.is_empty() {
            return ProbeResult::with_error("no cpu information available".into());
        }

        let frequency = cpus.iter().map(|cpu| cpu.frequency()).max().filter(|&mhz| mhz > 0);
        let per_cpu: Vec<f64> = cpus.iter().map(|cpu| round2(f64::from(cpu.cpu_usage()))).collect();

        ProbeResult::new(json!({
            "physical_cores": num_cpus::get_physical(),
            "logical_cores": num_cpus::get(),
            "cpu_freq_mhz": frequency,
            "cpu_percent": round2(f64::from(system.global_cpu_usage())),
            "per_cpu_percent": per_cpu,
        }))
    }
}
