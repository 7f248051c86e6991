//! Operating system identity and uptime.

use chrono::Local;
use serde_json::json;
use sysinfo::System;

use crate::platform;
use super::probe::{Probe, ProbeContext, ProbeResult, ScanKind};

pub struct SystemProbe;

impl Probe for SystemProbe {
    fn kind(&self) -> ScanKind {
        ScanKind::System
    }

    fn collect(&self, ctx: &mut ProbeContext) -> ProbeResult {
        let processor = ctx
            .system()
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .unwrap_or_default();

        ProbeResult::new(json!({
            "platform": System::name(),
            "platform_release": System::kernel_version(),
            "platform_version": System::os_version(),
            "architecture": std::env::consts::ARCH,
            "processor": processor,
            "hostname": System::host_name(),
            "os_family": platform::detect().as_str(),
            "wsl": platform::is_wsl(),
        }))
    }
}

pub struct UptimeProbe;

impl Probe for UptimeProbe {
    fn kind(&self) -> ScanKind {
        ScanKind::Uptime
    }

    fn collect(&self, _ctx: &mut ProbeContext) -> ProbeResult {
        let boot_time = System::boot_time();
        if boot_time == 0 {
            return ProbeResult::with_error("boot time unavailable".into());
        }

        let now = Local::now().timestamp().max(0) as u64;
        ProbeResult::new(uptime_section(boot_time, now.saturating_sub(boot_time)))
    }
}

fn uptime_section(boot_timestamp: u64, uptime_seconds: u64) -> serde_json::Value {
    json!({
        "boot_timestamp": boot_timestamp,
        "uptime_days": uptime_seconds / 86_400,
        "uptime_hours": (uptime_seconds % 86_400) / 3_600,
        "uptime_minutes": (uptime_seconds % 3_600) / 60,
        "uptime_seconds": uptime_seconds,
    })
}
