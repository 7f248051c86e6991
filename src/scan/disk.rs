//! Mounted volumes and their capacity.
//!
//! Keyed by device name. Devices mounted more than once (bind mounts,
//! overlay filesystems) get the mount point appended so no volume is dropped.

use serde_json::{json, Map, Value};
use sysinfo::Disks;

use crate::util::{bytes_to_gb, round2};
use super::probe::{Probe, ProbeContext, ProbeResult, ScanKind};

pub struct DiskProbe;

impl Probe for DiskProbe {
    fn kind(&self) -> ScanKind {
        ScanKind::Disk
    }

    fn collect(&self, _ctx: &mut ProbeContext) -> ProbeResult {
        let disks = Disks::new_with_refreshed_list();
        let mut volumes = Map::new();

        for disk in disks.list() {
            let device = disk.name().to_string_lossy().to_string();
            let mountpoint = disk.mount_point().to_string_lossy().to_string();

            let key = if volumes.contains_key(&device) {
                format!("{device} ({mountpoint})")
            } else {
                device
            };

            volumes.insert(
                key,
                volume_section(
                    &mountpoint,
                    &disk.file_system().to_string_lossy(),
                    disk.total_space(),
                    disk.available_space(),
                ),
            );
        }

        let mut result = ProbeResult::new(Value::Object(volumes));
        if disks.list().is_empty() {
            result.diagnostics.push("no mounted volumes reported".into());
        }
        result
    }
}

fn volume_section(mountpoint: &str, fstype: &str, total: u64, available: u64) -> Value {
    let used = total.saturating_sub(available);
    let percent = if total > 0 {
        round2(used as f64 / total as f64 * 100.0)
    } else {
        0.0
    };

    json!({
        "mountpoint": mountpoint,
        "fstype": fstype,
        "total_gb": bytes_to_gb(total),
        "used_gb": bytes_to_gb(used),
        "free_gb": bytes_to_gb(available),
        "percent": percent,
    })
}
