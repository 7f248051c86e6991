pub mod json;
pub mod markdown;
pub mod table;

use crate::scan::ScanResult;
use crate::util::format_bytes;

/// Scan timing and diagnostics. Goes to stderr so stdout stays valid JSON.
pub fn print_scan_info(result: &ScanResult, verbose: bool) {
    if let Some(duration_ms) = result.duration_ms {
        let duration_sec = duration_ms as f64 / 1000.0;
        eprintln!("scan completed in {duration_sec:.2}s");

        if verbose {
            if let Some(peak_bytes) = result.peak_memory_bytes {
                eprintln!("peak memory: {}", format_bytes(peak_bytes as u64));
            }
        }
    }

    print_diagnostics(result, verbose);
}

fn print_diagnostics(result: &ScanResult, verbose: bool) {
    if result.diagnostics.is_empty() {
        return;
    }

    if verbose {
        eprintln!("Diagnostics:");
        eprintln!("{}", "-".repeat(40));
        for diagnostic in &result.diagnostics {
            eprintln!("  {diagnostic}");
        }
    } else {
        for diagnostic in &result.diagnostics {
            eprintln!("[diagnostic] {diagnostic}");
        }
    }
}
