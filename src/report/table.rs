//! Terminal tables for stored results.
//!
//! Formats:
//! - the record list, newest filename first
//! - a record digest
//! - store statistics and the api catalog

use std::collections::BTreeMap;

use crate::api::Statistics;
use crate::scan::ApiInfo;
use crate::store::{record, RecordDigest, RecordSummary};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn render_results(results: &[RecordSummary]) -> String {
    if results.is_empty() {
        return String::from("No results stored. Run 'hostscan scan --save' to create one.\n");
    }

    let mut output = String::new();
    output.push_str(&format!("{:<10} {:<24} {:<20} {}\n", "ID", "Name", "Date", "File"));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for summary in results {
        output.push_str(&format!(
            "{:<10} {:<24} {:<20} {}\n",
            record::id_prefix(&summary.id),
            truncate(&summary.name, 24),
            summary.created_at.format(TIME_FORMAT),
            summary.storage_key
        ));
    }

    output.push_str(&format!("\n{} result(s)\n", results.len()));
    output
}

pub fn render_digest(digest: &RecordDigest) -> String {
    let body = &digest.summary;
    let mut output = String::new();

    output.push_str(&format!("{} ({})\n", digest.name, digest.id));
    output.push_str(&format!("taken {}\n", digest.created_at.format(TIME_FORMAT)));

    output.push_str("\nSystem\n");
    output.push_str(&"-".repeat(40));
    output.push('\n');
    if body.system.is_empty() {
        output.push_str("  (not scanned)\n");
    }
    for (key, value) in &body.system {
        let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
        output.push_str(&format!("  {:20} {}\n", key, value));
    }

    output.push_str("\nCPU\n");
    output.push_str(&"-".repeat(40));
    output.push('\n');
    output.push_str(&line("physical cores", body.cpu.physical_cores, ""));
    output.push_str(&line("logical cores", body.cpu.logical_cores, ""));
    output.push_str(&line("usage", body.cpu.cpu_percent, "%"));

    output.push_str("\nMemory\n");
    output.push_str(&"-".repeat(40));
    output.push('\n');
    output.push_str(&line("total", body.memory.total_gb, " GB"));
    output.push_str(&line("used", body.memory.used_gb, " GB"));
    output.push_str(&line("usage", body.memory.percent, "%"));

    output.push_str("\nDisk\n");
    output.push_str(&"-".repeat(40));
    output.push('\n');
    output.push_str(&line("total", Some(body.disk.total_gb), " GB"));

    output
}

pub fn render_stats(stats: &Statistics) -> String {
    format!(
        "results:   {}\nsize:      {:.2} MB\ndirectory: {}\n",
        stats.total_results, stats.total_size_mb, stats.results_directory
    )
}

pub fn render_catalog(apis: &BTreeMap<String, ApiInfo>) -> String {
    let mut output = String::new();
    output.push_str(&format!("{:<18} {:<10} {}\n", "API", "Category", "Description"));
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for (name, info) in apis {
        output.push_str(&format!(
            "{:<18} {:<10} {}\n",
            name,
            info.category,
            truncate(&info.description, 50)
        ));
    }
    output
}

fn line<T: std::fmt::Display>(label: &str, value: Option<T>, unit: &str) -> String {
    match value {
        Some(value) => format!("  {label:20} {value}{unit}\n"),
        None => format!("  {label:20} n/a\n"),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Record;
    use chrono::NaiveDate;
    use serde_json::json;

    fn record(payload: serde_json::Value) -> Record {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(1, 2, 3))
            .unwrap();
        Record::new(
            "0123abcd-0000-4000-8000-000000000000".to_string(),
            "device_scan",
            at,
            payload,
        )
    }

    #[test]
    fn empty_list_suggests_saving() {
        assert!(render_results(&[]).starts_with("No results stored."));
    }

    #[test]
    fn list_shows_short_id_and_file() {
        let summary = record(json!({})).summary();
        let text = render_results(&[summary.clone()]);

        assert!(text.starts_with("ID"));
        assert!(text.contains("\n0123abcd   device_scan"));
        assert!(text.contains(&summary.storage_key));
        assert!(text.contains("2024-03-09 01:02:03"));
        assert!(text.ends_with("1 result(s)\n"));
    }

    #[test]
    fn digest_marks_missing_values() {
        let digest = RecordDigest::from_record(&record(json!({"cpu": {"percent": 12.5}})));
        let text = render_digest(&digest);

        assert!(text.contains("(not scanned)"));
        assert!(text.contains(&format!("  {:20} n/a\n", "usage")));
        assert!(text.contains(&format!("  {:20} 0 GB\n", "total")));
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("short", 30), "short");
        assert_eq!(truncate("a_very_long_name", 8), "a_ver...");
    }
}
