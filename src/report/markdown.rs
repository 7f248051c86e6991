//! Markdown device report.
//!
//! One section per probe followed by the api reference. Sections missing
//! from the payload are skipped; a failed probe renders its error.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::scan::ApiInfo;

pub fn render(payload: &Value, apis: &BTreeMap<String, ApiInfo>, generated: NaiveDateTime) -> String {
    let mut out = String::new();

    out.push_str("# Device Information Report\n\n");
    let _ = writeln!(out, "**Generated:** {}\n", generated.format("%Y-%m-%d %H:%M:%S"));
    out.push_str("---\n\n");

    if let Some(system) = section(payload, "system", "System Information", &mut out) {
        property_table(&mut out);
        if let Some(fields) = system.as_object() {
            for (key, value) in fields {
                row(&mut out, &title_case(key), &cell(Some(value)));
            }
        }
        out.push('\n');
    }

    if let Some(cpu) = section(payload, "cpu", "CPU Information", &mut out) {
        property_table(&mut out);
        row(&mut out, "Physical Cores", &cell(cpu.get("physical_cores")));
        row(&mut out, "Logical Cores", &cell(cpu.get("logical_cores")));
        row(&mut out, "CPU Frequency (MHz)", &cell(cpu.get("cpu_freq_mhz")));
        row(&mut out, "Current CPU Usage", &format!("{}%", cell(cpu.get("cpu_percent"))));

        out.push_str("\n### Per-Core CPU Usage\n\n");
        for (i, usage) in array(cpu.get("per_cpu_percent")).iter().enumerate() {
            let _ = writeln!(out, "- Core {i}: `{}%`", cell(Some(usage)));
        }
        out.push('\n');
    }

    if let Some(memory) = section(payload, "memory", "Memory Information", &mut out) {
        property_table(&mut out);
        row(&mut out, "Total RAM", &format!("{} GB", cell(memory.get("total_gb"))));
        row(&mut out, "Used RAM", &format!("{} GB", cell(memory.get("used_gb"))));
        row(&mut out, "Available RAM", &format!("{} GB", cell(memory.get("available_gb"))));
        row(&mut out, "Memory Usage", &format!("{}%", cell(memory.get("percent"))));
        out.push('\n');
    }

    if let Some(gpu) = section(payload, "gpu", "GPU Information", &mut out) {
        let gpus = array(gpu.get("gpus"));
        if gpus.is_empty() {
            let note = gpu.get("note").and_then(Value::as_str).unwrap_or("No GPU detected");
            let _ = writeln!(out, "{note}\n");
        }
        for (i, device) in gpus.iter().enumerate() {
            let _ = writeln!(out, "### GPU {i}: {}\n", cell(device.get("name")));
        }
    }

    if let Some(disks) = section(payload, "disk", "Storage Information", &mut out) {
        if let Some(volumes) = disks.as_object() {
            for (device, info) in volumes {
                let _ = writeln!(out, "### {device}\n");
                property_table(&mut out);
                row(&mut out, "Mount Point", &cell(info.get("mountpoint")));
                row(&mut out, "File System", &cell(info.get("fstype")));
                row(&mut out, "Total Space", &format!("{} GB", cell(info.get("total_gb"))));
                row(&mut out, "Used Space", &format!("{} GB", cell(info.get("used_gb"))));
                row(&mut out, "Free Space", &format!("{} GB", cell(info.get("free_gb"))));
                row(&mut out, "Usage", &format!("{}%", cell(info.get("percent"))));
                out.push('\n');
            }
        }
    }

    if let Some(networks) = section(payload, "network", "Network Information", &mut out) {
        if let Some(interfaces) = networks.as_object() {
            for (name, interface) in interfaces {
                let _ = writeln!(out, "### Interface: {name}\n");
                let _ = writeln!(out, "**MAC:** `{}`\n", cell(interface.get("mac")));
                out.push_str("| Family | Address | Prefix |\n");
                out.push_str("|--------|---------|--------|\n");
                for addr in array(interface.get("addresses")) {
                    let _ = writeln!(
                        out,
                        "| `{}` | `{}` | `{}` |",
                        cell(addr.get("family")),
                        cell(addr.get("address")),
                        cell(addr.get("prefix"))
                    );
                }
                out.push('\n');
            }
        }
    }

    if let Some(process) = section(payload, "process", "Process Information", &mut out) {
        process_table(&mut out, "Top 5 Processes by CPU Usage", process.get("top_cpu"));
        process_table(&mut out, "Top 5 Processes by Memory Usage", process.get("top_memory"));
    }

    if let Some(uptime) = section(payload, "uptime", "System Uptime", &mut out) {
        property_table(&mut out);
        row(
            &mut out,
            "Uptime",
            &format!(
                "{} days, {} hours, {} minutes",
                cell(uptime.get("uptime_days")),
                cell(uptime.get("uptime_hours")),
                cell(uptime.get("uptime_minutes"))
            ),
        );
        row(&mut out, "Total Uptime (seconds)", &cell(uptime.get("uptime_seconds")));
        out.push('\n');
    }

    api_reference(&mut out, apis);
    out
}

// writes the heading; returns None when the section is absent or failed
fn section<'a>(payload: &'a Value, key: &str, heading: &str, out: &mut String) -> Option<&'a Value> {
    let value = payload.get(key)?;
    let _ = writeln!(out, "## {heading}\n");

    match value.get("error") {
        Some(error) => {
            let _ = writeln!(out, "Error: {}\n", cell(Some(error)));
            None
        }
        None => Some(value),
    }
}

fn api_reference(out: &mut String, apis: &BTreeMap<String, ApiInfo>) {
    out.push_str("## API Reference\n\n");

    let mut by_category: BTreeMap<&str, Vec<(&String, &ApiInfo)>> = BTreeMap::new();
    for (name, info) in apis {
        by_category.entry(info.category.as_str()).or_default().push((name, info));
    }

    for (category, methods) in by_category {
        let _ = writeln!(out, "### {category}\n");
        for (name, info) in methods {
            let _ = writeln!(out, "#### `{name}`\n");
            let _ = writeln!(out, "**Description:** {}\n", info.description);
            let _ = writeln!(out, "**Returns:** {}\n", info.returns);
        }
    }
}

fn process_table(out: &mut String, heading: &str, processes: Option<&Value>) {
    let _ = writeln!(out, "### {heading}\n");
    let processes = array(processes);
    if processes.is_empty() {
        return;
    }

    out.push_str("| PID | Name | CPU % | Memory % |\n");
    out.push_str("|-----|------|-------|----------|\n");
    for p in processes {
        let _ = writeln!(
            out,
            "| `{}` | {} | `{}%` | `{}%` |",
            cell(p.get("pid")),
            cell(p.get("name")),
            cell(p.get("cpu_percent")),
            cell(p.get("memory_percent"))
        );
    }
    out.push('\n');
}

fn property_table(out: &mut String) {
    out.push_str("| Property | Value |\n");
    out.push_str("|----------|-------|\n");
}

fn row(out: &mut String, property: &str, value: &str) {
    let _ = writeln!(out, "| {property} | `{value}` |");
}

fn array(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
