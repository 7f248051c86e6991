const GIB: f64 = 1_024_f64 * 1_024_f64 * 1_024_f64;

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1_024_f64 && unit < UNITS.len() - 1 {
        size /= 1_024_f64;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

/// Round to two decimal places, the precision reported for sizes and percentages.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    round2(bytes as f64 / GIB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_binary_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1_536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1_024 * 1_024 * 1_024), "3.0 GB");
    }

    #[test]
    fn gigabytes_are_rounded() {
        assert_eq!(bytes_to_gb(0), 0.0);
        assert_eq!(bytes_to_gb(16 * 1_024 * 1_024 * 1_024), 16.0);
        assert_eq!(bytes_to_gb(1_610_612_736), 1.5);
        assert_eq!(round2(33.333_333), 33.33);
    }
}
