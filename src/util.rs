use chrono::{DateTime, FixedOffset};

const UNITS: [&str; 6] = ["KB", "MB", "GB", "TB", "PB", "EB"];

/// Human-readable byte count, scaled by 1024 with one decimal.
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}", bytes as f64 / div as f64, UNITS[exp])
}

/// Full timestamp for reports and the dashboard footer.
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Compact timestamp for chart axis labels.
pub fn format_label(ts: &DateTime<FixedOffset>) -> String {
    ts.format("%d.%m %H:%M").to_string()
}
