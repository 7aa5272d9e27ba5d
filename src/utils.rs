//! # Utility Functions
//!
//! Identifiers for executions and helpers to present statistics on the
//! console.

use std::time::Duration;
use uuid::Uuid;

use crate::stats::{StatsSummary, TestPlanStats};

/// Unique identifier for one bridge execution.
///
/// Used to name the execution's temporary directory and staging files, so
/// concurrent executions never collide. Safe to call from any thread.
pub fn generate_execution_id() -> String {
    Uuid::new_v4().to_string()
}

/// Format a duration in a human-readable way
///
/// ```rust
/// # use jmeter_dsl::utils::format_duration;
/// # use std::time::Duration;
/// assert_eq!(format_duration(Duration::from_nanos(750)), "750ns");
/// assert_eq!(format_duration(Duration::from_micros(2500)), "2.50ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ns = duration.as_nanos();

    if total_ns < 1_000 {
        format!("{}ns", total_ns)
    } else if total_ns < 1_000_000 {
        format!("{:.2}μs", total_ns as f64 / 1_000.0)
    } else if total_ns < 1_000_000_000 {
        format!("{:.2}ms", total_ns as f64 / 1_000_000.0)
    } else if total_ns < 60_000_000_000 {
        format!("{:.2}s", total_ns as f64 / 1_000_000_000.0)
    } else {
        let seconds = duration.as_secs();
        let minutes = seconds / 60;
        let remaining_seconds = seconds % 60;

        if minutes < 60 {
            format!("{}m {}s", minutes, remaining_seconds)
        } else {
            let hours = minutes / 60;
            let remaining_minutes = minutes % 60;
            format!("{}h {}m {}s", hours, remaining_minutes, remaining_seconds)
        }
    }
}

/// Format a byte count with binary (1024-based) units
///
/// ```rust
/// # use jmeter_dsl::utils::format_bytes;
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1536), "1.50 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Format a per-second rate, e.g. samples per second.
pub fn format_rate(per_second: f64) -> String {
    if per_second >= 1_000_000.0 {
        format!("{:.2}M/s", per_second / 1_000_000.0)
    } else if per_second >= 1_000.0 {
        format!("{:.2}K/s", per_second / 1_000.0)
    } else {
        format!("{:.2}/s", per_second)
    }
}

/// Print a table row with fixed column widths
pub fn print_table_row(columns: &[&str], widths: &[usize]) {
    print!("|");
    for (i, column) in columns.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(10);
        print!(" {:width$} |", column, width = width);
    }
    println!();
}

/// Print a table separator
///
/// ```text
/// +----------+---------+--------+
/// | Label    | Samples | Errors |
/// +----------+---------+--------+
/// ```
pub fn print_table_separator(widths: &[usize]) {
    print!("+");
    for &width in widths {
        print!("{}", "-".repeat(width + 2));
        print!("+");
    }
    println!();
}

const STATS_HEADER: [&str; 7] = [
    "Label", "Samples", "Errors", "Throughput", "Median", "P99", "Received",
];

fn summary_row(label: &str, summary: &StatsSummary) -> [String; 7] {
    [
        label.to_string(),
        summary.samples_count().to_string(),
        summary.errors_count().to_string(),
        format_rate(summary.samples.per_second),
        format_duration(summary.sample_time.median),
        format_duration(summary.sample_time_percentile99()),
        format_bytes(summary.received_bytes.total),
    ]
}

/// Print per-label statistics followed by the overall row.
pub fn print_stats_table(stats: &TestPlanStats) {
    let mut rows: Vec<[String; 7]> = stats
        .labels
        .iter()
        .map(|(label, summary)| summary_row(label, summary))
        .collect();
    rows.push(summary_row("TOTAL", &stats.overall));

    let widths: Vec<usize> = (0..STATS_HEADER.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(STATS_HEADER[col].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    print_table_separator(&widths);
    print_table_row(&STATS_HEADER, &widths);
    print_table_separator(&widths);
    for row in &rows {
        let columns: Vec<&str> = row.iter().map(String::as_str).collect();
        print_table_row(&columns, &widths);
    }
    print_table_separator(&widths);
    println!("Test duration: {}", format_duration(stats.duration));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_ids_are_unique() {
        let first = generate_execution_id();
        let second = generate_execution_id();
        assert_ne!(first, second);
        assert_eq!(first.len(), 36);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_nanos(500)), "500ns");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.50ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h 2m 3s");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1572864), "1.50 MB");
        assert_eq!(format_bytes(1610612736), "1.50 GB");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(12.5), "12.50/s");
        assert_eq!(format_rate(1500.0), "1.50K/s");
        assert_eq!(format_rate(2_500_000.0), "2.50M/s");
    }
}
