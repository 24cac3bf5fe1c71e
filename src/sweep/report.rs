// ABOUTME: Run report: per-action tally, failures, reclaimed space and usage snapshot.
// ABOUTME: Renders as tagged text or serializes whole for JSON output.

use super::executor::ExecutionResult;
use super::level::CleanupLevel;
use super::policy::Skip;
use super::system::BackingSystem;
use crate::diagnostics::Warning;
use crate::engine::DiskUsage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

/// Everything that happened in one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub host: String,
    pub level: CleanupLevel,
    pub systems: Vec<BackingSystem>,
    pub results: Vec<ExecutionResult>,
    pub skipped: Vec<Skip>,
    pub warnings: Vec<Warning>,
    /// Engine disk usage after the sweep, when it could be taken.
    pub usage: Option<DiskUsage>,
}

impl RunReport {
    pub fn new(level: CleanupLevel, systems: Vec<BackingSystem>) -> Self {
        Self {
            started_at: Utc::now(),
            host: gethostname::gethostname().to_string_lossy().into_owned(),
            level,
            systems,
            results: Vec::new(),
            skipped: Vec::new(),
            warnings: Vec::new(),
            usage: None,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| !r.succeeded)
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// Sum of the space backends reported as reclaimed.
    pub fn total_reclaimed(&self) -> u64 {
        self.results.iter().filter_map(|r| r.reclaimed_bytes).sum()
    }

    /// Human-readable summary followed by the usage snapshot.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Summary for {} (level {}): {} succeeded, {} failed, {} reclaimed",
            self.host,
            self.level,
            self.succeeded(),
            self.failed_count(),
            format_bytes(self.total_reclaimed())
        );
        for result in self.failed() {
            let _ = writeln!(out, "  failed: {}: {}", result.action, result.detail);
        }

        let _ = writeln!(out);
        match &self.usage {
            Some(usage) => out.push_str(&render_usage(usage)),
            None => {
                let _ = writeln!(out, "Disk usage snapshot unavailable");
            }
        }
        out
    }
}

/// Render the engine usage table in the familiar `system df` layout.
pub fn render_usage(usage: &DiskUsage) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<15} {:>6} {:>7} {:>10} {:>12}",
        "TYPE", "TOTAL", "ACTIVE", "SIZE", "RECLAIMABLE"
    );
    for (label, row) in usage.rows() {
        let _ = writeln!(
            out,
            "{:<15} {:>6} {:>7} {:>10} {:>12}",
            label,
            row.total,
            row.active,
            format_bytes(row.size_bytes),
            format_bytes(row.reclaimable_bytes)
        );
    }
    out
}

/// Format a byte count with decimal units, as the engine CLIs do.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}B")
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PruneTarget, UsageRow};
    use crate::sweep::action::ReclaimAction;
    use std::time::Duration;

    fn result(succeeded: bool, bytes: Option<u64>) -> ExecutionResult {
        ExecutionResult {
            action: ReclaimAction::prune(PruneTarget::Networks),
            succeeded,
            detail: if succeeded { "ok" } else { "boom" }.to_string(),
            notes: Vec::new(),
            reclaimed_bytes: bytes,
            duration: Duration::from_millis(5),
            error_kind: None,
        }
    }

    #[test]
    fn formats_bytes_with_decimal_units() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(999), "999B");
        assert_eq!(format_bytes(1_500), "1.5kB");
        assert_eq!(format_bytes(2_340_000_000), "2.3GB");
    }

    #[test]
    fn tallies_and_lists_failures() {
        let mut report = RunReport::new(CleanupLevel::Regular, Vec::new());
        report.results = vec![
            result(true, Some(1_000)),
            result(false, None),
            result(true, Some(500)),
        ];

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.total_reclaimed(), 1_500);

        let text = report.render();
        assert!(text.contains("2 succeeded, 1 failed, 1.5kB reclaimed"));
        assert!(text.contains("failed: [container engine] prune unused networks: boom"));
        assert!(text.contains("Disk usage snapshot unavailable"));
    }

    #[test]
    fn usage_table_lists_every_row() {
        let usage = DiskUsage {
            images: UsageRow {
                total: 3,
                active: 1,
                size_bytes: 3_000_000,
                reclaimable_bytes: 2_000_000,
            },
            ..Default::default()
        };
        let table = render_usage(&usage);
        for label in ["Images", "Containers", "Local Volumes", "Build Cache"] {
            assert!(table.contains(label), "{label} missing");
        }
        assert!(table.contains("3.0MB"));
    }
}
