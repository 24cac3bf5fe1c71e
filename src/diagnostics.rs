// ABOUTME: Diagnostics accumulator for non-fatal warnings during a sweep.
// ABOUTME: Collects warnings that shouldn't fail a run but should be shown to users.

use serde::Serialize;

/// Collects non-fatal warnings during a run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A backing system was installed but skipped.
    pub fn system_skipped(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SystemSkipped,
            message: message.into(),
        }
    }

    /// Probing succeeded only partially (e.g. namespace listing failed).
    pub fn probe_degraded(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ProbeDegraded,
            message: message.into(),
        }
    }

    /// The closing usage snapshot could not be taken.
    pub fn snapshot_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SnapshotUnavailable,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Installed system did not answer its status query.
    SystemSkipped,
    /// Part of the probe failed after the system answered.
    ProbeDegraded,
    /// Disk usage snapshot failed.
    SnapshotUnavailable,
}
