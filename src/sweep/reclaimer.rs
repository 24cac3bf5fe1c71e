// ABOUTME: Top-level reclaimer flow tying the sweep states to user-facing output.
// ABOUTME: Probe, show plan, confirm, execute and report; dry runs stop after the plan.

use super::backends::Backends;
use super::confirm::Confirm;
use super::level::CleanupLevel;
use super::machine::{Decision, Sweep};
use super::policy::{Plan, Policy, SkipReason};
use super::report::RunReport;
use super::system::Availability;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::output::Output;
use std::time::Duration;

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every action ran; report printed.
    Completed(RunReport),
    /// The user declined; nothing ran.
    Cancelled(Plan),
    /// `--dry-run`: plan printed, nothing ran.
    DryRun(Plan),
}

impl RunOutcome {
    /// Number of actions that were executed.
    pub fn executed(&self) -> usize {
        match self {
            RunOutcome::Completed(report) => report.results.len(),
            RunOutcome::Cancelled(_) | RunOutcome::DryRun(_) => 0,
        }
    }
}

/// Drives one cleanup run against a set of backends.
pub struct Reclaimer<'a> {
    backends: &'a Backends,
    policy: Policy,
    output: &'a Output,
    stop_timeout: Duration,
    dry_run: bool,
}

impl<'a> Reclaimer<'a> {
    pub fn new(backends: &'a Backends, policy: Policy, output: &'a Output) -> Self {
        Self {
            backends,
            policy,
            output,
            stop_timeout: Duration::from_secs(10),
            dry_run: false,
        }
    }

    pub fn stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(self, level: CleanupLevel, confirm: &mut dyn Confirm) -> Result<RunOutcome> {
        let output = self.output;
        let mut diagnostics = Diagnostics::default();

        output.info(&format!("Cleanup level {level}"));
        output.info("Probing backing systems...");
        let sweep = Sweep::new(level, self.policy)
            .probe(self.backends, &mut diagnostics)
            .await;

        for warning in diagnostics.warnings() {
            output.warning(&warning.message);
        }
        let printed = diagnostics.warnings().len();
        let sweep = sweep?;

        for system in sweep.capabilities().systems() {
            match &system.availability {
                Availability::Available => {
                    output.info(&format!("{}: {} available", system.kind, system.name))
                }
                Availability::Absent => {
                    output.info(&format!("{}: {} not found", system.kind, system.name))
                }
                // already warned through diagnostics
                Availability::Unreachable(_) => {}
            }
        }

        let plan = sweep.plan();
        for skip in &plan.skipped {
            if let SkipReason::NothingToDo(_) = skip.reason {
                output.info(&skip.to_string());
            }
        }
        output.info(&format!("Planned {} action(s):", plan.len()));
        for (i, action) in plan.actions.iter().enumerate() {
            let marker = if action.destructive() { " (destructive)" } else { "" };
            output.progress(&format!("  {:>2}. {action}{marker}", i + 1));
        }

        if self.dry_run {
            output.info("Dry run, nothing executed");
            return Ok(RunOutcome::DryRun(plan.clone()));
        }

        let sweep = match sweep.confirm(confirm) {
            Decision::Proceed(sweep) => sweep,
            Decision::Cancel(cancelled) => {
                output.info("Cancelled, nothing was changed");
                return Ok(RunOutcome::Cancelled(cancelled.plan().clone()));
            }
        };

        let mut output_timed = output.clone();
        output_timed.start_timer();
        let executed = sweep
            .execute(self.backends, self.stop_timeout, output)
            .await;
        let done = executed.report(self.backends, diagnostics).await;
        let report = done.into_report();

        for warning in report.warnings.iter().skip(printed) {
            output.warning(&warning.message);
        }
        output.report(&report.render(), &report);
        output_timed.success(&format!(
            "Cleanup finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed_count()
        ));

        Ok(RunOutcome::Completed(report))
    }
}
