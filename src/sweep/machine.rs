// ABOUTME: The sweep state machine: probe, confirm, execute, report.
// ABOUTME: Invalid orders (executing before confirmation) do not compile.

use super::backends::Backends;
use super::confirm::Confirm;
use super::executor::{ExecutionResult, Executor};
use super::level::CleanupLevel;
use super::policy::{Plan, Policy};
use super::probe;
use super::report::RunReport;
use super::state::{Cancelled, Confirmed, Done, Executed, Init, Probed};
use super::system::Capabilities;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::output::Output;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// One reclamation run, parameterized by its current state.
#[derive(Debug)]
pub struct Sweep<S> {
    started_at: DateTime<Utc>,
    level: CleanupLevel,
    policy: Policy,
    state: S,
}

/// Result of the confirmation step.
#[derive(Debug)]
pub enum Decision {
    Proceed(Sweep<Confirmed>),
    Cancel(Sweep<Cancelled>),
}

impl<S> Sweep<S> {
    pub fn level(&self) -> CleanupLevel {
        self.level
    }
}

impl Sweep<Init> {
    pub fn new(level: CleanupLevel, policy: Policy) -> Self {
        Sweep {
            started_at: Utc::now(),
            level,
            policy,
            state: Init,
        }
    }

    /// Probe the backends and derive the plan.
    ///
    /// Fails with [`Error::NoBackingSystems`] when nothing is available.
    pub async fn probe(
        self,
        backends: &Backends,
        diagnostics: &mut Diagnostics,
    ) -> Result<Sweep<Probed>> {
        tracing::debug!(level = %self.level, "probing backing systems");
        let capabilities = probe::probe(backends, diagnostics).await;

        if !capabilities.any_available() {
            return Err(Error::NoBackingSystems);
        }

        let plan = self.policy.plan(self.level, &capabilities);
        tracing::debug!(actions = plan.len(), skipped = plan.skipped.len(), "plan derived");

        Ok(Sweep {
            started_at: self.started_at,
            level: self.level,
            policy: self.policy,
            state: Probed { capabilities, plan },
        })
    }
}

impl Sweep<Probed> {
    pub fn capabilities(&self) -> &Capabilities {
        &self.state.capabilities
    }

    pub fn plan(&self) -> &Plan {
        &self.state.plan
    }

    /// The question put to the user.
    pub fn prompt(&self) -> String {
        let systems: Vec<String> = self
            .state
            .capabilities
            .systems()
            .iter()
            .filter(|s| s.available())
            .map(|s| format!("{} ({})", s.kind, s.name))
            .collect();
        format!(
            "Run level {} cleanup on {}? {} action(s), {} destructive",
            self.level,
            systems.join(", "),
            self.state.plan.len(),
            self.state.plan.destructive_count()
        )
    }

    /// Ask for confirmation.
    pub fn confirm(self, confirm: &mut dyn Confirm) -> Decision {
        let prompt = self.prompt();
        let Sweep {
            started_at,
            level,
            policy,
            state,
        } = self;

        if confirm.confirm(&prompt) {
            tracing::debug!("confirmed");
            Decision::Proceed(Sweep {
                started_at,
                level,
                policy,
                state: Confirmed {
                    capabilities: state.capabilities,
                    plan: state.plan,
                },
            })
        } else {
            tracing::debug!("cancelled by user");
            Decision::Cancel(Sweep {
                started_at,
                level,
                policy,
                state: Cancelled { plan: state.plan },
            })
        }
    }
}

impl Sweep<Cancelled> {
    /// The plan that was not run.
    pub fn plan(&self) -> &Plan {
        &self.state.plan
    }
}

impl Sweep<Confirmed> {
    pub fn plan(&self) -> &Plan {
        &self.state.plan
    }

    /// Run every planned action in order.
    pub async fn execute(
        self,
        backends: &Backends,
        stop_timeout: Duration,
        output: &Output,
    ) -> Sweep<Executed> {
        tracing::debug!(actions = self.state.plan.len(), "executing plan");
        let results = Executor::new(backends, stop_timeout)
            .run(&self.state.plan, output)
            .await;

        Sweep {
            started_at: self.started_at,
            level: self.level,
            policy: self.policy,
            state: Executed {
                capabilities: self.state.capabilities,
                plan: self.state.plan,
                results,
            },
        }
    }
}

impl Sweep<Executed> {
    pub fn results(&self) -> &[ExecutionResult] {
        &self.state.results
    }

    /// Assemble the report, taking a best-effort usage snapshot from the engine.
    pub async fn report(self, backends: &Backends, mut diagnostics: Diagnostics) -> Sweep<Done> {
        tracing::debug!("building report");
        let Executed {
            capabilities,
            plan,
            results,
        } = self.state;

        let usage = match backends.engine.get() {
            Some(engine) if capabilities.engine.available() => match engine.disk_usage().await {
                Ok(usage) => Some(usage),
                Err(e) => {
                    diagnostics.warn(Warning::snapshot_unavailable(format!(
                        "could not read engine disk usage: {e}"
                    )));
                    None
                }
            },
            _ => None,
        };

        let mut report = RunReport::new(
            self.level,
            capabilities.systems().into_iter().cloned().collect(),
        );
        report.started_at = self.started_at;
        report.results = results;
        report.skipped = plan.skipped;
        report.warnings = diagnostics.into_warnings();
        report.usage = usage;

        Sweep {
            started_at: self.started_at,
            level: self.level,
            policy: self.policy,
            state: Done { report },
        }
    }
}

impl Sweep<Done> {
    pub fn report(&self) -> &RunReport {
        &self.state.report
    }

    pub fn into_report(self) -> RunReport {
        self.state.report
    }
}
