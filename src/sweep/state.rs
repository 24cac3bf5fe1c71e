// ABOUTME: Sweep state marker types for the type state pattern.
// ABOUTME: Each state carries the data that exists from that point of the run on.

use super::executor::ExecutionResult;
use super::policy::Plan;
use super::report::RunReport;
use super::system::Capabilities;

/// Nothing probed yet.
/// Available actions: `probe()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Init;

/// Capabilities known and plan derived, waiting for the user.
/// Available actions: `confirm()`, `plan()`
#[derive(Debug, Clone)]
pub struct Probed {
    pub(crate) capabilities: Capabilities,
    pub(crate) plan: Plan,
}

/// User declined; nothing was executed.
#[derive(Debug, Clone)]
pub struct Cancelled {
    pub(crate) plan: Plan,
}

/// User agreed (or `--yes`).
/// Available actions: `execute()`
#[derive(Debug, Clone)]
pub struct Confirmed {
    pub(crate) capabilities: Capabilities,
    pub(crate) plan: Plan,
}

/// Every action ran.
/// Available actions: `report()`
#[derive(Debug, Clone)]
pub struct Executed {
    pub(crate) capabilities: Capabilities,
    pub(crate) plan: Plan,
    pub(crate) results: Vec<ExecutionResult>,
}

/// Report assembled.
/// Available actions: `into_report()`
#[derive(Debug, Clone)]
pub struct Done {
    pub(crate) report: RunReport,
}
