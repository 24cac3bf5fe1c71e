// ABOUTME: The sweep core: capability probing, policy, execution and reporting.
// ABOUTME: Backend-agnostic; talks to backing systems only through their traits.

mod action;
mod backends;
mod confirm;
mod error;
mod executor;
mod level;
mod machine;
mod policy;
mod probe;
mod reclaimer;
mod report;
mod state;
mod system;

pub use action::{ActionKind, ReclaimAction};
pub use backends::{Backends, Connection};
pub use confirm::{
    AssumeYes, Confirm, LineConfirm, ScriptedAnswer, StdinConfirm, is_affirmative,
};
pub use error::{ActionError, ActionErrorKind};
pub use executor::{ExecutionResult, Executor, NODE_PRUNE_COMMAND};
pub use level::{CleanupLevel, InvalidLevel};
pub use machine::{Decision, Sweep};
pub use policy::{Plan, Policy, Skip, SkipReason};
pub use probe::probe;
pub use reclaimer::{Reclaimer, RunOutcome};
pub use report::{RunReport, format_bytes, render_usage};
pub use state::{Cancelled, Confirmed, Done, Executed, Init, Probed};
pub use system::{Availability, BackingSystem, Capabilities, SystemKind};
