// ABOUTME: Cleanup command implementation.
// ABOUTME: Loads config, connects backends and runs the reclaimer flow.

use reclaim::command::LocalRunner;
use reclaim::config::Config;
use reclaim::error::Result;
use reclaim::orchestrator::ProtectedNamespaces;
use reclaim::output::Output;
use reclaim::sweep::{
    AssumeYes, Backends, CleanupLevel, Confirm, Policy, Reclaimer, RunOutcome, StdinConfirm,
};
use std::sync::Arc;

/// Run one cleanup at `level`.
pub async fn cleanup(
    level: CleanupLevel,
    config: Config,
    assume_yes: bool,
    dry_run: bool,
    output: &Output,
) -> Result<RunOutcome> {
    let backends = Backends::connect(&config, Arc::new(LocalRunner::new()));
    tracing::debug!(?backends, "backends located");

    let policy = Policy::new(ProtectedNamespaces::with_extra(
        &config.orchestrator.protected_namespaces,
    ));

    let mut confirm: Box<dyn Confirm> = if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    };

    Reclaimer::new(&backends, policy, output)
        .stop_timeout(config.engine.stop_timeout)
        .dry_run(dry_run)
        .run(level, confirm.as_mut())
        .await
}
