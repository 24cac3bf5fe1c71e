// ABOUTME: Integration tests for the reclaim executor against fake backends.
// ABOUTME: Failures and panics are recorded per action and never stop the sweep.

mod support;

use reclaim::cluster::ClusterState;
use reclaim::engine::PruneTarget;
use reclaim::output::{Output, OutputMode};
use reclaim::sweep::{
    ActionErrorKind, ActionKind, Capabilities, CleanupLevel, Executor, Policy, ReclaimAction,
};
use std::time::Duration;
use support::fakes::{
    CallLog, FakeCluster, FakeEngine, FakeOrchestrator, backends, claim, container, namespace,
    pod, pod_with_claim,
};

const STOP: Duration = Duration::from_secs(1);

#[tokio::test]
async fn failing_action_does_not_stop_later_actions() {
    support::init_tracing();
    let log = CallLog::default();
    let mut engine = FakeEngine::new(log.clone());
    engine.failing_prunes.insert(PruneTarget::Images { all: false });
    let backends = backends(Some(engine), None, None);

    let caps = Capabilities::none().with_engine(Vec::new());
    let plan = Policy::default().plan(CleanupLevel::Regular, &caps);
    let output = Output::captured(OutputMode::Normal);
    let results = Executor::new(&backends, STOP).run(&plan, &output).await;

    assert_eq!(results.len(), 5);
    assert!(!results[1].succeeded);
    assert_eq!(results[1].error_kind, Some(ActionErrorKind::Backend));
    assert!(results.iter().enumerate().all(|(i, r)| i == 1 || r.succeeded));
    assert_eq!(log.matching("engine prune").len(), 5);
    assert!(
        output
            .lines()
            .iter()
            .any(|l| l.starts_with("[ERROR] prune dangling images"))
    );
}

#[tokio::test]
async fn panicking_backend_is_recorded_as_failure() {
    let log = CallLog::default();
    let mut engine = FakeEngine::new(log.clone());
    engine.panicking_prunes.insert(PruneTarget::Networks);
    let backends = backends(Some(engine), None, None);

    let action = ReclaimAction::prune(PruneTarget::Networks);
    let result = Executor::new(&backends, STOP).execute(&action).await;

    assert!(!result.succeeded);
    assert_eq!(result.error_kind, Some(ActionErrorKind::Panic));
    assert!(result.detail.contains("exploded"), "{}", result.detail);

    let next = Executor::new(&backends, STOP)
        .execute(&ReclaimAction::prune(PruneTarget::StoppedContainers))
        .await;
    assert!(next.succeeded);
}

#[tokio::test]
async fn aggressive_engine_sweep_runs_in_order_and_empties_running_list() {
    let log = CallLog::default();
    let one = container("one");
    let two = container("two");
    let mut engine = FakeEngine::new(log.clone()).with_running(vec![one.clone(), two.clone()]);
    engine.failing_stops.insert(two.id.as_str().to_string());
    let handle = engine.clone();
    let backends = backends(Some(engine), None, None);

    let caps = Capabilities::none().with_engine(handle.running());
    let plan = Policy::default().plan(CleanupLevel::Aggressive, &caps);
    let output = Output::captured(OutputMode::Quiet);
    let results = Executor::new(&backends, STOP).run(&plan, &output).await;

    assert_eq!(
        log.entries(),
        vec![
            format!("engine stop {}", one.id.short()),
            format!("engine stop {}", two.id.short()),
            format!("engine kill {}", two.id.short()),
            "engine prune stopped containers".to_string(),
            "engine prune all unused images".to_string(),
            "engine prune unused networks".to_string(),
            "engine prune all build cache".to_string(),
            "engine prune all unused volumes".to_string(),
            "engine prune full system".to_string(),
        ]
    );
    assert!(handle.running().is_empty());
    assert!(results.iter().all(|r| r.succeeded));
    assert!(results[1].detail.contains("killed instead"));
    let reclaimed: u64 = results.iter().filter_map(|r| r.reclaimed_bytes).sum();
    assert_eq!(reclaimed, 6_000);
}

#[tokio::test]
async fn stop_and_kill_failure_is_reported() {
    let log = CallLog::default();
    let stuck = container("stuck");
    let mut engine = FakeEngine::new(log.clone()).with_running(vec![stuck.clone()]);
    engine.failing_stops.insert(stuck.id.as_str().to_string());
    engine.failing_kills.insert(stuck.id.as_str().to_string());
    let backends = backends(Some(engine), None, None);

    let result = Executor::new(&backends, STOP)
        .execute(&ReclaimAction::stop(stuck))
        .await;

    assert!(!result.succeeded);
    assert!(result.detail.contains("stop timed out"));
}

#[tokio::test]
async fn only_evicted_pods_are_deleted_individually() {
    let log = CallLog::default();
    let mut orchestrator = FakeOrchestrator::new(log.clone());
    orchestrator.pods = vec![
        pod("apps", "evicted-1", "Failed", Some("Evicted")),
        pod("apps", "crashed", "Failed", Some("Error")),
        pod("apps", "done", "Succeeded", Some("Evicted")),
        pod("batch", "evicted-2", "Failed", Some("Evicted")),
    ];
    let backends = backends(None, Some(orchestrator), None);

    let result = Executor::new(&backends, STOP)
        .execute(&ReclaimAction::new(ActionKind::DeleteEvictedPods))
        .await;

    assert!(result.succeeded, "{}", result.detail);
    assert_eq!(
        log.matching("kubectl delete pod "),
        vec![
            "kubectl delete pod apps/evicted-1",
            "kubectl delete pod batch/evicted-2"
        ]
    );
}

#[tokio::test]
async fn partial_evicted_deletion_is_a_failure() {
    let log = CallLog::default();
    let mut orchestrator = FakeOrchestrator::new(log.clone());
    orchestrator.pods = vec![
        pod("apps", "a", "Failed", Some("Evicted")),
        pod("apps", "b", "Failed", Some("Evicted")),
    ];
    orchestrator.failing_pods.insert("apps/a".to_string());
    let backends = backends(None, Some(orchestrator), None);

    let result = Executor::new(&backends, STOP)
        .execute(&ReclaimAction::new(ActionKind::DeleteEvictedPods))
        .await;

    assert!(!result.succeeded);
    assert_eq!(result.error_kind, Some(ActionErrorKind::Partial));
    assert_eq!(log.matching("kubectl delete pod ").len(), 2);
}

#[tokio::test]
async fn namespace_timeout_is_non_fatal() {
    let log = CallLog::default();
    let mut orchestrator = FakeOrchestrator::new(log.clone());
    orchestrator.timing_out_namespaces.insert("stuck".to_string());
    let backends = backends(None, Some(orchestrator), None);

    let caps = Capabilities::none().with_orchestrator(vec![
        namespace("default"),
        namespace("stuck"),
        namespace("team-a"),
    ]);
    let plan = Policy::default().plan(CleanupLevel::Aggressive, &caps);
    let output = Output::captured(OutputMode::Quiet);
    let results = Executor::new(&backends, STOP).run(&plan, &output).await;

    let failed: Vec<_> = results.iter().filter(|r| !r.succeeded).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].error_kind, Some(ActionErrorKind::Timeout));
    assert!(log.position("kubectl delete namespace team-a").is_some());
    assert!(log.position("kubectl delete secrets in default").is_some());
    assert!(log.position("kubectl delete namespace default").is_none());
}

#[tokio::test]
async fn unused_claims_are_reported_not_deleted() {
    let log = CallLog::default();
    let mut orchestrator = FakeOrchestrator::new(log.clone());
    orchestrator.pods = vec![pod_with_claim("apps", "db-0", "data-db-0")];
    orchestrator.claims = vec![claim("apps", "data-db-0"), claim("apps", "orphan")];
    let backends = backends(None, Some(orchestrator), None);

    let result = Executor::new(&backends, STOP)
        .execute(&ReclaimAction::new(ActionKind::ReportUnusedClaims))
        .await;

    assert!(result.succeeded);
    assert_eq!(result.notes, vec!["apps/orphan (Bound)"]);
    assert!(log.matching("kubectl delete").is_empty());
}

#[tokio::test]
async fn running_cluster_regular_prunes_node_and_cache() {
    let log = CallLog::default();
    let mut cluster = FakeCluster::new(log.clone(), Some(ClusterState::Running));
    cluster.cached_images = vec!["alpine:3".to_string(), "busybox:latest".to_string()];
    let backends = backends(None, None, Some(cluster));

    let caps = Capabilities::none().with_local_cluster(ClusterState::Running);
    let plan = Policy::default().plan(CleanupLevel::Regular, &caps);
    let output = Output::captured(OutputMode::Quiet);
    let results = Executor::new(&backends, STOP).run(&plan, &output).await;

    assert_eq!(
        log.entries(),
        vec![
            "minikube ssh docker system prune -f --volumes",
            "minikube cache list",
            "minikube cache delete alpine:3 busybox:latest",
        ]
    );
    assert_eq!(results[0].reclaimed_bytes, Some(2_500_000_000));
}

#[tokio::test]
async fn missing_backend_fails_the_action() {
    let backends = backends(None, None, None);
    let result = Executor::new(&backends, STOP)
        .execute(&ReclaimAction::new(ActionKind::DeleteCluster))
        .await;

    assert!(!result.succeeded);
    assert_eq!(result.error_kind, Some(ActionErrorKind::Unavailable));
}
