#![cfg(unix)]

use app_lifecycle::{
    cli::config::{PackageSettings, Timeouts},
    escalation::{EscalationEngine, Outcome, Strategy, Verdict},
    launch::{LaunchOrchestrator, LaunchOutcome, SystemLauncher},
    platform::SystemPlatform,
    process::{LaunchLedger, SystemProcessTable},
    target::ProgramTarget,
};
use app_lifecycle_tests::{
    fixtures::{unique_name, wait_until_exited, StandIn},
    process::GroupGuard,
};
use std::time::Duration;

const STARTUP: Duration = Duration::from_secs(5);
const SETTLE: Duration = Duration::from_millis(500);

#[tokio::test]
async fn test_launched_tree_is_owned_and_killed() {
    let stand_in = StandIn::stubborn();
    let target = ProgramTarget::native(stand_in.name(), stand_in.path(), stand_in.name());
    let mut ledger = LaunchLedger::new();

    let outcome = LaunchOrchestrator::new(&SystemLauncher, &SystemProcessTable::new(), SETTLE)
        .launch(&target, &mut ledger)
        .await;

    let pids = match outcome {
        LaunchOutcome::Started { pids } => pids,
        failed => panic!("launch not verified: {failed:?}"),
    };
    assert_eq!(pids.len(), 1);
    let _group = GroupGuard(pids[0]);
    assert!(ledger.owns(pids[0]));
    let child = stand_in.child_pid(STARTUP).expect("stand-in did not start");

    let timeouts = Timeouts {
        graceful_close: Duration::from_millis(500),
        kill_confirm: Duration::from_millis(3000),
        ..Timeouts::default()
    };
    let platform = SystemPlatform::new(&PackageSettings::default());
    let report = EscalationEngine::new(&platform, &ledger, &timeouts)
        .stop(&target)
        .await;

    assert_eq!(report.verdict, Verdict::Terminated);
    assert_eq!(
        report.outcomes(),
        vec![
            (Strategy::GracefulClose, Outcome::TimedOut),
            (Strategy::ForceKill, Outcome::Success),
        ]
    );
    // The whole tree goes down with the owned root
    assert!(wait_until_exited(child, STARTUP));
}

#[tokio::test]
async fn test_missing_executable_reports_failure() {
    let name = unique_name("m");
    let target = ProgramTarget::native(&name, format!("/nonexistent/{name}"), &name);
    let mut ledger = LaunchLedger::new();

    let outcome = LaunchOrchestrator::new(&SystemLauncher, &SystemProcessTable::new(), SETTLE)
        .launch(&target, &mut ledger)
        .await;

    assert!(matches!(outcome, LaunchOutcome::Failed { .. }));
    assert!(ledger.is_empty());
}
