//! SQLite registry and pass history, alone and under the scheduler.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal_macros::dec;
use tempfile::TempDir;

use rebalance_keeper::adapter::outbound::sqlite::{
    open, DbPool, SqlitePassRecorder, SqliteTargetRegistry,
};
use rebalance_keeper::application::rebalance::{RebalanceScheduler, SchedulerSettings};
use rebalance_keeper::domain::id::TargetId;
use rebalance_keeper::domain::outcome::TargetOutcome;
use rebalance_keeper::domain::pass::PassBuilder;
use rebalance_keeper::domain::target::{RebalanceTarget, TargetKind};
use rebalance_keeper::error::RegistryError;
use rebalance_keeper::port::{PassRecorder, TargetRegistry};
use rebalance_keeper::testkit::chain::{ScriptedReader, ScriptedWriter};
use rebalance_keeper::testkit::domain::{delegation, market_target, open_market, user_address, user_target};

fn temp_db() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("keeper.db").to_string_lossy().into_owned();
    (dir, path)
}

fn pool(path: &str) -> DbPool {
    open(path).expect("open database")
}

#[tokio::test]
async fn targets_list_in_insertion_order() {
    let (_dir, path) = temp_db();
    let registry = SqliteTargetRegistry::new(pool(&path));

    registry.add(&user_target(2)).unwrap();
    registry.add(&market_target(9)).unwrap();
    registry.add(&user_target(1)).unwrap();

    let ids: Vec<String> = registry
        .list_eligible_targets()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id.to_string())
        .collect();
    assert_eq!(ids, vec![user_address(2), "9".to_string(), user_address(1)]);
}

#[test]
fn duplicate_target_is_rejected() {
    let (_dir, path) = temp_db();
    let registry = SqliteTargetRegistry::new(pool(&path));

    registry.add(&user_target(1)).unwrap();
    assert!(matches!(
        registry.add(&user_target(1)),
        Err(RegistryError::AlreadyTracked(_))
    ));
}

#[test]
fn zero_padded_market_id_is_already_tracked() {
    let (_dir, path) = temp_db();
    let registry = SqliteTargetRegistry::new(pool(&path));

    registry
        .add(&RebalanceTarget::try_new("42", TargetKind::MarketVault).unwrap())
        .unwrap();
    assert!(matches!(
        registry.add(&RebalanceTarget::try_new("0042", TargetKind::MarketVault).unwrap()),
        Err(RegistryError::AlreadyTracked(_))
    ));
}

#[test]
fn enable_disable_and_remove() {
    let (_dir, path) = temp_db();
    let registry = SqliteTargetRegistry::new(pool(&path));
    let id = TargetId::from(user_address(1));

    registry.add(&user_target(1)).unwrap();
    registry.set_enabled(&id, false).unwrap();
    assert!(!registry.get(&id).unwrap().unwrap().enabled);

    registry.set_enabled(&id, true).unwrap();
    assert!(registry.get(&id).unwrap().unwrap().enabled);

    assert!(registry.remove(&id).unwrap());
    assert!(!registry.remove(&id).unwrap());
    assert!(registry.get(&id).unwrap().is_none());
    assert!(matches!(
        registry.set_enabled(&id, true),
        Err(RegistryError::NotFound(_))
    ));
}

#[test]
fn targets_survive_reopen() {
    let (_dir, path) = temp_db();
    {
        let registry = SqliteTargetRegistry::new(pool(&path));
        registry.add(&user_target(1).with_enabled(false)).unwrap();
    }

    let registry = SqliteTargetRegistry::new(pool(&path));
    let targets = registry.list().unwrap();
    assert_eq!(targets.len(), 1);
    assert!(!targets[0].enabled);
}

#[tokio::test]
async fn recent_history_is_newest_first_and_limited() {
    let (_dir, path) = temp_db();
    let recorder = SqlitePassRecorder::new(pool(&path));
    let base = Utc::now() - ChronoDuration::hours(1);

    let mut ids = Vec::new();
    for minute in 0..5 {
        let pass = PassBuilder::start_at(base + ChronoDuration::minutes(minute)).complete(Vec::new());
        ids.push(pass.id().clone());
        recorder.record(&pass).await.unwrap();
    }

    let recent = recorder.recent(3).await.unwrap();
    let recent_ids: Vec<_> = recent.iter().map(|p| p.id().clone()).collect();
    assert_eq!(recent_ids, vec![ids[4].clone(), ids[3].clone(), ids[2].clone()]);
}

#[tokio::test]
async fn scheduler_runs_against_sqlite_registry_and_history() {
    let (_dir, path) = temp_db();
    let db = pool(&path);
    let registry = Arc::new(SqliteTargetRegistry::new(db.clone()));
    let recorder = Arc::new(SqlitePassRecorder::new(db));

    registry.add(&user_target(1)).unwrap();
    registry.add(&user_target(2).with_enabled(false)).unwrap();
    registry.add(&market_target(3)).unwrap();

    let reader = ScriptedReader::new()
        .with_delegation(user_address(1), delegation(dec!(10)))
        .with_market("3", open_market(dec!(10)));
    let scheduler = RebalanceScheduler::new(
        registry.clone(),
        Arc::new(reader),
        Arc::new(ScriptedWriter::new()),
        SchedulerSettings {
            interval: Duration::from_secs(60),
            concurrency: 2,
            run_on_start: true,
        },
    )
    .with_recorder(recorder.clone());

    let pass = scheduler.run_pass().await;
    assert_eq!(pass.outcomes().len(), 3);

    let user = registry.get(&TargetId::from(user_address(1))).unwrap().unwrap();
    assert!(user.last_rebalanced_at.is_some());
    let skipped = registry.get(&TargetId::from(user_address(2))).unwrap().unwrap();
    assert!(skipped.last_rebalanced_at.is_none());

    let history = recorder.recent(1).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id(), pass.id());
    assert_eq!(history[0].outcomes(), pass.outcomes());
    assert!(matches!(
        history[0].outcome_for("3").map(|r| &r.outcome),
        Some(TargetOutcome::Succeeded { .. })
    ));
}
