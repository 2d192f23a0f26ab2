use std::collections::HashSet;

use rebalance_keeper::infrastructure::config::registry::{RegistryBackend, StaticTarget};
use rebalance_keeper::infrastructure::config::settings::Config;
use rebalance_keeper::infrastructure::orchestration::{health_check, HealthStatus};

fn with_key() -> Config {
    let mut config = Config::default();
    config.wallet.private_key = Some("0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d".into());
    config
}

#[test]
fn health_check_covers_keeper_dependencies() {
    let report = health_check(&Config::default());
    let names: HashSet<&'static str> = report.checks().iter().map(|check| check.name()).collect();

    for expected in ["rpc_url", "delegation_address", "market_address", "operator_key", "registry"] {
        assert!(names.contains(expected), "expected {expected} check");
    }
}

#[test]
fn missing_market_contract_is_a_warning_only() {
    let report = health_check(&with_key());
    let market = report.check("market_address").expect("market check");

    assert!(!market.critical());
    assert!(!market.is_healthy());
    assert!(report.is_healthy());
}

#[test]
fn invalid_delegation_address_fails_report() {
    let mut config = with_key();
    config.chain.delegation_address = "0xnope".into();
    let report = health_check(&config);

    assert!(matches!(
        report.check("delegation_address").map(|c| c.status()),
        Some(HealthStatus::Unhealthy(_))
    ));
    assert!(!report.is_healthy());
}

#[test]
fn static_registry_with_targets_is_healthy() {
    let mut config = with_key();
    config.registry.backend = RegistryBackend::Static;
    config.registry.targets = vec![StaticTarget {
        id: "0x00000000000000000000000000000000000000bb".into(),
        kind: "user".into(),
        enabled: true,
    }];

    let report = health_check(&config);
    assert!(report.check("registry").expect("registry check").is_healthy());
    assert!(report.is_healthy());
}

#[test]
fn static_market_target_without_market_contract_is_unhealthy() {
    let mut config = with_key();
    config.registry.backend = RegistryBackend::Static;
    config.registry.targets = vec![StaticTarget {
        id: "4".into(),
        kind: "market".into(),
        enabled: true,
    }];

    let report = health_check(&config);
    assert!(!report.check("registry").expect("registry check").is_healthy());
    assert!(!report.is_healthy());
}
