use std::io::Write;

use tempfile::NamedTempFile;

use rebalance_keeper::domain::error::DomainError;
use rebalance_keeper::domain::target::TargetKind;
use rebalance_keeper::error::{ConfigError, Error};
use rebalance_keeper::infrastructure::config::registry::RegistryBackend;
use rebalance_keeper::infrastructure::config::settings::Config;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

fn load(contents: &str) -> Result<Config, Error> {
    let file = write_temp_config(contents);
    Config::load(file.path())
}

#[test]
fn full_config_loads() {
    let config = load(
        r#"
[logging]
level = "debug"
format = "json"

[chain]
chain_id = 296
delegation_address = "0x6D5f91cA52bdD5d3DAAb52D91fBfd7e7D253d64A"
market_address = "0x00000000000000000000000000000000000000aa"
gas_limit = 750000
confirmation_timeout_secs = 90

[scheduler]
interval_secs = 600
concurrency = 8
run_on_start = false

[retry]
max_attempts = 5
initial_backoff_ms = 250
max_backoff_ms = 4000

[registry]
backend = "sqlite"
database = "keeper.db"
"#,
    )
    .expect("valid config");

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.chain.gas_limit, 750_000);
    assert_eq!(config.chain.confirmation_timeout().as_secs(), 90);
    assert_eq!(config.scheduler.interval().as_secs(), 600);
    assert_eq!(config.scheduler.concurrency, 8);
    assert!(!config.scheduler.run_on_start);
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.registry.backend, RegistryBackend::Sqlite);
    assert_eq!(config.registry.database, "keeper.db");
}

#[test]
fn empty_file_is_valid() {
    let config = load("").expect("defaults validate");
    assert_eq!(config.scheduler.interval_secs, 3600);
    assert!(config.scheduler.run_on_start);
}

#[test]
fn missing_file_is_read_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = Config::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn malformed_toml_is_parse_error() {
    let result = load("[scheduler\ninterval_secs = 10\n");
    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn zero_interval_is_rejected() {
    match load("[scheduler]\ninterval_secs = 0\n") {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "interval_secs",
            ..
        })) => {}
        other => panic!("expected invalid interval, got {other:?}"),
    }
}

#[test]
fn bad_delegation_address_is_rejected() {
    match load("[chain]\ndelegation_address = \"0x1234\"\n") {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "delegation_address",
            ..
        })) => {}
        other => panic!("expected invalid delegation address, got {other:?}"),
    }
}

#[test]
fn static_registry_rejects_unknown_kind() {
    let result = load(
        r#"
[registry]
backend = "static"

[[registry.targets]]
id = "0x00000000000000000000000000000000000000bb"
kind = "vault"
"#,
    );
    assert!(matches!(
        result,
        Err(Error::Domain(DomainError::UnknownTargetKind { .. }))
    ));
}

#[test]
fn static_registry_rejects_malformed_user_address() {
    let result = load(
        r#"
[registry]
backend = "static"

[[registry.targets]]
id = "alice"
kind = "user"
"#,
    );
    assert!(matches!(
        result,
        Err(Error::Domain(DomainError::InvalidAddress { .. }))
    ));
}

#[test]
fn static_registry_yields_targets_in_file_order() {
    let config = load(
        r#"
[chain]
market_address = "0x00000000000000000000000000000000000000aa"

[registry]
backend = "static"

[[registry.targets]]
id = "3"
kind = "market"

[[registry.targets]]
id = "0x00000000000000000000000000000000000000bb"
kind = "user"
enabled = false
"#,
    )
    .expect("valid static config");

    let targets = config.static_targets().expect("targets");
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].id.as_str(), "3");
    assert_eq!(targets[0].kind, TargetKind::MarketVault);
    assert_eq!(targets[1].kind, TargetKind::UserDelegation);
    assert!(!targets[1].enabled);
}
