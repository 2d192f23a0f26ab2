//! CLI integration tests.

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TEST_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
const USER: &str = "0x00000000000000000000000000000000000000bb";

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let database = dir.path().join("keeper.db");
        let config = dir.path().join("config.toml");
        fs::write(
            &config,
            format!(
                "[registry]\nbackend = \"sqlite\"\ndatabase = \"{}\"\n",
                database.display()
            ),
        )
        .expect("write config");
        Self { dir, config }
    }

    fn with_contents(contents: &str) -> Self {
        let workspace = Self::new();
        fs::write(&workspace.config, contents).expect("write config");
        workspace
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("rebalance-keeper");
        cmd.current_dir(self.dir.path())
            .env_remove("OPERATOR_PRIVATE_KEY")
            .env_remove("RPC_URL")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Command {
        let mut cmd = self.cmd();
        cmd.args(args).arg("--config").arg(&self.config);
        cmd
    }
}

#[test]
fn help_lists_commands() {
    cargo_bin_cmd!("rebalance-keeper")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rebalance-keeper"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("pass"))
        .stdout(predicate::str::contains("targets"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn version_prints_name() {
    cargo_bin_cmd!("rebalance-keeper")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rebalance-keeper"));
}

#[test]
fn check_config_accepts_valid_file() {
    let ws = Workspace::new();
    ws.run(&["check", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration valid"));
}

#[test]
fn check_config_rejects_zero_interval() {
    let ws = Workspace::with_contents("[scheduler]\ninterval_secs = 0\n");
    ws.run(&["check", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval_secs"));
}

#[test]
fn check_config_json_reports_status() {
    let ws = Workspace::new();
    ws.run(&["--json", "check", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"command\":\"check.config\""))
        .stdout(predicate::str::contains("\"status\":\"valid\""));
}

#[test]
fn check_health_fails_without_operator_key() {
    let ws = Workspace::new();
    ws.run(&["check", "health"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("operator_key"))
        .stderr(predicate::str::contains("health check failed"));
}

#[test]
fn check_health_passes_with_operator_key() {
    let ws = Workspace::new();
    ws.run(&["check", "health"])
        .env("OPERATOR_PRIVATE_KEY", TEST_KEY)
        .assert()
        .success()
        .stdout(predicate::str::contains("Health check passed"));
}

#[test]
fn targets_lifecycle_against_sqlite() {
    let ws = Workspace::new();

    ws.run(&["targets", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no targets tracked"));

    ws.run(&["targets", "add", USER])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tracking user target"));

    ws.run(&["targets", "add", USER])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already tracked"));

    ws.run(&["targets", "disable", USER]).assert().success();

    ws.run(&["--json", "targets", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(USER))
        .stdout(predicate::str::contains("\"enabled\":false"));

    ws.run(&["targets", "remove", USER]).assert().success();

    ws.run(&["targets", "remove", USER])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn targets_add_rejects_malformed_address() {
    let ws = Workspace::new();
    ws.run(&["targets", "add", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid wallet address"));
}

#[test]
fn targets_add_market_warns_without_market_contract() {
    let ws = Workspace::new();
    ws.run(&["targets", "add", "42", "--kind", "market"])
        .assert()
        .success()
        .stdout(predicate::str::contains("market_address"));
}

#[test]
fn static_registry_is_read_only() {
    let ws = Workspace::with_contents(&format!(
        "[registry]\nbackend = \"static\"\n\n[[registry.targets]]\nid = \"{USER}\"\nkind = \"user\"\n"
    ));

    ws.run(&["targets", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(USER));

    ws.run(&["targets", "disable", USER])
        .assert()
        .failure()
        .stderr(predicate::str::contains("static registry"));
}

#[test]
fn history_is_empty_on_fresh_database() {
    let ws = Workspace::new();
    ws.run(&["history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no passes recorded yet"));

    ws.run(&["--json", "history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"passes\":[]"));
}

#[test]
fn pass_requires_operator_key() {
    let ws = Workspace::new();
    ws.run(&["pass"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPERATOR_PRIVATE_KEY"));
}
