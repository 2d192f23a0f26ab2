//! `targets` subcommands over the SQLite registry.

use std::path::Path;
use std::str::FromStr;

use serde_json::json;

use super::command::{TargetAddArgs, TargetIdArgs, TargetsCommand};
use super::{load_config, output};
use crate::adapter::outbound::sqlite::SqliteTargetRegistry;
use crate::domain::id::TargetId;
use crate::domain::target::{RebalanceTarget, TargetKind};
use crate::error::{ConfigError, RegistryError, Result};
use crate::infrastructure::bootstrap::init_database;
use crate::infrastructure::config::registry::RegistryBackend;
use crate::infrastructure::config::settings::Config;

#[allow(clippy::result_large_err)]
pub fn execute(command: &TargetsCommand) -> Result<()> {
    match command {
        TargetsCommand::List(args) => list(&args.config),
        TargetsCommand::Add(args) => add(args),
        TargetsCommand::Enable(args) => set_enabled(args, true),
        TargetsCommand::Disable(args) => set_enabled(args, false),
        TargetsCommand::Remove(args) => remove(args),
    }
}

#[allow(clippy::result_large_err)]
fn open_registry(config: &Config) -> Result<SqliteTargetRegistry> {
    if config.registry.backend == RegistryBackend::Static {
        return Err(ConfigError::Other(
            "the static registry is read from [[registry.targets]]; edit the config file instead"
                .to_string(),
        )
        .into());
    }
    Ok(SqliteTargetRegistry::new(init_database(config)?))
}

#[allow(clippy::result_large_err)]
fn list(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let targets = match config.registry.backend {
        RegistryBackend::Static => config.static_targets()?,
        RegistryBackend::Sqlite => open_registry(&config)?.list()?,
    };

    if output::is_json() {
        output::json_output(json!({
            "command": "targets.list",
            "targets": targets,
        }));
        return Ok(());
    }

    if targets.is_empty() {
        output::hint("no targets tracked; add one with `rebalance-keeper targets add <id>`");
        return Ok(());
    }

    output::section("Targets");
    let widths = [42, 6, 8, 0];
    output::table_header(&[
        ("target", widths[0]),
        ("kind", widths[1]),
        ("enabled", widths[2]),
        ("last rebalanced", widths[3]),
    ]);
    for target in &targets {
        output::table_row(
            &[
                output::cell(&target.id),
                output::cell(target.kind),
                if target.enabled {
                    output::styled_cell("yes", |v| output::positive(v))
                } else {
                    output::styled_cell("no", |v| output::muted(v))
                },
                output::cell(
                    target
                        .last_rebalanced_at
                        .map_or_else(|| "never".to_string(), |at| at.to_rfc3339()),
                ),
            ],
            &widths,
        );
    }
    Ok(())
}

#[allow(clippy::result_large_err)]
fn add(args: &TargetAddArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let kind = TargetKind::from_str(&args.kind)?;
    let target = RebalanceTarget::try_new(&args.id, kind)?.with_enabled(!args.disabled);

    if kind == TargetKind::MarketVault && config.chain.market_address.is_none() {
        output::warning("chain.market_address is not set; market targets will fail until it is");
    }

    open_registry(&config)?.add(&target)?;
    output::success(&format!("Tracking {} target {}", target.kind, target.id));
    Ok(())
}

#[allow(clippy::result_large_err)]
fn set_enabled(args: &TargetIdArgs, enabled: bool) -> Result<()> {
    let config = load_config(&args.config)?;
    let id = TargetId::new(args.id.as_str());
    open_registry(&config)?.set_enabled(&id, enabled)?;
    output::success(&format!(
        "{} {id}",
        if enabled { "Enabled" } else { "Disabled" }
    ));
    Ok(())
}

#[allow(clippy::result_large_err)]
fn remove(args: &TargetIdArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let id = TargetId::new(args.id.as_str());
    if !open_registry(&config)?.remove(&id)? {
        return Err(RegistryError::NotFound(id.to_string()).into());
    }
    output::success(&format!("Removed {id}"));
    Ok(())
}
