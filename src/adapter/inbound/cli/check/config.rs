//! `check config`: parse and validate the config file.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{load_config, output};
use crate::error::Result;

/// Validate the configuration file, printing the effective values.
pub fn execute<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    let config = load_config(path)?;

    let targets = config.registry.targets.len();
    if output::is_json() {
        output::json_output(json!({
            "command": "check.config",
            "status": "valid",
            "path": path.display().to_string(),
            "chain_id": config.chain.chain_id,
            "rpc_url": config.chain.rpc_url,
            "interval_secs": config.scheduler.interval_secs,
            "concurrency": config.scheduler.concurrency,
            "static_targets": targets,
        }));
        return Ok(());
    }

    output::section("Configuration");
    output::field("File", path.display());
    output::field("RPC", &config.chain.rpc_url);
    output::field("Chain ID", config.chain.chain_id);
    output::field("Interval", format!("{}s", config.scheduler.interval_secs));
    output::field("Concurrency", config.scheduler.concurrency);
    output::field("Retries", config.retry.max_attempts);
    if targets > 0 {
        output::field("Static", format!("{targets} targets"));
    }
    output::success("Configuration valid");
    Ok(())
}
