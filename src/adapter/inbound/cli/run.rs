//! Handler for the `run` command.

use super::command::RunArgs;
use super::{init_logging, load_config, output};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    apply_overrides(&mut config, args)?;
    init_logging(&mut config, &args.logs);

    print_startup(&config);
    orchestration::run(config).await
}

#[allow(clippy::result_large_err)]
fn apply_overrides(config: &mut Config, args: &RunArgs) -> Result<()> {
    if let Some(interval) = args.interval {
        config.scheduler.interval_secs = interval;
    }
    if let Some(concurrency) = args.concurrency {
        config.scheduler.concurrency = concurrency;
    }
    if args.no_run_on_start {
        config.scheduler.run_on_start = false;
    }
    config.validate()
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("RPC", &config.chain.rpc_url);
    if output::verbosity() > 0 {
        output::field("Chain ID", config.chain.chain_id);
        output::field("Delegation", &config.chain.delegation_address);
        if let Some(market) = &config.chain.market_address {
            output::field("Market", market);
        }
    }
    output::field("Interval", format!("{}s", config.scheduler.interval_secs));
    output::field("Concurrency", config.scheduler.concurrency);
    output::field("Registry", format!("{:?}", config.registry.backend).to_lowercase());
    if !config.wallet.is_configured() {
        output::warning("No operator key configured; the keeper cannot sign transactions");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::inbound::cli::command::{Cli, Commands};
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["rebalance-keeper", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Run(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn overrides_replace_scheduler_settings() {
        let mut config = Config::default();
        apply_overrides(
            &mut config,
            &run_args(&["--interval", "30", "--concurrency", "8", "--no-run-on-start"]),
        )
        .unwrap();
        assert_eq!(config.scheduler.interval_secs, 30);
        assert_eq!(config.scheduler.concurrency, 8);
        assert!(!config.scheduler.run_on_start);
    }

    #[test]
    fn zero_interval_override_is_rejected() {
        let mut config = Config::default();
        assert!(apply_overrides(&mut config, &run_args(&["--interval", "0"])).is_err());
    }
}
