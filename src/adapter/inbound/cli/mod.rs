//! Operator CLI.

pub mod check;
pub mod command;
pub mod history;
pub mod output;
pub mod pass;
pub mod paths;
pub mod run;
pub mod targets;

use std::path::Path;

use command::{CheckCommand, Cli, ColorChoice, Commands, LogArgs};
use output::OutputConfig;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Dispatch a parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }

    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Pass(args) => pass::execute(&args).await,
        Commands::Check(CheckCommand::Config(args)) => check::config::execute(&args.config),
        Commands::Check(CheckCommand::Health(args)) => check::health::execute(&args.config),
        Commands::Targets(command) => targets::execute(&command),
        Commands::History(args) => history::execute(&args),
    }
}

/// Load the config file named on the command line.
#[allow(clippy::result_large_err)]
pub(crate) fn load_config(path: &Path) -> Result<Config> {
    Config::load(path)
}

/// Apply `--log-level` / `--json-logs` and start the subscriber.
pub(crate) fn init_logging(config: &mut Config, logs: &LogArgs) {
    if let Some(level) = &logs.log_level {
        config.logging.level.clone_from(level);
    }
    if logs.json_logs {
        config.logging.format = "json".to_string();
    }
    config.init_logging();
}
