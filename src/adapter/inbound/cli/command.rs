//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::paths;

/// Operator keeper for on-chain yield rebalancing
#[derive(Parser, Debug)]
#[command(name = "rebalance-keeper")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the keeper in the foreground until interrupted
    Run(RunArgs),

    /// Run a single rebalance pass and print its report
    Pass(PassArgs),

    /// Validate configuration and readiness
    #[command(subcommand)]
    Check(CheckCommand),

    /// Manage tracked rebalance targets
    #[command(subcommand)]
    Targets(TargetsCommand),

    /// Show recent rebalance passes
    History(HistoryArgs),
}

#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file syntax and semantics.
    Config(ConfigPathArg),
    /// Report whether the keeper has everything it needs to run.
    Health(ConfigPathArg),
}

#[derive(Subcommand, Debug)]
pub enum TargetsCommand {
    /// List every tracked target.
    List(ConfigPathArg),
    /// Start tracking a target.
    Add(TargetAddArgs),
    /// Re-enable a target.
    Enable(TargetIdArgs),
    /// Keep a target registered but skip it in every pass.
    Disable(TargetIdArgs),
    /// Stop tracking a target.
    Remove(TargetIdArgs),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Args, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Logging overrides for commands that talk to the chain.
#[derive(Args, Debug, Default)]
pub struct LogArgs {
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty-printed logs.
    #[arg(long)]
    pub json_logs: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    #[command(flatten)]
    pub logs: LogArgs,

    /// Override seconds between passes.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Override how many targets are processed at once.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Wait one full interval before the first pass.
    #[arg(long)]
    pub no_run_on_start: bool,
}

#[derive(Args, Debug)]
pub struct PassArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    #[command(flatten)]
    pub logs: LogArgs,
}

#[derive(Args, Debug)]
pub struct TargetAddArgs {
    /// Wallet address (user) or decimal market id (market).
    pub id: String,

    /// Target kind: `user` or `market`.
    #[arg(long, default_value = "user")]
    pub kind: String,

    /// Register the target without enabling it.
    #[arg(long)]
    pub disabled: bool,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct TargetIdArgs {
    /// Target id as shown by `targets list`.
    pub id: String,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Number of passes to show, newest first.
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}
