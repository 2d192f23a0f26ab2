//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::memory::MemoryTargetRegistry;
use crate::adapter::outbound::sqlite::{open, DbPool, SqlitePassRecorder, SqliteTargetRegistry};
use crate::application::rebalance::{RebalanceScheduler, SchedulerSettings};
use crate::error::Result;
use crate::infrastructure::config::registry::RegistryBackend;
use crate::infrastructure::config::settings::Config;
use crate::port::{ChainReader, ChainWriter, PassRecorder, TargetRegistry};

/// Open (and migrate) the keeper database.
///
/// Pass history always lives here; with the `sqlite` backend so do the
/// targets.
#[allow(clippy::result_large_err)]
pub fn init_database(config: &Config) -> Result<DbPool> {
    let pool = open(&config.registry.database)?;
    info!(database = %config.registry.database, "Database initialized");
    Ok(pool)
}

/// Build the target registry for the configured backend.
#[allow(clippy::result_large_err)]
pub fn build_registry(config: &Config, pool: &DbPool) -> Result<Arc<dyn TargetRegistry>> {
    let registry: Arc<dyn TargetRegistry> = match config.registry.backend {
        RegistryBackend::Sqlite => Arc::new(SqliteTargetRegistry::new(pool.clone())),
        RegistryBackend::Static => {
            let targets = config.static_targets()?;
            info!(targets = targets.len(), "Using static target registry");
            Arc::new(MemoryTargetRegistry::with_targets(targets))
        }
    };
    Ok(registry)
}

pub fn build_recorder(pool: &DbPool) -> Arc<dyn PassRecorder> {
    Arc::new(SqlitePassRecorder::new(pool.clone()))
}

/// Connect the chain reader and the operator-signed writer.
#[cfg(feature = "evm")]
#[allow(clippy::result_large_err)]
pub fn build_chain(config: &Config) -> Result<(Arc<dyn ChainReader>, Arc<dyn ChainWriter>)> {
    use crate::adapter::outbound::evm::{EvmChainReader, EvmChainWriter};
    use crate::error::ConfigError;
    use crate::infrastructure::config::settings::OPERATOR_KEY_ENV;
    use crate::infrastructure::retry::RetryPolicy;

    let key = config
        .wallet
        .private_key
        .as_deref()
        .ok_or(ConfigError::MissingField {
            field: OPERATOR_KEY_ENV,
        })?;
    let retry = RetryPolicy::from_config(&config.retry);

    let reader = EvmChainReader::connect(&config.chain, retry.clone())?;
    let writer = EvmChainWriter::connect(&config.chain, key, retry)?;
    info!(
        rpc_url = %config.chain.rpc_url,
        chain_id = config.chain.chain_id,
        operator = %writer.operator(),
        "Chain adapters connected"
    );

    Ok((Arc::new(reader), Arc::new(writer)))
}

#[cfg(not(feature = "evm"))]
#[allow(clippy::result_large_err)]
pub fn build_chain(_config: &Config) -> Result<(Arc<dyn ChainReader>, Arc<dyn ChainWriter>)> {
    Err(crate::error::ConfigError::Other(
        "this build has no chain adapter; enable the `evm` feature".to_string(),
    )
    .into())
}

/// Wire a scheduler from configuration: registry, chain adapters and
/// pass history.
#[allow(clippy::result_large_err)]
pub fn build_scheduler(config: &Config) -> Result<Arc<RebalanceScheduler>> {
    let pool = init_database(config)?;
    let registry = build_registry(config, &pool)?;
    let (reader, writer) = build_chain(config)?;

    let scheduler = RebalanceScheduler::new(
        registry,
        reader,
        writer,
        SchedulerSettings::from(&config.scheduler),
    )
    .with_recorder(build_recorder(&pool));

    Ok(Arc::new(scheduler))
}
