//! Configuration health reporting.

use crate::infrastructure::config::registry::RegistryBackend;
use crate::infrastructure::config::settings::{is_address, Config, OPERATOR_KEY_ENV};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

#[derive(Debug, Clone)]
pub struct HealthCheck {
    name: &'static str,
    critical: bool,
    status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &'static str, critical: bool, problem: Option<String>) -> Self {
        Self {
            name,
            critical,
            status: problem.map_or(HealthStatus::Healthy, HealthStatus::Unhealthy),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    pub fn status(&self) -> &HealthStatus {
        &self.status
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthStatus::Healthy)
    }
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn checks(&self) -> &[HealthCheck] {
        &self.checks
    }

    pub fn check(&self, name: &str) -> Option<&HealthCheck> {
        self.checks.iter().find(|check| check.name == name)
    }

    /// Non-critical problems are reported but do not fail the report.
    pub fn is_healthy(&self) -> bool {
        self.checks
            .iter()
            .filter(|check| check.critical())
            .all(HealthCheck::is_healthy)
    }
}

pub fn health_check(config: &Config) -> HealthReport {
    let chain = &config.chain;
    let mut checks = Vec::new();

    let rpc_problem = if chain.rpc_url.trim().is_empty() {
        Some("rpc_url is empty".to_string())
    } else if url::Url::parse(&chain.rpc_url).is_err() {
        Some(format!("rpc_url is not a valid url: {}", chain.rpc_url))
    } else {
        None
    };
    checks.push(HealthCheck::new("rpc_url", true, rpc_problem));

    checks.push(HealthCheck::new(
        "delegation_address",
        true,
        (!is_address(&chain.delegation_address))
            .then(|| format!("'{}' is not a valid address", chain.delegation_address)),
    ));

    let market_problem = match chain.market_address.as_deref() {
        None => Some("not configured; market vault targets will fail".to_string()),
        Some(addr) if !is_address(addr) => Some(format!("'{addr}' is not a valid address")),
        Some(_) => None,
    };
    checks.push(HealthCheck::new("market_address", false, market_problem));

    checks.push(HealthCheck::new(
        "operator_key",
        true,
        (!config.wallet.is_configured())
            .then(|| format!("set {OPERATOR_KEY_ENV} or wallet.keystore_path")),
    ));

    let registry_problem = match config.registry.backend {
        RegistryBackend::Sqlite => config
            .registry
            .database
            .trim()
            .is_empty()
            .then(|| "database path is empty".to_string()),
        RegistryBackend::Static => match config.static_targets() {
            Err(e) => Some(e.to_string()),
            Ok(targets) if targets.is_empty() => Some("no static targets configured".to_string()),
            Ok(_) => None,
        },
    };
    checks.push(HealthCheck::new("registry", true, registry_problem));

    HealthReport { checks }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        let mut config = Config::default();
        config.wallet.private_key = Some("0x01".to_string());
        config
    }

    #[test]
    fn report_is_healthy_when_all_critical_pass() {
        let report = HealthReport {
            checks: vec![
                HealthCheck::new("critical_pass", true, None),
                HealthCheck::new("optional", false, Some("warning".to_string())),
            ],
        };
        assert!(report.is_healthy());
    }

    #[test]
    fn report_is_unhealthy_when_critical_fails() {
        let report = HealthReport {
            checks: vec![
                HealthCheck::new("critical_fail", true, Some("error".to_string())),
                HealthCheck::new("critical_pass", true, None),
            ],
        };
        assert!(!report.is_healthy());
    }

    #[test]
    fn default_config_with_key_is_healthy() {
        let report = health_check(&configured());
        let names: Vec<_> = report.checks().iter().map(HealthCheck::name).collect();
        assert_eq!(
            names,
            vec![
                "rpc_url",
                "delegation_address",
                "market_address",
                "operator_key",
                "registry"
            ]
        );
        assert!(report.is_healthy());
        // No market contract by default.
        assert!(!report.check("market_address").unwrap().is_healthy());
    }

    #[test]
    fn missing_operator_key_is_critical() {
        let report = health_check(&Config::default());
        let check = report.check("operator_key").unwrap();
        assert!(check.critical());
        assert!(!check.is_healthy());
        assert!(!report.is_healthy());
    }

    #[test]
    fn detects_bad_rpc_url() {
        let mut config = configured();
        config.chain.rpc_url = "not a url".to_string();
        let report = health_check(&config);
        assert!(matches!(
            report.check("rpc_url").unwrap().status(),
            HealthStatus::Unhealthy(reason) if reason.contains("not a valid url")
        ));
        assert!(!report.is_healthy());
    }

    #[test]
    fn empty_static_registry_is_unhealthy() {
        let mut config = configured();
        config.registry.backend = RegistryBackend::Static;
        let report = health_check(&config);
        assert!(!report.check("registry").unwrap().is_healthy());
    }
}
