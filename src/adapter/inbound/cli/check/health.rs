//! `check health`: readiness report over the loaded configuration.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{load_config, output};
use crate::error::{Error, Result};
use crate::infrastructure::orchestration::{health_check, HealthCheck, HealthStatus};

fn describe(check: &HealthCheck) -> (&'static str, Option<&str>) {
    match check.status() {
        HealthStatus::Healthy => ("healthy", None),
        HealthStatus::Unhealthy(reason) => ("unhealthy", Some(reason.as_str())),
    }
}

/// Run the health check using configuration.
pub fn execute<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let report = health_check(&config);

    if output::is_json() {
        let checks = report
            .checks()
            .iter()
            .map(|check| {
                let (status, details) = describe(check);
                json!({
                    "name": check.name(),
                    "critical": check.critical(),
                    "status": status,
                    "details": details,
                })
            })
            .collect::<Vec<_>>();

        output::json_output(json!({
            "command": "check.health",
            "status": if report.is_healthy() { "healthy" } else { "unhealthy" },
            "checks": checks,
        }));
    } else {
        output::section("Health Check");
        for check in report.checks() {
            let (status, details) = describe(check);
            let suffix = if check.critical() { " (critical)" } else { "" };
            let value = match details {
                Some(reason) => format!("{status}: {reason}"),
                None => status.to_string(),
            };
            output::field(
                &format!("{}{}", check.name(), suffix),
                if check.is_healthy() {
                    output::positive(value)
                } else if check.critical() {
                    output::negative(value)
                } else {
                    output::caution(value)
                },
            );
        }
    }

    if !report.is_healthy() {
        output::error("Health check failed");
        return Err(Error::Connection("health check failed".to_string()));
    }
    output::success("Health check passed");
    Ok(())
}
