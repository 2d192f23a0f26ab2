//! Handler for the `pass` command: one rebalance pass, then a report.

use serde_json::json;

use super::command::PassArgs;
use super::{init_logging, load_config, output};
use crate::domain::outcome::{OutcomeRecord, TargetOutcome};
use crate::domain::pass::RebalancePass;
use crate::domain::report::RunReport;
use crate::error::{Error, Result};
use crate::infrastructure::orchestration;

/// Execute a single pass. Exits non-zero only when the pass aborted.
pub async fn execute(args: &PassArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    init_logging(&mut config, &args.logs);

    let pass = orchestration::run_once(&config).await?;
    let report = RunReport::from_pass(&pass);

    if output::is_json() {
        output::json_output(json!({
            "command": "pass",
            "report": report,
            "outcomes": pass.outcomes(),
        }));
    } else {
        print_report(&pass, &report);
    }

    match report.aborted() {
        Some(reason) => Err(Error::Connection(format!("rebalance pass aborted: {reason}"))),
        None => Ok(()),
    }
}

/// Human-readable detail for one outcome.
pub(crate) fn outcome_detail(outcome: &TargetOutcome) -> String {
    match outcome {
        TargetOutcome::Succeeded { tx_hash } | TargetOutcome::Unknown { tx_hash } => tx_hash.clone(),
        TargetOutcome::Skipped { reason } => reason.to_string(),
        TargetOutcome::Failed {
            stage,
            kind,
            message,
        } => format!("{stage}/{kind}: {message}"),
    }
}

pub(crate) fn outcome_cell(outcome: &TargetOutcome) -> (String, String) {
    let label = outcome.label();
    match outcome {
        TargetOutcome::Succeeded { .. } => output::styled_cell(label, |v| output::positive(v)),
        TargetOutcome::Skipped { .. } => output::styled_cell(label, |v| output::muted(v)),
        TargetOutcome::Failed { .. } => output::styled_cell(label, |v| output::negative(v)),
        TargetOutcome::Unknown { .. } => output::styled_cell(label, |v| output::caution(v)),
    }
}

fn print_outcome(record: &OutcomeRecord, widths: &[usize]) {
    output::table_row(
        &[
            output::cell(&record.target_id),
            output::cell(record.kind),
            outcome_cell(&record.outcome),
            output::cell(outcome_detail(&record.outcome)),
        ],
        widths,
    );
}

fn print_report(pass: &RebalancePass, report: &RunReport) {
    let counts = report.counts();

    output::section("Rebalance pass");
    output::field("Pass", report.pass_id());
    output::field("Duration", format!("{}ms", report.duration_ms()));
    if let Some(reason) = report.aborted() {
        output::field("Status", output::negative(format!("aborted: {reason}")));
        return;
    }
    output::field("Targets", counts.targets);
    output::field("Attempted", counts.attempted);
    output::field("Succeeded", output::positive(counts.succeeded));
    output::field("Skipped", counts.skipped);
    output::field(
        "Failed",
        if counts.failed > 0 {
            output::negative(counts.failed)
        } else {
            counts.failed.to_string()
        },
    );
    output::field(
        "Unknown",
        if counts.unknown > 0 {
            output::caution(counts.unknown)
        } else {
            counts.unknown.to_string()
        },
    );

    if pass.outcomes().is_empty() {
        output::hint("no targets registered; add one with `rebalance-keeper targets add`");
        return;
    }

    output::section("Outcomes");
    let widths = [42, 6, 9, 0];
    output::table_header(&[
        ("target", widths[0]),
        ("kind", widths[1]),
        ("outcome", widths[2]),
        ("detail", widths[3]),
    ]);
    for record in pass.outcomes() {
        print_outcome(record, &widths);
    }

    if !report.unknown().is_empty() {
        output::warning("Some transactions were broadcast without a receipt; the next pass re-reads them");
    }
}
