//! `history`: recent passes from the pass recorder.

use serde_json::json;

use super::command::HistoryArgs;
use super::{load_config, output};
use crate::adapter::outbound::sqlite::SqlitePassRecorder;
use crate::domain::report::RunReport;
use crate::error::Result;
use crate::infrastructure::bootstrap::init_database;

#[allow(clippy::result_large_err)]
pub fn execute(args: &HistoryArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let recorder = SqlitePassRecorder::new(init_database(&config)?);
    let passes = recorder.load_recent(args.limit)?;

    if output::is_json() {
        let entries = passes
            .iter()
            .map(|pass| {
                json!({
                    "started_at": pass.started_at(),
                    "finished_at": pass.finished_at(),
                    "report": RunReport::from_pass(pass),
                })
            })
            .collect::<Vec<_>>();
        output::json_output(json!({ "command": "history", "passes": entries }));
        return Ok(());
    }

    if passes.is_empty() {
        output::hint("no passes recorded yet; run `rebalance-keeper pass`");
        return Ok(());
    }

    output::section("Recent passes");
    let widths = [20, 8, 9, 7, 9, 9, 7, 6, 7];
    output::table_header(&[
        ("started", widths[0]),
        ("pass", widths[1]),
        ("status", widths[2]),
        ("targets", widths[3]),
        ("attempted", widths[4]),
        ("succeeded", widths[5]),
        ("skipped", widths[6]),
        ("failed", widths[7]),
        ("unknown", widths[8]),
    ]);

    for pass in &passes {
        let report = RunReport::from_pass(pass);
        let counts = report.counts();
        let status = if report.aborted().is_some() {
            output::styled_cell("aborted", |v| output::negative(v))
        } else if report.is_clean() {
            output::styled_cell("completed", |v| output::positive(v))
        } else {
            output::styled_cell("completed", |v| output::caution(v))
        };
        let short_id: String = pass.id().as_str().chars().take(8).collect();

        output::table_row(
            &[
                output::cell(pass.started_at().format("%Y-%m-%d %H:%M:%S")),
                output::cell(short_id),
                status,
                output::cell(counts.targets),
                output::cell(counts.attempted),
                output::cell(counts.succeeded),
                output::cell(counts.skipped),
                output::cell(counts.failed),
                output::cell(counts.unknown),
            ],
            &widths,
        );
        if output::verbosity() > 0 {
            if let Some(reason) = report.aborted() {
                output::field("reason", reason);
            }
            for failure in report.failures() {
                output::field(failure.target_id.as_str(), &failure.message);
            }
        }
    }
    Ok(())
}
