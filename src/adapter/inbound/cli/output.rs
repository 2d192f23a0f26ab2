//! Terminal output for CLI handlers.
//!
//! Every printer has two renderings: a styled line for humans and a
//! `{"type": .., "payload": ..}` JSON line for scripts. Quiet mode drops
//! informational human output; warnings and errors always print.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::OwoColorize;
use serde_json::json;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Verbosity level (0 = normal, 1+ = increasingly verbose).
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn current() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut slot) => *slot = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

#[must_use]
pub fn is_json() -> bool {
    current().json
}

#[must_use]
pub fn is_quiet() -> bool {
    current().quiet
}

#[must_use]
pub fn verbosity() -> u8 {
    current().verbose
}

/// Route one event to JSON or to the human printer.
fn emit(kind: &str, payload: serde_json::Value, always: bool, human: impl FnOnce()) {
    let config = current();
    if config.json {
        println!("{}", json!({ "type": kind, "payload": payload }));
    } else if always || !config.quiet {
        human();
    }
}

/// Print the application header with name and version.
pub fn header(version: &str) {
    emit(
        "header",
        json!({ "app": "rebalance-keeper", "version": version }),
        false,
        || {
            println!("{} {}", "rebalance-keeper".bold(), version.dimmed());
            println!();
        },
    );
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit(
        "field",
        json!({ "label": label, "value": value }),
        false,
        || println!("  {:<14} {}", label.dimmed(), value),
    );
}

pub fn section(title: &str) {
    emit("section", json!({ "title": title }), false, || {
        println!();
        println!("{}", title.bold());
    });
}

pub fn success(message: &str) {
    emit("success", json!({ "message": message }), false, || {
        println!("  {} {}", "✓".green(), message);
    });
}

pub fn warning(message: &str) {
    emit("warning", json!({ "message": message }), true, || {
        println!("  {} {}", "⚠".yellow(), message);
    });
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!(
            "{}",
            json!({ "type": "error", "payload": { "message": message } })
        );
        return;
    }
    eprintln!("  {} {}", "×".red(), message);
}

/// Print a hint with "hint:" prefix.
pub fn hint(message: &str) {
    emit("hint", json!({ "message": message }), false, || {
        println!("  {}: {}", "hint".cyan().dimmed(), message.dimmed());
    });
}

/// Emit a JSON document as-is, for commands with their own schema.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}

fn styled(value: impl Display, style: impl FnOnce(&str) -> String) -> String {
    let value = value.to_string();
    if is_json() {
        value
    } else {
        style(&value)
    }
}

pub fn positive(value: impl Display) -> String {
    styled(value, |v| v.green().to_string())
}

pub fn negative(value: impl Display) -> String {
    styled(value, |v| v.red().to_string())
}

pub fn caution(value: impl Display) -> String {
    styled(value, |v| v.yellow().to_string())
}

pub fn muted(value: impl Display) -> String {
    styled(value, |v| v.dimmed().to_string())
}

/// Left-aligned table header; widths are in characters.
pub fn table_header(columns: &[(&str, usize)]) {
    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    emit("table_header", json!({ "columns": names }), false, || {
        let mut line = String::from("  ");
        for (name, width) in columns {
            line.push_str(&format!("{name:<width$} "));
        }
        println!("{}", line.trim_end().dimmed());

        let mut rule = String::from("  ");
        for (_, width) in columns {
            rule.push_str(&"─".repeat(*width));
            rule.push(' ');
        }
        println!("{}", rule.trim_end().dimmed());
    });
}

/// Cells may contain ANSI styling, so padding is computed on `plain`.
pub fn table_row(cells: &[(String, String)], widths: &[usize]) {
    let plain: Vec<&str> = cells.iter().map(|(plain, _)| plain.as_str()).collect();
    emit("table_row", json!({ "cells": plain }), false, || {
        let mut line = String::from("  ");
        for ((plain, shown), width) in cells.iter().zip(widths) {
            let pad = width.saturating_sub(plain.chars().count());
            line.push_str(shown);
            line.push_str(&" ".repeat(pad + 1));
        }
        println!("{}", line.trim_end());
    });
}

/// A cell whose displayed form equals its plain text.
#[must_use]
pub fn cell(value: impl Display) -> (String, String) {
    let value = value.to_string();
    (value.clone(), value)
}

/// A cell with styling applied to the displayed form only.
#[must_use]
pub fn styled_cell(value: impl Display, style: impl FnOnce(&str) -> String) -> (String, String) {
    let value = value.to_string();
    let shown = styled(&value, style);
    (value, shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_cell_is_unstyled() {
        let (plain, shown) = cell("0xabc");
        assert_eq!(plain, shown);
    }

    #[test]
    fn styled_cell_keeps_plain_text() {
        let (plain, _) = styled_cell("failed", |v| v.red().to_string());
        assert_eq!(plain, "failed");
    }

    #[test]
    fn output_config_new() {
        let config = OutputConfig::new(true, false, 2);
        assert!(config.json);
        assert!(!config.quiet);
        assert_eq!(config.verbose, 2);
    }
}
