// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `snapclaim check` command implementation.
//!
//! Prints the settings the pipeline would run with after label merging,
//! id parsing, and clamping. Reaching this command means validation passed.

use std::io::IsTerminal;

use snapclaim_config::model::SnapclaimConfig;
use snapclaim_dispatch::PipelineSettings;

use crate::serve::allowlist_summary;

/// Runs the `snapclaim check` command.
///
/// With `--plain`, disables colored output.
pub fn run_check(config: &SnapclaimConfig, plain: bool) {
    let use_color = !plain && std::io::stdout().is_terminal();
    let settings = PipelineSettings::from_config(config);
    print!("{}", render_check(config, &settings, use_color));
}

fn sources(settings: &PipelineSettings) -> String {
    let mut names = Vec::new();
    if settings.on_message {
        names.push("message");
    }
    if settings.on_edit {
        names.push("edit");
    }
    names.join(", ")
}

/// Renders the effective settings report.
pub fn render_check(config: &SnapclaimConfig, settings: &PipelineSettings, use_color: bool) -> String {
    let prometheus = if config.prometheus.enabled {
        config.prometheus.listen_address.trim().to_string()
    } else {
        "disabled".to_string()
    };

    let rows = [
        ("labels", settings.display_labels.join(", ")),
        ("allowlists", allowlist_summary(settings)),
        ("sources", sources(settings)),
        ("workers", settings.workers.to_string()),
        ("queue capacity", settings.queue_capacity.to_string()),
        (
            "dedup ttl",
            format!(
                "{}s (sweep every {}s)",
                settings.dedup_ttl.as_secs(),
                settings.cleanup_interval().as_secs()
            ),
        ),
        ("stats interval", format!("{}s", settings.stats_interval.as_secs())),
        ("metrics window", settings.metrics_window.to_string()),
        ("prometheus", prometheus),
    ];

    let mut out = String::new();
    out.push('\n');
    out.push_str("  snapclaim check\n");
    out.push_str(&format!("  {}\n", "-".repeat(50)));

    for (name, value) in &rows {
        out.push_str(&format!("    {name:<20} {value}\n"));
    }

    out.push('\n');
    if use_color {
        use colored::Colorize;
        out.push_str(&format!("  {} configuration is valid.\n", "✓".green()));
    } else {
        out.push_str("  [OK] configuration is valid.\n");
    }
    out.push('\n');
    out
}
