use crate::aggregate::types::Report;
use crate::config::app_dir;
use crate::error::Result;
use crate::ui::{group_digits, results_table::COLUMNS};
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthStr;

pub fn default_export_path() -> PathBuf {
    app_dir().join("analytics.json")
}

/// Writes the report as pretty-printed JSON, creating parent directories.
pub fn export(report: &Report, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), repos = report.repos.len(), "report exported");
    Ok(())
}

pub fn load(path: &Path) -> Result<Report> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Plain-text table of every repository followed by errors and totals.
pub fn text_table(report: &Report) -> String {
    let rows: Vec<Vec<String>> = report
        .repos
        .iter()
        .map(|r| {
            vec![
                r.repo.clone(),
                group_digits(r.commits_total),
                group_digits(r.stars),
                group_digits(r.forks),
                group_digits(r.watchers),
                group_digits(r.open_issues),
                group_digits(r.release_asset_downloads_total),
                group_digits(r.views_14d_total),
                group_digits(r.views_14d_unique),
                group_digits(r.clones_14d_total),
                group_digits(r.clones_14d_unique),
                r.traffic_status.label().to_string(),
            ]
        })
        .collect();

    let widths: Vec<usize> = COLUMNS
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .map(|row| row[col].width())
                .chain(std::iter::once(header.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(col, (cell, &w))| {
                let pad = " ".repeat(w.saturating_sub(cell.width()));
                if col == 0 {
                    format!("{cell}{pad}")
                } else {
                    format!("{pad}{cell}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format_row(COLUMNS));
    out.push('\n');
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&format_row(&cells));
        out.push('\n');
    }

    for r in &report.repos {
        for (what, msg) in r.warnings() {
            out.push_str(&format!("warning: {} {what}: {}\n", r.repo, msg.replace('\n', "; ")));
        }
    }
    for e in &report.errors {
        out.push_str(&format!("error: {}: {}\n", e.repo, e.error));
    }

    out.push('\n');
    out.push_str(&format!("Totals: {}\n", report.totals.one_line()));
    out
}
