use crate::aggregate::types::RepoSummary;
use crate::resolve::RepoError;
use crate::ui::{group_digits, theme, truncate_with_ellipsis};
use itertools::Itertools;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

const MAX_RELEASES: usize = 5;
const MAX_LANGUAGES: usize = 5;
const MAX_REFERRERS: usize = 3;

pub struct DetailPanel<'a> {
    pub repo: Option<&'a RepoSummary>,
    pub errors: &'a [RepoError],
}

fn labeled(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label} "), Style::default().fg(theme::ACCENT)),
        Span::raw(value),
    ])
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(theme::PANEL_LABEL)
            .add_modifier(Modifier::BOLD),
    ))
}

fn date_part(ts: &str) -> String {
    ts.split('T').next().unwrap_or(ts).to_string()
}

pub fn detail_lines(repo: Option<&RepoSummary>, errors: &[RepoError]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(r) = repo {
        lines.push(Line::from(Span::styled(
            r.repo.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(labeled("URL", r.html_url.clone()));
        lines.push(labeled("Branch", r.default_branch.clone()));
        lines.push(labeled("Created", date_part(&r.created_at)));
        lines.push(labeled("Pushed", date_part(&r.pushed_at)));
        lines.push(labeled("Size", format!("{} KB", group_digits(r.size_kb))));
        if !r.language.is_empty() {
            lines.push(labeled("Language", r.language.clone()));
        }

        if !r.languages.is_empty() {
            let total: u64 = r.languages.values().sum();
            let top = r
                .languages
                .iter()
                .sorted_by_key(|(_, bytes)| std::cmp::Reverse(**bytes))
                .take(MAX_LANGUAGES)
                .map(|(name, bytes)| {
                    let pct = if total == 0 { 0.0 } else { *bytes as f64 * 100.0 / total as f64 };
                    format!("{name} {pct:.0}%")
                })
                .join(", ");
            lines.push(labeled("Langs", top));
        }

        lines.push(Line::raw(""));
        lines.push(section(&format!(
            "Releases ({}, {} downloads)",
            r.releases_count,
            group_digits(r.release_asset_downloads_total)
        )));
        for rel in r.releases.iter().take(MAX_RELEASES) {
            lines.push(Line::from(vec![
                Span::raw(format!("  {} ", rel.tag)),
                Span::styled(
                    format!(
                        "{} \u{00b7} {} assets \u{00b7} {} dl",
                        date_part(&rel.published_at),
                        rel.assets_count,
                        group_digits(rel.assets_downloads)
                    ),
                    Style::default().fg(theme::DIM_TEXT),
                ),
            ]));
        }

        if let Some(referrers) = r.traffic.as_ref().and_then(|t| t.referrers.as_ref()) {
            if !referrers.is_empty() {
                lines.push(Line::raw(""));
                lines.push(section("Top referrers"));
                for rf in referrers.iter().take(MAX_REFERRERS) {
                    lines.push(Line::raw(format!(
                        "  {} ({} / {} unique)",
                        rf.referrer, rf.count, rf.uniques
                    )));
                }
            }
        }

        let warnings = r.warnings();
        if !warnings.is_empty() {
            lines.push(Line::raw(""));
            lines.push(section("Warnings"));
            for (what, msg) in warnings {
                for msg_line in msg.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {what}: {msg_line}"),
                        Style::default().fg(theme::WARN_FG),
                    )));
                }
            }
        }
    } else {
        lines.push(Line::from(Span::styled(
            "No repository selected",
            Style::default().fg(theme::DIM_TEXT),
        )));
    }

    if !errors.is_empty() {
        lines.push(Line::raw(""));
        lines.push(section("Errors"));
        for e in errors {
            lines.push(Line::from(Span::styled(
                format!("  {}: {}", e.repo, e.error),
                Style::default().fg(theme::ERROR_FG),
            )));
        }
    }

    lines
}

impl<'a> Widget for DetailPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let block = Block::default()
            .title(" Detail ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BORDER_COLOR));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 10 {
            return;
        }

        let width = inner.width.saturating_sub(1) as usize;
        for (i, line) in detail_lines(self.repo, self.errors)
            .into_iter()
            .take(inner.height as usize)
            .enumerate()
        {
            let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
            let line = if text.chars().count() > width {
                let style = line.spans.first().map(|s| s.style).unwrap_or_default();
                Line::from(Span::styled(truncate_with_ellipsis(&text, width), style))
            } else {
                line
            };
            buf.set_line(inner.x + 1, inner.y + i as u16, &line, inner.width - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::types::ReleaseSummary;
    use crate::test_utils::make_summary;

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn shows_repo_fields_and_warnings() {
        let mut r = make_summary("octo/cat", 1, 2);
        r.created_at = "2020-01-01T00:00:00Z".to_string();
        r.releases_count = 1;
        r.release_asset_downloads_total = 1500;
        r.releases.push(ReleaseSummary {
            tag: "v1".to_string(),
            name: "one".to_string(),
            published_at: "2024-02-03T00:00:00Z".to_string(),
            assets_count: 2,
            assets_downloads: 1500,
        });
        r.traffic_error = Some("views: HTTP 403\nclones: HTTP 403".to_string());

        let out = text(&detail_lines(Some(&r), &[]));
        assert_eq!(out[0], "octo/cat");
        assert!(out.contains(&"Created 2020-01-01".to_string()));
        assert!(out.iter().any(|l| l == "Releases (1, 1,500 downloads)"));
        assert!(out.iter().any(|l| l.starts_with("  v1 2024-02-03")));
        assert!(out.iter().any(|l| l == "  traffic: views: HTTP 403"));
        assert!(out.iter().any(|l| l == "  traffic: clones: HTTP 403"));
    }

    #[test]
    fn lists_report_errors_without_selection() {
        let errors = vec![RepoError {
            repo: "ghost/none".to_string(),
            error: "GitHub API HTTP 404".to_string(),
        }];
        let out = text(&detail_lines(None, &errors));
        assert_eq!(out[0], "No repository selected");
        assert!(out.contains(&"  ghost/none: GitHub API HTTP 404".to_string()));
    }
}
