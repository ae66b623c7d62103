use crate::aggregate::types::RepoSummary;
use crate::ui::{group_digits, theme};
use ratatui::{
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table},
};
use std::cmp::Reverse;

pub const COLUMNS: &[&str] = &[
    "Repo",
    "Commits",
    "Stars",
    "Forks",
    "Watchers",
    "Issues",
    "Release DL",
    "Views 14d",
    "Views uniq",
    "Clones 14d",
    "Clones uniq",
    "Traffic",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Input,
    Repo,
    Commits,
    Stars,
    Forks,
    Watchers,
    Issues,
    Downloads,
    Views,
    Clones,
}

impl SortKey {
    const ALL: &'static [SortKey] = &[
        SortKey::Input,
        SortKey::Repo,
        SortKey::Commits,
        SortKey::Stars,
        SortKey::Forks,
        SortKey::Watchers,
        SortKey::Issues,
        SortKey::Downloads,
        SortKey::Views,
        SortKey::Clones,
    ];

    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Input => "input order",
            SortKey::Repo => "repo",
            SortKey::Commits => "commits",
            SortKey::Stars => "stars",
            SortKey::Forks => "forks",
            SortKey::Watchers => "watchers",
            SortKey::Issues => "issues",
            SortKey::Downloads => "release downloads",
            SortKey::Views => "views",
            SortKey::Clones => "clones",
        }
    }

    fn metric(self, r: &RepoSummary) -> u64 {
        match self {
            SortKey::Commits => r.commits_total,
            SortKey::Stars => r.stars,
            SortKey::Forks => r.forks,
            SortKey::Watchers => r.watchers,
            SortKey::Issues => r.open_issues,
            SortKey::Downloads => r.release_asset_downloads_total,
            SortKey::Views => r.views_14d_total,
            SortKey::Clones => r.clones_14d_total,
            SortKey::Input | SortKey::Repo => 0,
        }
    }
}

/// Row order as indices into `repos`. Numeric columns sort largest first
/// unless `reversed`; ties keep input order.
pub fn sorted_indices(repos: &[RepoSummary], key: SortKey, reversed: bool) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..repos.len()).collect();
    match key {
        SortKey::Input => {}
        SortKey::Repo => idx.sort_by_key(|&i| repos[i].repo.to_lowercase()),
        _ => idx.sort_by_key(|&i| Reverse(key.metric(&repos[i]))),
    }
    if reversed {
        idx.reverse();
    }
    idx
}

fn row_for(r: &RepoSummary) -> Row<'_> {
    let num = |n: u64| Cell::from(Line::from(group_digits(n)).right_aligned());

    let mut repo_spans = vec![Span::raw(r.repo.as_str())];
    if !r.warnings().is_empty() {
        repo_spans.push(Span::styled(" !", Style::default().fg(theme::WARN_FG)));
    }

    Row::new(vec![
        Cell::from(Line::from(repo_spans)),
        num(r.commits_total),
        num(r.stars),
        num(r.forks),
        num(r.watchers),
        num(r.open_issues),
        num(r.release_asset_downloads_total),
        num(r.views_14d_total),
        num(r.views_14d_unique),
        num(r.clones_14d_total),
        num(r.clones_14d_unique),
        Cell::from(Span::styled(
            r.traffic_status.label(),
            Style::default().fg(theme::traffic_color(r.traffic_status)),
        )),
    ])
}

pub fn build<'a>(repos: &'a [RepoSummary], order: &[usize], title: String, focused: bool) -> Table<'a> {
    let header = Row::new(COLUMNS.iter().map(|c| {
        Cell::from(*c).style(
            Style::default()
                .fg(theme::PANEL_LABEL)
                .add_modifier(Modifier::BOLD),
        )
    }))
    .bottom_margin(0);

    let rows: Vec<Row<'a>> = order
        .iter()
        .filter_map(|&i| repos.get(i))
        .map(row_for)
        .collect();

    let mut widths = vec![Constraint::Min(20)];
    widths.extend(std::iter::repeat(Constraint::Length(11)).take(COLUMNS.len() - 2));
    widths.push(Constraint::Length(8));

    let border = if focused {
        theme::ACTIVE_BORDER
    } else {
        theme::BORDER_COLOR
    };

    Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
        .row_highlight_style(Style::default().bg(theme::SELECTED_BG))
        .column_spacing(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_summary;

    fn repos() -> Vec<RepoSummary> {
        vec![
            make_summary("b/beta", 5, 100),
            make_summary("A/alpha", 50, 10),
            make_summary("c/gamma", 5, 1000),
        ]
    }

    #[test]
    fn input_order_by_default() {
        assert_eq!(sorted_indices(&repos(), SortKey::Input, false), vec![0, 1, 2]);
        assert_eq!(sorted_indices(&repos(), SortKey::Input, true), vec![2, 1, 0]);
    }

    #[test]
    fn numeric_sort_descending_and_stable() {
        assert_eq!(sorted_indices(&repos(), SortKey::Stars, false), vec![1, 0, 2]);
        assert_eq!(sorted_indices(&repos(), SortKey::Commits, false), vec![2, 0, 1]);
    }

    #[test]
    fn repo_sort_ignores_case() {
        assert_eq!(sorted_indices(&repos(), SortKey::Repo, false), vec![1, 0, 2]);
    }

    #[test]
    fn sort_key_cycles_back_to_input() {
        let mut key = SortKey::Input;
        for _ in 0..SortKey::ALL.len() {
            key = key.next();
        }
        assert_eq!(key, SortKey::Input);
    }
}
