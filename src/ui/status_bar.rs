use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub struct StatusBar<'a> {
    pub last_sync: &'a str,
    pub rate_limit: Option<u32>,
    pub fetching: bool,
    pub sort_label: &'a str,
    pub sort_reversed: bool,
    pub error_count: usize,
    pub authenticated: bool,
}

fn separator() -> Span<'static> {
    Span::styled(
        "\u{2502}",
        Style::default()
            .fg(theme::BORDER_COLOR)
            .bg(theme::STATUS_BG),
    )
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let bg = Style::default().bg(theme::STATUS_BG);
        for x in area.x..area.right() {
            buf[(x, area.y)].set_style(bg);
        }

        let mut spans = vec![Span::styled(" ", bg)];

        if self.fetching {
            spans.push(Span::styled(
                "fetching\u{2026} ",
                Style::default()
                    .fg(theme::FILTER_COLOR)
                    .bg(theme::STATUS_BG)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(separator());
        }

        spans.push(Span::styled(format!(" synced: {} ", self.last_sync), bg));
        spans.push(separator());

        let arrow = if self.sort_reversed { "\u{2191}" } else { "\u{2193}" };
        spans.push(Span::styled(
            format!(" sort: {} {arrow} ", self.sort_label),
            bg,
        ));

        if self.error_count > 0 {
            spans.push(separator());
            spans.push(Span::styled(
                format!(" {} failed ", self.error_count),
                Style::default().fg(theme::ERROR_FG).bg(theme::STATUS_BG),
            ));
        }

        spans.push(separator());
        let auth = if self.authenticated { " token " } else { " anonymous " };
        spans.push(Span::styled(
            auth,
            Style::default().fg(theme::DIM_TEXT).bg(theme::STATUS_BG),
        ));

        if let Some(remaining) = self.rate_limit {
            spans.push(separator());
            spans.push(Span::styled(format!(" API: {remaining} "), bg));
        }

        spans.push(separator());
        spans.push(Span::styled(
            " ? help ",
            Style::default().fg(theme::DIM_TEXT).bg(theme::STATUS_BG),
        ));

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
