use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub struct HeaderBar<'a> {
    pub preset_names: &'a [&'a str],
    pub active_preset: &'a str,
    pub repo_count: usize,
}

impl<'a> Widget for HeaderBar<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let bg = Style::default().bg(theme::HEADER_BG);
        for x in area.x..area.right() {
            buf[(x, area.y)].set_style(bg);
        }

        let mut spans: Vec<Span<'static>> = vec![
            Span::styled(
                " repotally",
                Style::default()
                    .fg(theme::ACCENT)
                    .bg(theme::HEADER_BG)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                " \u{2503} ",
                Style::default().fg(theme::SEPARATOR).bg(theme::HEADER_BG),
            ),
        ];

        for name in self.preset_names {
            let style = if *name == self.active_preset {
                Style::default()
                    .fg(theme::FILTER_COLOR)
                    .bg(theme::HEADER_BG)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::DIM_TEXT).bg(theme::HEADER_BG)
            };
            spans.push(Span::styled(format!("[{name}]"), style));
            spans.push(Span::styled(" ", bg));
        }

        spans.push(Span::styled(
            format!("{} repos", self.repo_count),
            Style::default().fg(theme::DIM_TEXT).bg(theme::HEADER_BG),
        ));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
