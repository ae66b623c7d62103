use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Error,
    Warn,
    Info,
}

impl NotifyLevel {
    pub fn ttl_secs(&self) -> u64 {
        match self {
            NotifyLevel::Error => 30,
            NotifyLevel::Warn => 8,
            NotifyLevel::Info => 5,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            NotifyLevel::Error => theme::ERROR_FG,
            NotifyLevel::Warn => theme::WARN_FG,
            NotifyLevel::Info => theme::ACCENT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotifyLevel,
    pub created: Instant,
}

impl Notification {
    pub fn new(level: NotifyLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            created: Instant::now(),
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.created) >= Duration::from_secs(self.level.ttl_secs())
    }
}

pub struct Toast<'a> {
    pub notification: &'a Notification,
}

impl<'a> Widget for Toast<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let first_line = self.notification.message.lines().next().unwrap_or("");
        let text_w = UnicodeWidthStr::width(first_line);
        let box_w = text_w.saturating_add(4).min(area.width as usize) as u16;
        let box_h: u16 = 3;

        if area.width < box_w || area.height < box_h.saturating_add(1) {
            return;
        }

        let x = area.right().saturating_sub(box_w.saturating_add(1));
        let y = area.bottom().saturating_sub(box_h + 1);
        let toast_area = Rect::new(x, y, box_w, box_h);

        Clear.render(toast_area, buf);

        let color = self.notification.level.color();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        let inner = block.inner(toast_area);
        block.render(toast_area, buf);

        if inner.width == 0 {
            return;
        }

        let text = super::truncate_with_ellipsis(first_line, inner.width as usize);
        let line = Line::from(Span::styled(text, Style::default().fg(color)));
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_outlive_info() {
        let now = Instant::now();
        let info = Notification {
            message: "exported".to_string(),
            level: NotifyLevel::Info,
            created: now,
        };
        let err = Notification {
            message: "failed".to_string(),
            level: NotifyLevel::Error,
            created: now,
        };
        let later = now + Duration::from_secs(6);
        assert!(info.expired(later));
        assert!(!err.expired(later));
    }

    #[test]
    fn renders_inside_bottom_right() {
        let n = Notification::new(NotifyLevel::Warn, "3 repos failed");
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buf::empty(area);
        Toast { notification: &n }.render(area, &mut buf);

        let row: String = (0..40).map(|x| buf[(x, 7)].symbol().to_string()).collect();
        assert!(row.contains("3 repos failed"));
    }
}
