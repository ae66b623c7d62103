use crate::aggregate::types::TrafficStatus;
use ratatui::style::Color;

pub const SELECTED_BG: Color = Color::Rgb(50, 50, 80);
pub const STATUS_BG: Color = Color::Rgb(30, 30, 40);
pub const ACCENT: Color = Color::Rgb(140, 115, 200);
pub const HEADER_BG: Color = Color::Rgb(25, 25, 38);
pub const SEPARATOR: Color = Color::Rgb(55, 55, 75);
pub const PANEL_LABEL: Color = Color::Rgb(100, 95, 130);
pub const FILTER_COLOR: Color = Color::Cyan;
pub const DIM_TEXT: Color = Color::Rgb(100, 100, 120);
pub const ACTIVE_BORDER: Color = Color::Rgb(120, 120, 180);
pub const BORDER_COLOR: Color = Color::Rgb(70, 70, 95);
pub const ERROR_FG: Color = Color::LightRed;
pub const WARN_FG: Color = Color::Yellow;
pub const OK_FG: Color = Color::LightGreen;

pub fn traffic_color(status: TrafficStatus) -> Color {
    match status {
        TrafficStatus::Ok => OK_FG,
        TrafficStatus::Partial => WARN_FG,
        TrafficStatus::Failed => ERROR_FG,
        TrafficStatus::Skipped => DIM_TEXT,
    }
}
