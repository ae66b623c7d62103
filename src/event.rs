use crate::aggregate::types::Report;
use crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    FetchDone {
        report: Box<Report>,
        rate_limit: Option<u32>,
    },
}
