use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    Top,
    Bottom,
    NextPreset,
    PrevPreset,
    ToggleDetail,
    CycleSort,
    ReverseSort,
    OpenInBrowser,
    Refresh,
    Export,
    Help,
    ClosePopup,
    Quit,
    None,
}

pub fn map_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
        KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
        KeyCode::Char('g') | KeyCode::Home => Action::Top,
        KeyCode::Char('G') | KeyCode::End => Action::Bottom,
        KeyCode::Tab => Action::NextPreset,
        KeyCode::BackTab => Action::PrevPreset,
        KeyCode::Enter | KeyCode::Char('d') => Action::ToggleDetail,
        KeyCode::Char('s') => Action::CycleSort,
        KeyCode::Char('S') => Action::ReverseSort,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('e') => Action::Export,
        KeyCode::Char('o') => Action::OpenInBrowser,
        KeyCode::Char('?') => Action::Help,
        KeyCode::Esc => Action::ClosePopup,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(map_key(key(KeyCode::Char('j'))), Action::ScrollDown);
        assert_eq!(map_key(key(KeyCode::Up)), Action::ScrollUp);
        assert_eq!(map_key(key(KeyCode::Tab)), Action::NextPreset);
        assert_eq!(map_key(key(KeyCode::BackTab)), Action::PrevPreset);
    }

    #[test]
    fn ctrl_c_quits_plain_c_does_not() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), Action::Quit);
        assert_eq!(map_key(key(KeyCode::Char('c'))), Action::None);
    }

    #[test]
    fn sort_keys_are_case_sensitive() {
        assert_eq!(map_key(key(KeyCode::Char('s'))), Action::CycleSort);
        assert_eq!(map_key(key(KeyCode::Char('S'))), Action::ReverseSort);
    }

    #[test]
    fn o_opens_and_esc_closes() {
        assert_eq!(map_key(key(KeyCode::Char('o'))), Action::OpenInBrowser);
        assert_eq!(map_key(key(KeyCode::Esc)), Action::ClosePopup);
    }
}
