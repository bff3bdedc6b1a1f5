use crate::app::InputMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    NextField,
    PrevField,
    Top,
    Bottom,
    Descend,
    Ascend,
    StartSearch,
    SearchNext,
    SearchPrev,
    SubmitInput,
    CancelInput,
    Backspace,
    DeleteWord,
    InputChar(char),
}

pub fn map_key(mode: InputMode, key: KeyEvent) -> Option<Action> {
    match mode {
        InputMode::Normal => map_normal_mode_key(key),
        InputMode::Pattern => map_pattern_mode_key(key),
    }
}

fn map_normal_mode_key(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('n') if ctrl => Some(Action::ScrollDown),
        KeyCode::Char('p') if ctrl => Some(Action::ScrollUp),
        KeyCode::Char('f') if ctrl => Some(Action::PageDown),
        KeyCode::Char('b') if ctrl => Some(Action::PageUp),
        KeyCode::Char('m') | KeyCode::Char('j') if ctrl => Some(Action::Descend),
        KeyCode::Char('[') if alt => Some(Action::Ascend),
        _ if ctrl || alt => None,
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::ScrollDown),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::ScrollUp),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::Tab => Some(Action::NextField),
        KeyCode::BackTab => Some(Action::PrevField),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::Top),
        KeyCode::Char('G') | KeyCode::End => Some(Action::Bottom),
        KeyCode::Enter => Some(Action::Descend),
        KeyCode::Char('/') => Some(Action::StartSearch),
        KeyCode::Char('n') => Some(Action::SearchNext),
        KeyCode::Char('N') => Some(Action::SearchPrev),
        _ => None,
    }
}

fn map_pattern_mode_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::CancelInput),
        KeyCode::Enter => Some(Action::SubmitInput),
        KeyCode::Char('m') | KeyCode::Char('j')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Action::SubmitInput)
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::DeleteWord)
        }
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            Some(Action::InputChar(c))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, map_key};
    use crate::app::InputMode;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn normal_mode_maps_quit() {
        for c in ['q', 'Q'] {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            assert_eq!(map_key(InputMode::Normal, key), Some(Action::Quit));
        }
    }

    #[test]
    fn normal_mode_maps_scroll_keys() {
        let cases = [
            (KeyCode::Char('j'), KeyModifiers::NONE, Action::ScrollDown),
            (KeyCode::Down, KeyModifiers::NONE, Action::ScrollDown),
            (KeyCode::Char('n'), KeyModifiers::CONTROL, Action::ScrollDown),
            (KeyCode::Char('k'), KeyModifiers::NONE, Action::ScrollUp),
            (KeyCode::Up, KeyModifiers::NONE, Action::ScrollUp),
            (KeyCode::Char('p'), KeyModifiers::CONTROL, Action::ScrollUp),
            (KeyCode::PageDown, KeyModifiers::NONE, Action::PageDown),
            (KeyCode::Char('f'), KeyModifiers::CONTROL, Action::PageDown),
            (KeyCode::PageUp, KeyModifiers::NONE, Action::PageUp),
            (KeyCode::Char('b'), KeyModifiers::CONTROL, Action::PageUp),
        ];
        for (code, modifiers, expected) in cases {
            let key = KeyEvent::new(code, modifiers);
            assert_eq!(map_key(InputMode::Normal, key), Some(expected), "{code:?}");
        }
    }

    #[test]
    fn normal_mode_maps_tab_and_backtab_to_field_selection() {
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        let backtab = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(map_key(InputMode::Normal, tab), Some(Action::NextField));
        assert_eq!(map_key(InputMode::Normal, backtab), Some(Action::PrevField));
    }

    #[test]
    fn normal_mode_maps_jumps() {
        let shift_g = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        let home = KeyEvent::new(KeyCode::Home, KeyModifiers::NONE);
        let end = KeyEvent::new(KeyCode::End, KeyModifiers::NONE);
        let g = KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE);
        assert_eq!(map_key(InputMode::Normal, g), Some(Action::Top));
        assert_eq!(map_key(InputMode::Normal, home), Some(Action::Top));
        assert_eq!(map_key(InputMode::Normal, shift_g), Some(Action::Bottom));
        assert_eq!(map_key(InputMode::Normal, end), Some(Action::Bottom));
    }

    #[test]
    fn ascend_requires_alt_bracket() {
        let alt = KeyEvent::new(KeyCode::Char('['), KeyModifiers::ALT);
        let plain = KeyEvent::new(KeyCode::Char('['), KeyModifiers::NONE);
        assert_eq!(map_key(InputMode::Normal, alt), Some(Action::Ascend));
        assert_eq!(map_key(InputMode::Normal, plain), None);
    }

    #[test]
    fn normal_mode_maps_enter_and_ctrl_m_to_descend() {
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let ctrl_m = KeyEvent::new(KeyCode::Char('m'), KeyModifiers::CONTROL);
        assert_eq!(map_key(InputMode::Normal, enter), Some(Action::Descend));
        assert_eq!(map_key(InputMode::Normal, ctrl_m), Some(Action::Descend));
    }

    #[test]
    fn normal_mode_maps_search_keys() {
        let slash = KeyEvent::new(KeyCode::Char('/'), KeyModifiers::NONE);
        let n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
        let shift_n = KeyEvent::new(KeyCode::Char('N'), KeyModifiers::SHIFT);
        assert_eq!(map_key(InputMode::Normal, slash), Some(Action::StartSearch));
        assert_eq!(map_key(InputMode::Normal, n), Some(Action::SearchNext));
        assert_eq!(map_key(InputMode::Normal, shift_n), Some(Action::SearchPrev));
    }

    #[test]
    fn normal_mode_ignores_unbound_modified_keys() {
        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        let alt_j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::ALT);
        assert_eq!(map_key(InputMode::Normal, ctrl_q), None);
        assert_eq!(map_key(InputMode::Normal, alt_j), None);
    }

    #[test]
    fn pattern_mode_maps_char() {
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(map_key(InputMode::Pattern, key), Some(Action::InputChar('q')));
        let upper = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(map_key(InputMode::Pattern, upper), Some(Action::InputChar('Q')));
    }

    #[test]
    fn pattern_mode_rejects_ctrl_c() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(InputMode::Pattern, key), None);
    }

    #[test]
    fn pattern_mode_maps_editing_keys() {
        let cases = [
            (KeyCode::Enter, KeyModifiers::NONE, Action::SubmitInput),
            (KeyCode::Char('j'), KeyModifiers::CONTROL, Action::SubmitInput),
            (KeyCode::Esc, KeyModifiers::NONE, Action::CancelInput),
            (KeyCode::Backspace, KeyModifiers::NONE, Action::Backspace),
            (KeyCode::Char('w'), KeyModifiers::CONTROL, Action::DeleteWord),
        ];
        for (code, modifiers, expected) in cases {
            let key = KeyEvent::new(code, modifiers);
            assert_eq!(map_key(InputMode::Pattern, key), Some(expected), "{code:?}");
        }
    }
}
