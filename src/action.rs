use termion::event::Key;

/// ウィジェットに渡すキー入力
///
/// termion の `Key` から変換し、コア側が端末ライブラリに依存しないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RequestNew,
    RequestList,
    AcceptDraft,
    Save,
    Cancel,
    Quit,
    Input(InputKey),
}

pub const HELP_TEXT: &str =
    "Ctrl+N: new file | Ctrl+L: list | Ctrl+S: save | Ctrl+Q: quit | Esc: back/save";

/// キー入力を Action に変換する
///
/// 割り当てのないキーは `None`。
pub fn dispatch(key: Key) -> Option<Action> {
    let action = match key {
        Key::Ctrl('n') => Action::RequestNew,
        Key::Ctrl('l') => Action::RequestList,
        Key::Ctrl('s') => Action::Save,
        Key::Ctrl('q') | Key::Ctrl('c') => Action::Quit,
        Key::Esc => Action::Cancel,
        // raw mode では Enter は '\n' として届く
        Key::Char('\n') | Key::Char('\r') => Action::Input(InputKey::Enter),
        Key::Char('\t') => Action::Input(InputKey::Char('\t')),
        Key::Char(c) if !c.is_control() => Action::Input(InputKey::Char(c)),
        Key::Backspace => Action::Input(InputKey::Backspace),
        Key::Delete => Action::Input(InputKey::Delete),
        Key::Left => Action::Input(InputKey::Left),
        Key::Right => Action::Input(InputKey::Right),
        Key::Up => Action::Input(InputKey::Up),
        Key::Down => Action::Input(InputKey::Down),
        Key::Home => Action::Input(InputKey::Home),
        Key::End => Action::Input(InputKey::End),
        Key::PageUp => Action::Input(InputKey::PageUp),
        Key::PageDown => Action::Input(InputKey::PageDown),
        _ => return None,
    };
    Some(action)
}
