use std::mem;
use std::path::{Path, PathBuf};

use crate::action::Action;
use crate::error::VaultError;
use crate::logger;
use crate::mode::Mode;
use crate::note_list::{ListEntry, project};
use crate::vault::{MAX_NAME_LEN, NoteHandle, VaultStore, normalize_name};
use crate::widget::{NoteList, TextArea, TextInput, Widget, WidgetCommand};

pub const NAME_PLACEHOLDER: &str = "What you like to call it?";
pub const CONTENT_PLACEHOLDER: &str = "Write something inside your file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// 次の操作までだけ表示されるメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

/// 編集中のノート
pub struct OpenNote {
    name: String,
    path: PathBuf,
    /// 保存に失敗するとハンドルは閉じられ、次の保存で開き直す
    handle: Option<NoteHandle>,
    editor: TextArea,
}

impl OpenNote {
    fn new(handle: NoteHandle, content: &str) -> Self {
        let mut editor = TextArea::new(CONTENT_PLACEHOLDER);
        editor.set_value(content);
        editor.focus();
        Self {
            name: handle.name().to_string(),
            path: handle.path().to_path_buf(),
            handle: Some(handle),
            editor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> String {
        self.editor.value()
    }

    pub fn is_dirty(&self) -> bool {
        self.editor.is_dirty()
    }
}

/// Naming をキャンセルしたときの戻り先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReturnTo {
    Idle,
    Listing,
}

enum State {
    Idle,
    Naming { draft: TextInput, return_to: ReturnTo },
    Editing(OpenNote),
    Listing(NoteList),
}

impl State {
    fn mode(&self) -> Mode {
        match self {
            State::Idle => Mode::Idle,
            State::Naming { .. } => Mode::Naming,
            State::Editing(_) => Mode::Editing,
            State::Listing(_) => Mode::Listing,
        }
    }
}

/// 画面のモードと編集状態を管理する
///
/// 状態は `handle` による遷移でのみ変化する。
pub struct Session {
    store: VaultStore,
    state: State,
    status: Option<StatusMessage>,
    escape_quits: bool,
    /// 本文領域の大きさ (width, height)
    viewport: (usize, usize),
}

impl Session {
    pub fn new(store: VaultStore, escape_quits: bool) -> Self {
        Self {
            store,
            state: State::Idle,
            status: None,
            escape_quits,
            viewport: (usize::MAX, usize::MAX),
        }
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Naming 中の入力途中の名前
    pub fn draft(&self) -> Option<String> {
        match &self.state {
            State::Naming { draft, .. } => Some(draft.value()),
            _ => None,
        }
    }

    pub fn open_note(&self) -> Option<&OpenNote> {
        match &self.state {
            State::Editing(note) => Some(note),
            _ => None,
        }
    }

    pub fn entries(&self) -> Option<&[ListEntry]> {
        match &self.state {
            State::Listing(list) => Some(list.entries()),
            _ => None,
        }
    }

    /// 現在のモードで表示するウィジェット
    pub fn active_widget(&self) -> Option<&dyn Widget> {
        match &self.state {
            State::Idle => None,
            State::Naming { draft, .. } => Some(draft),
            State::Editing(note) => Some(&note.editor),
            State::Listing(list) => Some(list),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.viewport = (width, height);
        match &mut self.state {
            State::Idle => {}
            State::Naming { draft, .. } => draft.resize(width, height),
            State::Editing(note) => note.editor.resize(width, height),
            State::Listing(list) => list.resize(width, height),
        }
    }

    pub fn handle(&mut self, action: Action) -> Outcome {
        self.status = None;

        if action == Action::Quit {
            self.quit();
            return Outcome::Quit;
        }

        let before = self.state.mode();
        // Naming > Editing > Listing > Idle の順に処理する
        let (next, outcome) = match mem::replace(&mut self.state, State::Idle) {
            State::Naming { draft, return_to } => (
                self.on_naming(draft, return_to, action),
                Outcome::Continue,
            ),
            State::Editing(note) => (self.on_editing(note, action), Outcome::Continue),
            State::Listing(list) => (self.on_listing(list, action), Outcome::Continue),
            State::Idle => self.on_idle(action),
        };

        if next.mode() != before {
            logger::debug(&format!("{:?}: {:?} -> {:?}", action, before, next.mode()));
        }
        self.state = next;
        outcome
    }

    fn on_idle(&mut self, action: Action) -> (State, Outcome) {
        match action {
            Action::RequestNew => (self.start_naming(ReturnTo::Idle), Outcome::Continue),
            Action::RequestList => (
                self.enter_listing(None).unwrap_or(State::Idle),
                Outcome::Continue,
            ),
            Action::Cancel if self.escape_quits => {
                self.quit();
                (State::Idle, Outcome::Quit)
            }
            _ => (State::Idle, Outcome::Continue),
        }
    }

    fn on_naming(&mut self, mut draft: TextInput, return_to: ReturnTo, action: Action) -> State {
        match action {
            Action::AcceptDraft => self.accept_draft(draft, return_to),
            Action::Cancel => match return_to {
                ReturnTo::Idle => State::Idle,
                ReturnTo::Listing => self.enter_listing(None).unwrap_or(State::Idle),
            },
            Action::Input(key) => match draft.handle(key) {
                Some(WidgetCommand::Submit) => self.accept_draft(draft, return_to),
                None => State::Naming { draft, return_to },
            },
            _ => State::Naming { draft, return_to },
        }
    }

    fn on_editing(&mut self, mut note: OpenNote, action: Action) -> State {
        match action {
            // Esc も保存して閉じる
            Action::Save | Action::Cancel => self.save(note),
            Action::Input(key) => {
                note.editor.handle(key);
                State::Editing(note)
            }
            _ => State::Editing(note),
        }
    }

    fn on_listing(&mut self, mut list: NoteList, action: Action) -> State {
        match action {
            Action::RequestNew => self.start_naming(ReturnTo::Listing),
            Action::RequestList => {
                let selected = list.value();
                self.enter_listing(Some(selected.as_str()))
                    .unwrap_or(State::Listing(list))
            }
            Action::Cancel => State::Idle,
            Action::Input(key) => match list.handle(key) {
                Some(WidgetCommand::Submit) => self.open_selected(list),
                None => State::Listing(list),
            },
            _ => State::Listing(list),
        }
    }

    fn start_naming(&mut self, return_to: ReturnTo) -> State {
        let mut draft = TextInput::new(NAME_PLACEHOLDER, MAX_NAME_LEN);
        draft.resize(self.viewport.0, self.viewport.1);
        draft.focus();
        State::Naming { draft, return_to }
    }

    /// 一覧を読み直す。失敗した場合はメッセージを出して `None`
    fn enter_listing(&mut self, selected: Option<&str>) -> Option<State> {
        match self.store.list_notes() {
            Ok(summaries) => {
                let mut list = NoteList::new(project(&summaries));
                list.resize(self.viewport.0, self.viewport.1);
                list.focus();
                if let Some(name) = selected {
                    list.set_value(name);
                }
                Some(State::Listing(list))
            }
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    fn accept_draft(&mut self, draft: TextInput, return_to: ReturnTo) -> State {
        let raw = draft.value();
        let name = match normalize_name(&raw) {
            Ok(name) => name,
            Err(e) => {
                self.report(&e);
                return State::Naming { draft, return_to };
            }
        };

        if self.store.exists(&name) {
            self.report(&VaultError::AlreadyExists { name });
            return State::Naming { draft, return_to };
        }

        match self.store.create(&name) {
            Ok(handle) => {
                self.info(format!("Created {}", name));
                self.editing(OpenNote::new(handle, ""))
            }
            Err(e) => {
                self.report(&e);
                State::Naming { draft, return_to }
            }
        }
    }

    fn open_selected(&mut self, list: NoteList) -> State {
        let name = list.value();
        match self.store.open(&name) {
            Ok((handle, content)) => self.editing(OpenNote::new(handle, &content)),
            Err(e) => {
                self.report(&e);
                State::Listing(list)
            }
        }
    }

    fn editing(&self, mut note: OpenNote) -> State {
        note.editor.resize(self.viewport.0, self.viewport.1);
        State::Editing(note)
    }

    fn save(&mut self, mut note: OpenNote) -> State {
        let handle = match note.handle.take() {
            Some(handle) => handle,
            None => match self.store.open(&note.name) {
                Ok((handle, _)) => handle,
                Err(e) => {
                    self.report(&e);
                    return State::Editing(note);
                }
            },
        };

        match self.store.overwrite(handle, &note.editor.value()) {
            Ok(()) => {
                self.info(format!("Saved {}", note.name));
                State::Idle
            }
            Err(e) => {
                self.report(&e);
                State::Editing(note)
            }
        }
    }

    fn quit(&mut self) {
        if let State::Editing(note) = &self.state
            && note.is_dirty()
        {
            logger::warn(&format!("discarding unsaved changes to {}", note.name));
        }
        self.state = State::Idle;
    }

    fn info(&mut self, text: String) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Info,
            text,
        });
    }

    fn report(&mut self, error: &VaultError) {
        logger::warn(&error.to_string());
        self.status = Some(StatusMessage {
            kind: StatusKind::Error,
            text: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::InputKey;
    use std::fs;
    use tempfile::TempDir;

    fn session() -> (TempDir, Session) {
        let dir = TempDir::new().unwrap();
        let store = VaultStore::new(dir.path().join(".noteify"));
        store.ensure_vault().unwrap();
        (dir, Session::new(store, true))
    }

    /// 入力欄にまとめて文字を送る
    fn type_text(session: &mut Session, text: &str) {
        for c in text.chars() {
            let key = if c == '\n' {
                InputKey::Enter
            } else {
                InputKey::Char(c)
            };
            session.handle(Action::Input(key));
        }
    }

    fn note_path(session: &Session, name: &str) -> PathBuf {
        session.store.root().join(format!("{}.md", name))
    }

    fn create_note(session: &mut Session, name: &str, content: &str) {
        session.handle(Action::RequestNew);
        type_text(session, name);
        session.handle(Action::AcceptDraft);
        assert_eq!(session.mode(), Mode::Editing);
        type_text(session, content);
        session.handle(Action::Save);
        assert_eq!(session.mode(), Mode::Idle);
    }

    #[test]
    fn test_initial_state() {
        let (_dir, session) = session();
        assert_eq!(session.mode(), Mode::Idle);
        assert!(session.status().is_none());
        assert!(session.active_widget().is_none());
    }

    #[test]
    fn test_new_note_scenario() {
        let (_dir, mut session) = session();

        session.handle(Action::RequestNew);
        assert_eq!(session.mode(), Mode::Naming);
        assert_eq!(session.draft().as_deref(), Some(""));

        type_text(&mut session, "todo");
        session.handle(Action::AcceptDraft);
        assert_eq!(session.mode(), Mode::Editing);
        assert_eq!(session.open_note().unwrap().name(), "todo");
        assert_eq!(
            session.open_note().unwrap().path(),
            note_path(&session, "todo")
        );
        assert_eq!(session.draft(), None);

        type_text(&mut session, "buy milk");
        session.handle(Action::Save);
        assert_eq!(session.mode(), Mode::Idle);
        assert!(session.open_note().is_none());
        assert_eq!(
            session.status().map(|s| s.kind),
            Some(StatusKind::Info)
        );

        session.handle(Action::RequestList);
        assert_eq!(session.mode(), Mode::Listing);
        let entries = session.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "todo");
        assert!(entries[0].description.starts_with("Modified: "));

        assert_eq!(
            fs::read_to_string(note_path(&session, "todo")).unwrap(),
            "buy milk"
        );
    }

    #[test]
    fn test_enter_in_naming_accepts_draft() {
        let (_dir, mut session) = session();
        session.handle(Action::RequestNew);
        type_text(&mut session, "todo\n");

        assert_eq!(session.mode(), Mode::Editing);
        assert!(note_path(&session, "todo").exists());
    }

    #[test]
    fn test_accept_existing_name_stays_naming() {
        let (_dir, mut session) = session();
        create_note(&mut session, "todo", "original");

        session.handle(Action::RequestNew);
        type_text(&mut session, "todo");
        session.handle(Action::AcceptDraft);

        assert_eq!(session.mode(), Mode::Naming);
        assert_eq!(session.draft().as_deref(), Some("todo"));
        assert_eq!(
            session.status().map(|s| s.kind),
            Some(StatusKind::Error)
        );
        assert_eq!(
            fs::read_to_string(note_path(&session, "todo")).unwrap(),
            "original"
        );
    }

    #[test]
    fn test_accept_invalid_name_stays_naming() {
        let (dir, mut session) = session();
        session.handle(Action::RequestNew);
        type_text(&mut session, "../escape");
        session.handle(Action::AcceptDraft);

        assert_eq!(session.mode(), Mode::Naming);
        assert!(session.status().unwrap().text.contains("invalid note name"));
        assert!(!dir.path().join("escape.md").exists());

        // 空の名前も受け付けない
        session.handle(Action::Cancel);
        session.handle(Action::RequestNew);
        session.handle(Action::AcceptDraft);
        assert_eq!(session.mode(), Mode::Naming);
        assert!(session.store.list_notes().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_naming_returns_to_idle() {
        let (_dir, mut session) = session();
        session.handle(Action::RequestNew);

        let outcome = session.handle(Action::Cancel);

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(session.mode(), Mode::Idle);
        assert_eq!(session.draft(), None);
        assert!(session.store.list_notes().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_naming_returns_to_listing() {
        let (_dir, mut session) = session();
        session.handle(Action::RequestList);
        session.handle(Action::RequestNew);
        type_text(&mut session, "draft");

        session.handle(Action::Cancel);

        assert_eq!(session.mode(), Mode::Listing);
        assert!(session.entries().unwrap().is_empty());
    }

    #[test]
    fn test_new_draft_is_cleared() {
        let (_dir, mut session) = session();
        session.handle(Action::RequestNew);
        type_text(&mut session, "abandoned");
        session.handle(Action::Cancel);

        session.handle(Action::RequestNew);
        assert_eq!(session.draft().as_deref(), Some(""));
    }

    #[test]
    fn test_save_twice_overwrites() {
        let (_dir, mut session) = session();
        create_note(&mut session, "a", "first version, longer");

        session.handle(Action::RequestList);
        session.handle(Action::Input(InputKey::Enter));
        assert_eq!(session.mode(), Mode::Editing);
        assert_eq!(
            session.open_note().unwrap().content(),
            "first version, longer"
        );

        // 全選択の代わりに一度空にしてから書き直す
        for _ in 0.."first version, longer".len() {
            session.handle(Action::Input(InputKey::Delete));
        }
        type_text(&mut session, "second");
        session.handle(Action::Save);

        assert_eq!(
            fs::read_to_string(note_path(&session, "a")).unwrap(),
            "second"
        );
    }

    #[test]
    fn test_reopen_empty_note() {
        let (_dir, mut session) = session();
        create_note(&mut session, "a", "");

        session.handle(Action::RequestList);
        session.handle(Action::Input(InputKey::Enter));

        assert_eq!(session.mode(), Mode::Editing);
        let note = session.open_note().unwrap();
        assert_eq!(note.name(), "a");
        assert_eq!(note.content(), "");
        assert!(!note.is_dirty());
    }

    #[test]
    fn test_escape_in_editing_saves() {
        let (_dir, mut session) = session();
        session.handle(Action::RequestNew);
        type_text(&mut session, "esc");
        session.handle(Action::AcceptDraft);
        type_text(&mut session, "line1\nline2");

        let outcome = session.handle(Action::Cancel);

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(session.mode(), Mode::Idle);
        assert_eq!(
            fs::read_to_string(note_path(&session, "esc")).unwrap(),
            "line1\nline2"
        );
    }

    #[test]
    fn test_escape_in_idle() {
        let (_dir, mut session) = session();
        assert_eq!(session.handle(Action::Cancel), Outcome::Quit);

        let dir = TempDir::new().unwrap();
        let mut session = Session::new(VaultStore::new(dir.path()), false);
        assert_eq!(session.handle(Action::Cancel), Outcome::Continue);
        assert_eq!(session.mode(), Mode::Idle);
    }

    #[test]
    fn test_escape_in_listing_goes_back() {
        let (_dir, mut session) = session();
        session.handle(Action::RequestList);

        assert_eq!(session.handle(Action::Cancel), Outcome::Continue);
        assert_eq!(session.mode(), Mode::Idle);
    }

    #[test]
    fn test_failed_save_keeps_editing_and_retries() {
        let (_dir, mut session) = session();
        session.handle(Action::RequestNew);
        type_text(&mut session, "todo");
        session.handle(Action::AcceptDraft);
        type_text(&mut session, "buy milk");

        // 書き込めないハンドルに差し替える
        let path = note_path(&session, "todo");
        if let State::Editing(note) = &mut session.state {
            note.handle = Some(NoteHandle::read_only("todo", &path).unwrap());
        }
        session.handle(Action::Save);

        assert_eq!(session.mode(), Mode::Editing);
        let status = session.status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("truncate"));
        let note = session.open_note().unwrap();
        assert!(note.handle.is_none());
        assert_eq!(note.content(), "buy milk");
        assert!(note.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        // 次の保存ではファイルを開き直す
        session.handle(Action::Save);

        assert_eq!(session.mode(), Mode::Idle);
        assert_eq!(fs::read_to_string(&path).unwrap(), "buy milk");
    }

    #[test]
    fn test_quit_discards_unsaved_buffer() {
        let (_dir, mut session) = session();
        session.handle(Action::RequestNew);
        type_text(&mut session, "draft");
        session.handle(Action::AcceptDraft);
        type_text(&mut session, "never saved");

        assert_eq!(session.handle(Action::Quit), Outcome::Quit);
        assert_eq!(session.mode(), Mode::Idle);
        assert_eq!(
            fs::read_to_string(note_path(&session, "draft")).unwrap(),
            ""
        );
    }

    #[test]
    fn test_actions_ignored_outside_their_modes() {
        let (_dir, mut session) = session();

        session.handle(Action::Save);
        session.handle(Action::AcceptDraft);
        session.handle(Action::Input(InputKey::Char('x')));
        assert_eq!(session.mode(), Mode::Idle);

        // Naming 中の一覧要求は無視する
        session.handle(Action::RequestNew);
        session.handle(Action::RequestList);
        session.handle(Action::Save);
        assert_eq!(session.mode(), Mode::Naming);

        // Editing 中の新規作成・一覧要求も無視する
        type_text(&mut session, "n");
        session.handle(Action::AcceptDraft);
        session.handle(Action::RequestNew);
        session.handle(Action::RequestList);
        assert_eq!(session.mode(), Mode::Editing);
    }

    #[test]
    fn test_request_list_in_listing_refreshes() {
        let (_dir, mut session) = session();
        create_note(&mut session, "a", "x");
        session.handle(Action::RequestList);
        assert_eq!(session.entries().unwrap().len(), 1);

        fs::write(note_path(&session, "b"), "y").unwrap();
        session.handle(Action::RequestList);

        assert_eq!(session.mode(), Mode::Listing);
        assert_eq!(session.entries().unwrap().len(), 2);
    }

    #[test]
    fn test_list_error_keeps_idle() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(VaultStore::new(dir.path().join("missing")), true);

        session.handle(Action::RequestList);

        assert_eq!(session.mode(), Mode::Idle);
        assert_eq!(
            session.status().map(|s| s.kind),
            Some(StatusKind::Error)
        );
    }

    #[test]
    fn test_open_deleted_note_reports_error() {
        let (_dir, mut session) = session();
        create_note(&mut session, "gone", "x");
        session.handle(Action::RequestList);
        fs::remove_file(note_path(&session, "gone")).unwrap();

        session.handle(Action::Input(InputKey::Enter));

        assert_eq!(session.mode(), Mode::Listing);
        assert_eq!(
            session.status().map(|s| s.kind),
            Some(StatusKind::Error)
        );
    }

    #[test]
    fn test_status_is_cleared_on_next_action() {
        let (_dir, mut session) = session();
        create_note(&mut session, "a", "x");
        assert!(session.status().is_some());

        session.handle(Action::Input(InputKey::Char('z')));
        assert!(session.status().is_none());
    }
}
