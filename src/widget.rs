use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::action::InputKey;
use crate::buffer::Buffer;
use crate::cursor::{Cursor, Position};
use crate::note_list::ListEntry;

/// ウィジェットが親に返すコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetCommand {
    /// Enter による確定
    Submit,
}

/// 入力欄・テキストエリア・一覧が共通で持つ操作
pub trait Widget {
    /// 表示領域に収まる行を返す
    fn render(&self, width: usize) -> Vec<String>;

    fn handle(&mut self, key: InputKey) -> Option<WidgetCommand>;

    fn value(&self) -> String;

    fn set_value(&mut self, text: &str);

    fn focus(&mut self);

    /// 表示領域の大きさが変わった
    fn resize(&mut self, _width: usize, _height: usize) {}

    /// render した行に対するカーソル位置 (col, row)
    fn cursor(&self) -> Option<(usize, usize)> {
        None
    }
}

/// 表示幅 `width` に収まるよう切り詰める
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for g in text.graphemes(true) {
        let w = g.width();
        if used + w > width {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out
}

const PROMPT: &str = "> ";

/// 1 行入力
pub struct TextInput {
    value: String,
    /// 書記素単位
    cursor: usize,
    placeholder: String,
    char_limit: usize,
    width: usize,
    focused: bool,
}

impl TextInput {
    pub fn new(placeholder: &str, char_limit: usize) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            placeholder: placeholder.to_string(),
            char_limit,
            width: usize::MAX,
            focused: false,
        }
    }

    fn grapheme_count(&self) -> usize {
        self.value.graphemes(true).count()
    }

    fn byte_index(&self, col: usize) -> usize {
        self.value
            .grapheme_indices(true)
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// カーソル位置が見えるように左端から削る書記素数
    fn scroll_offset(&self, width: usize) -> usize {
        let avail = width.saturating_sub(PROMPT.len() + 1);
        let mut offset = 0;
        while offset < self.cursor && self.width_between(offset, self.cursor) > avail {
            offset += 1;
        }
        offset
    }

    fn width_between(&self, from: usize, to: usize) -> usize {
        self.value
            .graphemes(true)
            .skip(from)
            .take(to - from)
            .map(|g| g.width())
            .sum()
    }
}

impl Widget for TextInput {
    fn render(&self, width: usize) -> Vec<String> {
        let line = if self.value.is_empty() {
            format!("{}{}", PROMPT, self.placeholder)
        } else {
            let offset = self.scroll_offset(width);
            let visible: String = self.value.graphemes(true).skip(offset).collect();
            format!("{}{}", PROMPT, visible)
        };
        vec![truncate_to_width(&line, width)]
    }

    fn handle(&mut self, key: InputKey) -> Option<WidgetCommand> {
        match key {
            InputKey::Enter => return Some(WidgetCommand::Submit),
            InputKey::Char(c) => {
                if self.value.chars().count() < self.char_limit && !c.is_control() {
                    let before = self.grapheme_count();
                    let at = self.byte_index(self.cursor);
                    self.value.insert(at, c);
                    // 結合文字は直前の書記素に含まれるので進まない
                    self.cursor = (self.cursor + self.grapheme_count()).saturating_sub(before);
                }
            }
            InputKey::Backspace => {
                if self.cursor > 0 {
                    let start = self.byte_index(self.cursor - 1);
                    let end = self.byte_index(self.cursor);
                    self.value.drain(start..end);
                    self.cursor -= 1;
                }
            }
            InputKey::Delete => {
                let start = self.byte_index(self.cursor);
                let end = self.byte_index(self.cursor + 1);
                self.value.drain(start..end);
            }
            InputKey::Left => self.cursor = self.cursor.saturating_sub(1),
            InputKey::Right => self.cursor = (self.cursor + 1).min(self.grapheme_count()),
            InputKey::Home => self.cursor = 0,
            InputKey::End => self.cursor = self.grapheme_count(),
            _ => {}
        }
        None
    }

    fn value(&self) -> String {
        self.value.clone()
    }

    fn set_value(&mut self, text: &str) {
        self.value = text.chars().take(self.char_limit).collect();
        self.cursor = self.grapheme_count();
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn resize(&mut self, width: usize, _height: usize) {
        self.width = width;
    }

    fn cursor(&self) -> Option<(usize, usize)> {
        if !self.focused {
            return None;
        }
        let offset = self.scroll_offset(self.width);
        Some((PROMPT.len() + self.width_between(offset, self.cursor), 0))
    }
}

/// 複数行のテキスト編集
pub struct TextArea {
    buffer: Buffer,
    cursor: Cursor,
    placeholder: String,
    height: usize,
    focused: bool,
    /// 未保存の変更があるか
    dirty: bool,
}

impl TextArea {
    pub fn new(placeholder: &str) -> Self {
        Self {
            buffer: Buffer::new(),
            cursor: Cursor::new(),
            placeholder: placeholder.to_string(),
            height: usize::MAX,
            focused: false,
            dirty: false,
        }
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn line_len(&self, row: usize) -> usize {
        self.buffer.row(row).map(|r| r.len()).unwrap_or(0)
    }
}

impl Widget for TextArea {
    fn render(&self, width: usize) -> Vec<String> {
        if self.buffer.is_empty() {
            return vec![truncate_to_width(&self.placeholder, width)];
        }
        self.buffer
            .rows()
            .iter()
            .skip(self.cursor.row_offset())
            .take(self.height)
            .map(|row| truncate_to_width(row.chars(), width))
            .collect()
    }

    fn handle(&mut self, key: InputKey) -> Option<WidgetCommand> {
        let pos = self.cursor.position();
        match key {
            InputKey::Char(c) => {
                let before = self.line_len(pos.row);
                self.buffer.insert_char(pos, c);
                let col = (pos.col + self.line_len(pos.row)).saturating_sub(before);
                self.cursor
                    .set_position(Position::new(pos.row, col), &self.buffer);
                self.dirty = true;
            }
            InputKey::Enter => {
                self.buffer.insert_newline(pos);
                self.cursor
                    .set_position(Position::new(pos.row + 1, 0), &self.buffer);
                self.dirty = true;
            }
            InputKey::Backspace => {
                if pos.col > 0 {
                    self.buffer.delete_char(Position::new(pos.row, pos.col - 1));
                    self.cursor
                        .set_position(Position::new(pos.row, pos.col - 1), &self.buffer);
                    self.dirty = true;
                } else if pos.row > 0 {
                    let prev_len = self.line_len(pos.row - 1);
                    self.buffer.join_rows(pos.row);
                    self.cursor
                        .set_position(Position::new(pos.row - 1, prev_len), &self.buffer);
                    self.dirty = true;
                }
            }
            InputKey::Delete => {
                if pos.col < self.line_len(pos.row) {
                    self.buffer.delete_char(pos);
                    self.dirty = true;
                } else if pos.row + 1 < self.buffer.len() {
                    self.buffer.join_rows(pos.row + 1);
                    self.dirty = true;
                }
            }
            InputKey::Left => self.cursor.move_left(&self.buffer),
            InputKey::Right => self.cursor.move_right(&self.buffer),
            InputKey::Up => self.cursor.move_up(&self.buffer),
            InputKey::Down => self.cursor.move_down(&self.buffer),
            InputKey::Home => self.cursor.move_home(),
            InputKey::End => self.cursor.move_end(&self.buffer),
            InputKey::PageUp => {
                for _ in 0..self.height.min(self.buffer.len()) {
                    self.cursor.move_up(&self.buffer);
                }
            }
            InputKey::PageDown => {
                for _ in 0..self.height.min(self.buffer.len()) {
                    self.cursor.move_down(&self.buffer);
                }
            }
        }
        self.cursor.scroll(self.height);
        None
    }

    fn value(&self) -> String {
        self.buffer.to_text()
    }

    fn set_value(&mut self, text: &str) {
        self.buffer = Buffer::from_text(text);
        self.cursor = Cursor::new();
        self.dirty = false;
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn resize(&mut self, _width: usize, height: usize) {
        self.height = height.max(1);
        self.cursor.scroll(self.height);
    }

    fn cursor(&self) -> Option<(usize, usize)> {
        if !self.focused {
            return None;
        }
        let pos = self.cursor.position();
        let col = self
            .buffer
            .row(pos.row)
            .map(|r| r.width_until(pos.col))
            .unwrap_or(0);
        Some((col, pos.row.saturating_sub(self.cursor.row_offset())))
    }
}

pub const LIST_TITLE: &str = "All Notes";

/// ノート一覧の選択
pub struct NoteList {
    entries: Vec<ListEntry>,
    selected: usize,
    offset: usize,
    height: usize,
}

impl NoteList {
    /// 1 エントリが使う行数（タイトル + 説明）
    const ENTRY_ROWS: usize = 2;

    pub fn new(entries: Vec<ListEntry>) -> Self {
        Self {
            entries,
            selected: 0,
            offset: 0,
            height: usize::MAX,
        }
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<&ListEntry> {
        self.entries.get(self.selected)
    }

    /// 表示できるエントリ数
    fn visible_entries(&self) -> usize {
        // 先頭のタイトル行を除く
        (self.height.saturating_sub(1) / Self::ENTRY_ROWS).max(1)
    }

    fn select(&mut self, index: usize) {
        if self.entries.is_empty() {
            self.selected = 0;
            self.offset = 0;
            return;
        }
        self.selected = index.min(self.entries.len() - 1);
        let visible = self.visible_entries();
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + visible {
            self.offset = self.selected + 1 - visible;
        }
    }
}

impl Widget for NoteList {
    fn render(&self, width: usize) -> Vec<String> {
        let mut lines = vec![truncate_to_width(LIST_TITLE, width)];
        if self.entries.is_empty() {
            lines.push(truncate_to_width("  No notes yet.", width));
            return lines;
        }
        for (i, entry) in self
            .entries
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(self.visible_entries())
        {
            let marker = if i == self.selected { "> " } else { "  " };
            lines.push(truncate_to_width(
                &format!("{}{}", marker, entry.title),
                width,
            ));
            lines.push(truncate_to_width(
                &format!("  {}", entry.description),
                width,
            ));
        }
        lines
    }

    fn handle(&mut self, key: InputKey) -> Option<WidgetCommand> {
        let page = self.visible_entries();
        match key {
            InputKey::Enter => {
                if !self.entries.is_empty() {
                    return Some(WidgetCommand::Submit);
                }
            }
            InputKey::Up | InputKey::Char('k') => self.select(self.selected.saturating_sub(1)),
            InputKey::Down | InputKey::Char('j') => self.select(self.selected + 1),
            InputKey::Home | InputKey::Char('g') => self.select(0),
            InputKey::End | InputKey::Char('G') => self.select(usize::MAX),
            InputKey::PageUp => self.select(self.selected.saturating_sub(page)),
            InputKey::PageDown => self.select(self.selected.saturating_add(page)),
            _ => {}
        }
        None
    }

    /// 選択中のノート名
    fn value(&self) -> String {
        self.selected()
            .map(|entry| entry.title.clone())
            .unwrap_or_default()
    }

    /// 名前が一致するエントリを選択する
    fn set_value(&mut self, text: &str) {
        if let Some(index) = self.entries.iter().position(|e| e.title == text) {
            self.select(index);
        }
    }

    // 一覧は常に選択行を表示するのでフォーカス状態を持たない
    fn focus(&mut self) {}

    fn resize(&mut self, _width: usize, height: usize) {
        self.height = height.max(1);
        self.select(self.selected);
    }
}
