use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::cursor::Position;

/// 1 行分のテキスト
///
/// 列は書記素クラスタ単位で数える。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    chars: String,
}

impl Row {
    pub fn new(text: String) -> Self {
        Self { chars: text }
    }

    pub fn chars(&self) -> &str {
        &self.chars
    }

    /// 書記素数
    pub fn len(&self) -> usize {
        self.chars.graphemes(true).count()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// 先頭から `col` 書記素分の表示幅
    pub fn width_until(&self, col: usize) -> usize {
        self.chars.graphemes(true).take(col).map(|g| g.width()).sum()
    }

    fn byte_index(&self, col: usize) -> usize {
        self.chars
            .grapheme_indices(true)
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(self.chars.len())
    }

    pub fn insert_char(&mut self, col: usize, ch: char) {
        let at = self.byte_index(col);
        self.chars.insert(at, ch);
    }

    /// `col` の書記素を削除して返す
    pub fn delete_char(&mut self, col: usize) -> Option<String> {
        let start = self.byte_index(col);
        if start >= self.chars.len() {
            return None;
        }
        let end = self.byte_index(col + 1);
        Some(self.chars.drain(start..end).collect())
    }

    /// `col` 以降を切り出す
    pub fn split_off(&mut self, col: usize) -> String {
        let at = self.byte_index(col);
        self.chars.split_off(at)
    }

    pub fn append(&mut self, text: &str) {
        self.chars.push_str(text);
    }
}

/// 複数行のテキストバッファ
///
/// 常に 1 行以上を持つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    rows: Vec<Row>,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            rows: vec![Row::default()],
        }
    }

    /// 改行区切りで読み込む。末尾の改行は空行として保持する
    pub fn from_text(text: &str) -> Self {
        Self {
            rows: text.split('\n').map(|l| Row::new(l.to_string())).collect(),
        }
    }

    pub fn to_text(&self) -> String {
        self.rows
            .iter()
            .map(Row::chars)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 空行 1 行だけの状態
    pub fn is_empty(&self) -> bool {
        self.rows.len() == 1 && self.rows[0].is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn insert_char(&mut self, pos: Position, ch: char) {
        if let Some(row) = self.rows.get_mut(pos.row) {
            row.insert_char(pos.col, ch);
        }
    }

    pub fn delete_char(&mut self, pos: Position) -> Option<String> {
        self.rows.get_mut(pos.row)?.delete_char(pos.col)
    }

    /// `pos` で行を分割する
    pub fn insert_newline(&mut self, pos: Position) {
        if let Some(row) = self.rows.get_mut(pos.row) {
            let tail = row.split_off(pos.col);
            self.rows.insert(pos.row + 1, Row::new(tail));
        }
    }

    /// `row` を前の行に結合する
    pub fn join_rows(&mut self, row: usize) {
        if row == 0 || row >= self.rows.len() {
            return;
        }
        let current = self.rows.remove(row);
        self.rows[row - 1].append(current.chars());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_new_has_one_empty_row() {
        let buffer = Buffer::new();
        assert_eq!(buffer.len(), 1);
        assert!(buffer.is_empty());
        assert_eq!(buffer.to_text(), "");
    }

    #[test]
    fn test_from_text_keeps_trailing_newline() {
        let buffer = Buffer::from_text("line1\nline2\n");
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.row(2).unwrap().chars(), "");
        assert_eq!(buffer.to_text(), "line1\nline2\n");
    }

    #[test]
    fn test_insert_and_delete_char() {
        let mut buffer = Buffer::new();
        buffer.insert_char(Position::new(0, 0), 'b');
        buffer.insert_char(Position::new(0, 0), 'a');
        assert_eq!(buffer.to_text(), "ab");

        assert_eq!(buffer.delete_char(Position::new(0, 0)).as_deref(), Some("a"));
        assert_eq!(buffer.delete_char(Position::new(0, 5)), None);
        assert_eq!(buffer.to_text(), "b");
    }

    #[test]
    fn test_newline_and_join() {
        let mut buffer = Buffer::from_text("hello");
        buffer.insert_newline(Position::new(0, 2));
        assert_eq!(buffer.to_text(), "he\nllo");

        buffer.join_rows(1);
        assert_eq!(buffer.to_text(), "hello");

        // 先頭行は結合しない
        buffer.join_rows(0);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_row_grapheme_columns() {
        let mut row = Row::new("日本語".to_string());
        assert_eq!(row.len(), 3);
        assert_eq!(row.width_until(row.len()), 6);
        assert_eq!(row.width_until(2), 4);

        row.insert_char(1, 'x');
        assert_eq!(row.chars(), "日x本語");
        assert_eq!(row.delete_char(2).as_deref(), Some("本"));
        assert_eq!(row.chars(), "日x語");
    }
}
