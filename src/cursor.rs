use crate::buffer::Buffer;

/// バッファ上の位置（0 始まり、列は書記素単位）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// テキストエリア内のカーソルとスクロール位置
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    pos: Position,
    row_offset: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    pub fn set_position(&mut self, pos: Position, buffer: &Buffer) {
        self.pos = pos;
        self.clamp(buffer);
    }

    pub fn move_up(&mut self, buffer: &Buffer) {
        if self.pos.row > 0 {
            self.pos.row -= 1;
            self.clamp(buffer);
        }
    }

    pub fn move_down(&mut self, buffer: &Buffer) {
        if self.pos.row + 1 < buffer.len() {
            self.pos.row += 1;
            self.clamp(buffer);
        }
    }

    /// 行頭では前の行の末尾へ移動する
    pub fn move_left(&mut self, buffer: &Buffer) {
        if self.pos.col > 0 {
            self.pos.col -= 1;
        } else if self.pos.row > 0 {
            self.pos.row -= 1;
            self.pos.col = line_len(buffer, self.pos.row);
        }
    }

    /// 行末では次の行の先頭へ移動する
    pub fn move_right(&mut self, buffer: &Buffer) {
        if self.pos.col < line_len(buffer, self.pos.row) {
            self.pos.col += 1;
        } else if self.pos.row + 1 < buffer.len() {
            self.pos.row += 1;
            self.pos.col = 0;
        }
    }

    pub fn move_home(&mut self) {
        self.pos.col = 0;
    }

    pub fn move_end(&mut self, buffer: &Buffer) {
        self.pos.col = line_len(buffer, self.pos.row);
    }

    /// カーソルが `height` 行の表示範囲に収まるようにスクロールする
    pub fn scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.pos.row < self.row_offset {
            self.row_offset = self.pos.row;
        } else if self.pos.row >= self.row_offset.saturating_add(height) {
            self.row_offset = self.pos.row + 1 - height;
        }
    }

    fn clamp(&mut self, buffer: &Buffer) {
        self.pos.row = self.pos.row.min(buffer.len().saturating_sub(1));
        self.pos.col = self.pos.col.min(line_len(buffer, self.pos.row));
    }
}

fn line_len(buffer: &Buffer, row: usize) -> usize {
    buffer.row(row).map(|r| r.len()).unwrap_or(0)
}
