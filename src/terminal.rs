use std::io::{self, Stdout, Write};

use termion::raw::{IntoRawMode, RawTerminal};
use termion::screen::{AlternateScreen, IntoAlternateScreen};

type Output = AlternateScreen<RawTerminal<Stdout>>;

/// raw mode + 代替スクリーンの端末
///
/// 終了時にはシェルの画面がそのまま戻る。
pub struct Terminal {
    out: Output,
    /// (cols, rows)
    size: (u16, u16),
}

impl Terminal {
    pub fn new() -> io::Result<Self> {
        let out = io::stdout().into_raw_mode()?.into_alternate_screen()?;
        let size = termion::terminal_size()?;
        Ok(Self { out, size })
    }

    pub fn stdout(&mut self) -> &mut Output {
        &mut self.out
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    /// 端末サイズを取り直す。変わった場合は true
    pub fn refresh_size(&mut self) -> io::Result<bool> {
        let size = termion::terminal_size()?;
        let changed = size != self.size;
        self.size = size;
        Ok(changed)
    }

    /// リサイズ後に前の描画が残らないよう全消去する
    pub fn clear_screen(&mut self) -> io::Result<()> {
        write!(
            self.out,
            "{}{}",
            termion::clear::All,
            termion::cursor::Goto(1, 1)
        )?;
        self.out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        // 代替スクリーンを抜ける前にカーソル形状と表示を戻す
        let _ = write!(
            self.out,
            "{}{}",
            termion::cursor::SteadyBlock,
            termion::cursor::Show
        );
        let _ = self.out.flush();
    }
}
