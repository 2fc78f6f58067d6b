use std::io::{self, Write};

use termion::{clear, color, cursor, style};

use crate::action::HELP_TEXT;
use crate::mode::Mode;
use crate::session::{Session, StatusKind};
use crate::widget::truncate_to_width;
use crate::{HEADER_HEIGHT, UI_HEIGHT};

pub const HEADER_TEXT: &str = "Welcome to Noteify!";
pub const IDLE_TEXT: &str = "Press Ctrl+N to create a note or Ctrl+L to browse your notes.";

pub struct Screen;

impl Screen {
    /// 本文に使える行数
    pub fn body_rows(rows: u16) -> u16 {
        rows.saturating_sub(UI_HEIGHT)
    }

    pub fn draw_header(stdout: &mut impl Write, cols: u16) -> io::Result<()> {
        let header = truncate_to_width(&format!("  {}  ", HEADER_TEXT), cols as usize);
        write!(
            stdout,
            "{}{}{}{}",
            style::Bold,
            style::Invert,
            header,
            style::Reset
        )?;
        write!(stdout, "{}\r\n{}", clear::UntilNewline, clear::CurrentLine)?;
        Ok(())
    }

    pub fn draw_body(stdout: &mut impl Write, session: &Session, cols: u16, rows: u16) -> io::Result<()> {
        let body_rows = Self::body_rows(rows) as usize;
        let lines = match session.active_widget() {
            Some(widget) => widget.render(cols as usize),
            None => vec![truncate_to_width(IDLE_TEXT, cols as usize)],
        };

        for i in 0..body_rows {
            write!(stdout, "\r\n")?;
            if let Some(line) = lines.get(i) {
                write!(stdout, "{}", line)?;
            }
            write!(stdout, "{}", clear::UntilNewline)?;
        }
        Ok(())
    }

    pub fn draw_status_line(stdout: &mut impl Write, session: &Session, cols: u16) -> io::Result<()> {
        write!(stdout, "\r\n{}", clear::CurrentLine)?;

        let mut left = session.mode().label().to_string();
        if let Some(note) = session.open_note() {
            left = format!("{} {}", left, note.name());
            if note.is_dirty() {
                left.push_str(" [+]");
            }
        }

        match session.status() {
            Some(status) => {
                let line = if left.is_empty() {
                    status.text.clone()
                } else {
                    format!("{} {}", left, status.text)
                };
                let text = truncate_to_width(&line, cols as usize);
                match status.kind {
                    StatusKind::Error => write!(
                        stdout,
                        "{}{}{}",
                        color::Fg(color::Red),
                        text,
                        color::Fg(color::Reset)
                    )?,
                    StatusKind::Info => write!(stdout, "{}", text)?,
                }
            }
            None => write!(stdout, "{}", truncate_to_width(&left, cols as usize))?,
        }
        Ok(())
    }

    pub fn draw_help(stdout: &mut impl Write, cols: u16) -> io::Result<()> {
        write!(stdout, "\r\n{}", clear::CurrentLine)?;
        write!(
            stdout,
            "{}{}{}",
            style::Italic,
            truncate_to_width(HELP_TEXT, cols as usize),
            style::Reset
        )?;
        Ok(())
    }

    pub fn refresh(stdout: &mut impl Write, session: &Session, size: (u16, u16)) -> io::Result<()> {
        let (cols, rows) = size;

        // カーソルを隠す
        write!(stdout, "{}", cursor::Hide)?;
        // カーソルを左上に移動
        write!(stdout, "{}", cursor::Goto(1, 1))?;

        Self::draw_header(stdout, cols)?;
        Self::draw_body(stdout, session, cols, rows)?;
        Self::draw_status_line(stdout, session, cols)?;
        Self::draw_help(stdout, cols)?;

        // 入力中のウィジェットがあるときだけカーソルを表示
        let position = session.active_widget().and_then(|w| w.cursor());
        if let Some((col, row)) = position {
            let x = col.min(cols.saturating_sub(1) as usize) as u16 + 1;
            let y = row.min(Self::body_rows(rows).saturating_sub(1) as usize) as u16 + HEADER_HEIGHT + 1;
            write!(stdout, "{}", cursor::Goto(x, y))?;
            match session.mode() {
                Mode::Editing | Mode::Naming => write!(stdout, "{}", cursor::SteadyBar)?,
                Mode::Idle | Mode::Listing => write!(stdout, "{}", cursor::SteadyBlock)?,
            }
            write!(stdout, "{}", cursor::Show)?;
        }

        stdout.flush()?;
        Ok(())
    }
}
