use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use termion::input::TermRead;

use noteify::action;
use noteify::config::Config;
use noteify::logger;
use noteify::screen::Screen;
use noteify::session::{Outcome, Session};
use noteify::terminal::Terminal;
use noteify::vault::VaultStore;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("noteify: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    if let Some(path) = &config.log_file {
        // ログが書けなくても起動は続ける
        if let Err(e) = logger::init(path) {
            eprintln!("noteify: unable to open log file {}: {}", path.display(), e);
        }
    }

    // Vault が作れない場合はここで終了する
    let store = VaultStore::new(&config.vault_dir);
    store
        .ensure_vault()
        .with_context(|| format!("failed to prepare vault {}", config.vault_dir.display()))?;
    logger::info(&format!("vault: {}", config.vault_dir.display()));

    let mut session = Session::new(store, config.escape_quits);
    let mut terminal = Terminal::new().context("failed to initialize terminal")?;
    terminal.clear_screen()?;
    draw(&mut terminal, &mut session)?;

    // キー入力ループ
    for key in io::stdin().keys() {
        let key = key.context("failed to read input")?;
        if let Some(action) = action::dispatch(key)
            && session.handle(action) == Outcome::Quit
        {
            break;
        }

        // キー入力後に再描画
        draw(&mut terminal, &mut session)?;
    }

    logger::info("quit");
    Ok(())
}

fn draw(terminal: &mut Terminal, session: &mut Session) -> Result<()> {
    if terminal.refresh_size()? {
        terminal.clear_screen()?;
    }
    let (cols, rows) = terminal.size();
    session.resize(cols as usize, Screen::body_rows(rows) as usize);
    Screen::refresh(terminal.stdout(), session, (cols, rows)).context("failed to draw screen")?;
    Ok(())
}
