use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
        }
    }
}

pub struct Logger {
    file: fs::File,
}

impl Logger {
    pub fn new(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    pub fn log(&mut self, level: Level, message: &str) {
        let _ = writeln!(self.file, "{}", format_line(level, message));
    }
}

fn format_line(level: Level, message: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    format!("[{}] {:<5} {}", timestamp, level.as_str(), message)
}

// グローバルロガー用のスレッドローカル変数
thread_local! {
    static LOGGER: RefCell<Option<Logger>> = const { RefCell::new(None) };
}

pub fn init(path: &Path) -> std::io::Result<()> {
    // debug build でのみロガーを初期化
    #[cfg(debug_assertions)]
    {
        let logger = Logger::new(path)?;
        LOGGER.with(|l| {
            *l.borrow_mut() = Some(logger);
        });
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = path; // unused variable warning を回避
    }
    Ok(())
}

pub fn log(level: Level, message: &str) {
    // debug build でのみログを書き込む
    #[cfg(debug_assertions)]
    {
        LOGGER.with(|l| {
            if let Some(logger) = l.borrow_mut().as_mut() {
                logger.log(level, message);
            }
        });
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = (level, message);
    }
}

pub fn debug(message: &str) {
    log(Level::Debug, message);
}

pub fn info(message: &str) {
    log(Level::Info, message);
}

pub fn warn(message: &str) {
    log(Level::Warn, message);
}
