use std::{env, path::PathBuf};

use crate::error::ConfigError;

pub const VAULT_DIR_NAME: &str = ".noteify";

pub const ENV_VAULT_DIR: &str = "NOTEIFY_DIR";
pub const ENV_LOG_FILE: &str = "NOTEIFY_LOG";
pub const ENV_ESCAPE_QUITS: &str = "NOTEIFY_ESCAPE_QUITS";

/// 起動時に一度だけ解決される設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub vault_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    /// Idle 中の Esc でアプリを終了するか
    pub escape_quits: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let vault_dir = match env::var_os(ENV_VAULT_DIR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir)?
                .join(VAULT_DIR_NAME),
        };

        let log_file = match env::var_os(ENV_LOG_FILE) {
            Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => dirs::cache_dir().map(|dir| dir.join("noteify").join("noteify.log")),
        };

        let escape_quits = env::var(ENV_ESCAPE_QUITS)
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Ok(Self {
            vault_dir,
            log_file,
            escape_quits,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
