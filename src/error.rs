use std::{io, path::PathBuf};

use thiserror::Error;

/// 上書き保存のどの段階で失敗したか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Truncate,
    Seek,
    Write,
    Sync,
}

impl WriteStage {
    /// truncate 済みの段階で失敗した場合はディスク上の内容が失われている可能性がある
    pub fn content_may_be_lost(self) -> bool {
        matches!(self, WriteStage::Seek | WriteStage::Write | WriteStage::Sync)
    }
}

impl std::fmt::Display for WriteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WriteStage::Truncate => "truncate",
            WriteStage::Seek => "seek",
            WriteStage::Write => "write",
            WriteStage::Sync => "sync",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("unable to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("note \"{name}\" already exists")]
    AlreadyExists { name: String },

    #[error("invalid note name \"{name}\": {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("unable to {stage} {}{}: {source}", .path.display(), lost_suffix(.stage))]
    Overwrite {
        stage: WriteStage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn lost_suffix(stage: &WriteStage) -> &'static str {
    if stage.content_may_be_lost() {
        " (file content may be lost)"
    } else {
        ""
    }
}

impl VaultError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        VaultError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to determine the home directory")]
    NoHomeDir,
}
