use std::{
    fs::{self, File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::error::{VaultError, WriteStage};
use crate::logger;

pub const NOTE_EXTENSION: &str = "md";
/// ノート名の最大文字数
pub const MAX_NAME_LEN: usize = 156;

/// ファイルシステムから導出されるノートの要約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub name: String,
    pub modified_at: SystemTime,
}

/// 編集中のノートに紐づくファイルハンドル
#[derive(Debug)]
pub struct NoteHandle {
    name: String,
    path: PathBuf,
    file: File,
}

impl NoteHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 書き込みに失敗するハンドル
    #[cfg(test)]
    pub(crate) fn read_only(name: &str, path: &Path) -> io::Result<Self> {
        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            file: File::open(path)?,
        })
    }
}

pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Vault ディレクトリを作成する（既に存在する場合は何もしない）
    pub fn ensure_vault(&self) -> Result<(), VaultError> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder
            .create(&self.root)
            .map_err(|e| VaultError::io("create vault", &self.root, e))?;

        // recursive(true) は既存のファイルに対してもエラーにならない場合がある
        if !self.root.is_dir() {
            return Err(VaultError::io(
                "create vault",
                &self.root,
                io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"),
            ));
        }
        Ok(())
    }

    /// Vault 直下のノート一覧を返す（順序は不定）
    pub fn list_notes(&self) -> Result<Vec<NoteSummary>, VaultError> {
        let entries =
            fs::read_dir(&self.root).map_err(|e| VaultError::io("read", &self.root, e))?;

        let mut notes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| VaultError::io("read", &self.root, e))?;
            let path = entry.path();
            let metadata = entry
                .metadata()
                .map_err(|e| VaultError::io("stat", &path, e))?;
            if metadata.is_dir() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(NOTE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            // 正規化で別の名前になるファイルは開くと別のノートを指すので載せない
            if normalize_name(name).ok().as_deref() != Some(name) {
                logger::debug(&format!("skipping {}", path.display()));
                continue;
            }
            let modified_at = metadata
                .modified()
                .map_err(|e| VaultError::io("stat", &path, e))?;
            notes.push(NoteSummary {
                name: name.to_string(),
                modified_at,
            });
        }
        Ok(notes)
    }

    pub fn exists(&self, name: &str) -> bool {
        match self.note_path(name) {
            Ok((_, path)) => path.exists(),
            Err(_) => false,
        }
    }

    /// 空のノートを作成してハンドルを返す
    ///
    /// 同名のファイルが存在する場合は `AlreadyExists` を返す。
    /// 存在確認と作成は create_new による排他作成で一度に行う。
    pub fn create(&self, name: &str) -> Result<NoteHandle, VaultError> {
        let (name, path) = self.note_path(name)?;

        let mut options = OpenOptions::new();
        options.read(true).write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = match options.open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(VaultError::AlreadyExists { name });
            }
            Err(e) => return Err(VaultError::io("create", &path, e)),
        };

        logger::info(&format!("created note {}", path.display()));
        Ok(NoteHandle { name, path, file })
    }

    /// 既存のノートを開き、内容と一緒に返す
    pub fn open(&self, name: &str) -> Result<(NoteHandle, String), VaultError> {
        let (name, path) = self.note_path(name)?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| VaultError::io("open", &path, e))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| VaultError::io("read", &path, e))?;

        Ok((NoteHandle { name, path, file }, content))
    }

    /// ハンドルの指す内容を `content` で置き換える
    ///
    /// truncate -> seek -> write -> sync の順に実行し、途中で失敗した段階を返す。
    /// 成功・失敗に関わらずハンドルはここで閉じられる。
    pub fn overwrite(&self, handle: NoteHandle, content: &str) -> Result<(), VaultError> {
        let NoteHandle { path, mut file, .. } = handle;
        let fail = |stage: WriteStage, source: io::Error| VaultError::Overwrite {
            stage,
            path: path.clone(),
            source,
        };

        file.set_len(0).map_err(|e| fail(WriteStage::Truncate, e))?;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| fail(WriteStage::Seek, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| fail(WriteStage::Write, e))?;
        file.sync_all().map_err(|e| fail(WriteStage::Sync, e))?;

        logger::debug(&format!("saved {} bytes to {}", content.len(), path.display()));
        Ok(())
    }

    fn note_path(&self, name: &str) -> Result<(String, PathBuf), VaultError> {
        let name = normalize_name(name)?;
        let path = self.root.join(format!("{}.{}", name, NOTE_EXTENSION));
        Ok((name, path))
    }
}

/// ユーザー入力のノート名を検証して正規化する
///
/// 前後の空白と末尾の `.md` を取り除き、パスとして安全でない名前は拒否する。
pub fn normalize_name(raw: &str) -> Result<String, VaultError> {
    let invalid = |reason: &'static str| VaultError::InvalidName {
        name: raw.to_string(),
        reason,
    };

    let trimmed = raw.trim();
    let name = trimmed
        .strip_suffix(".md")
        .map(str::trim_end)
        .unwrap_or(trimmed);

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(invalid("name is too long"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid("name contains a path separator"));
    }
    if name.starts_with('.') {
        return Err(invalid("name starts with a dot"));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid("name contains control characters"));
    }
    Ok(name.to_string())
}
