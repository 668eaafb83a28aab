//! On-disk layout for stored files and strings
//!
//! ```text
//! <root>/files/<key>.<ext>    uploaded files, extension kept from the upload
//! <root>/files/<key>.         uploads that had no extension
//! <root>/strings/<key>.txt    string values, raw bytes
//! ```
//!
//! A stored file name always splits at its last `.` into key and extension,
//! so every file in the files namespace belongs to exactly one key.
//! External tooling may rely on this layout for backup and inspection.

use keystash_cache::Namespace;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, warn};

/// Longest single path component the filesystem accepts
const MAX_NAME_LEN: usize = 255;
const STRING_EXT: &str = ".txt";
/// Keys must leave room for the string suffix within one path component
const MAX_KEY_LEN: usize = MAX_NAME_LEN - STRING_EXT.len();

/// Reasons a client-supplied key cannot be mapped to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    Empty,
    TooLong,
    Separator,
    Traversal,
    Nul,
    ExtensionTooLong,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::Empty => write!(f, "Invalid key: key must not be empty"),
            KeyError::TooLong => write!(f, "Invalid key: longer than {} bytes", MAX_KEY_LEN),
            KeyError::Separator => write!(f, "Invalid key: path separators are not allowed"),
            KeyError::Traversal => write!(f, "Invalid key: key must not start with '.'"),
            KeyError::Nul => write!(f, "Invalid key: NUL bytes are not allowed"),
            KeyError::ExtensionTooLong => write!(
                f,
                "Invalid key: key and file extension exceed {} bytes",
                MAX_NAME_LEN
            ),
        }
    }
}

impl std::error::Error for KeyError {}

/// Check that a key names exactly one entry inside a namespace directory.
/// Leading dots are refused outright, which covers `.` and `..`.
pub fn validate_key(key: &str) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    if key.len() > MAX_KEY_LEN {
        return Err(KeyError::TooLong);
    }
    if key.contains(['/', '\\']) {
        return Err(KeyError::Separator);
    }
    if key.contains('\0') {
        return Err(KeyError::Nul);
    }
    if key.starts_with('.') {
        return Err(KeyError::Traversal);
    }
    Ok(())
}

/// Extension of an uploaded filename without the leading dot, or `""`.
///
/// Any client-side directory components are ignored, so `C:\tmp\a.png` and
/// `a.png` both give `png`.
pub fn upload_extension(filename: &str) -> &str {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rsplit_once('.') {
        Some((_, ext)) if !ext.contains('\0') => ext,
        _ => "",
    }
}

/// File name under which `key` is stored with extension `ext` (no dot).
/// Fails when the result would not fit in one path component.
pub fn stored_file_name(key: &str, ext: &str) -> Result<String, KeyError> {
    validate_key(key)?;
    let name = format!("{}.{}", key, ext);
    if name.len() > MAX_NAME_LEN {
        return Err(KeyError::ExtensionTooLong);
    }
    Ok(name)
}

/// Key a stored file name belongs to: everything before the last `.`
fn key_of_file_name(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(key, _)| key)
}

/// Filesystem storage for both namespaces
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one namespace
    pub fn namespace_dir(&self, namespace: Namespace) -> PathBuf {
        self.root.join(namespace.as_str())
    }

    /// Create both namespace directories (and the root) if they are missing
    pub async fn ensure_directories(&self) -> std::io::Result<()> {
        for namespace in [Namespace::Files, Namespace::Strings] {
            let dir = self.namespace_dir(namespace);
            fs::create_dir_all(&dir).await?;
            debug!(dir = ?dir, "Storage directory ready");
        }
        info!(root = ?self.root, "Storage initialized");
        Ok(())
    }

    fn string_path(&self, key: &str) -> PathBuf {
        self.namespace_dir(Namespace::Strings)
            .join(format!("{}{}", key, STRING_EXT))
    }

    /// All stored files owned by `key`, sorted by file name
    async fn files_for_key(&self, key: &str) -> std::io::Result<Vec<PathBuf>> {
        let dir = self.namespace_dir(Namespace::Files);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut matches = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if key_of_file_name(name) == Some(key) && entry.file_type().await?.is_file() {
                matches.push(entry.path());
            }
        }
        matches.sort();
        Ok(matches)
    }

    /// Resolve the stored file for `key` regardless of its extension.
    ///
    /// Writes through [`Storage::write_file`] keep at most one file per key;
    /// if several were placed by hand the first by name is returned.
    pub async fn find_file(&self, key: &str) -> std::io::Result<Option<PathBuf>> {
        let matches = self.files_for_key(key).await?;
        if matches.len() > 1 {
            warn!(key, candidates = matches.len(), "Multiple files stored for key");
        }
        Ok(matches.into_iter().next())
    }

    /// Same resolution as [`Storage::find_file`]
    pub async fn file_exists(&self, key: &str) -> std::io::Result<bool> {
        Ok(self.find_file(key).await?.is_some())
    }

    /// Store `data` under `file_name` (see [`stored_file_name`]), replacing
    /// whatever `key` held before, including files with another extension.
    pub async fn write_file(
        &self,
        key: &str,
        file_name: &str,
        data: &[u8],
    ) -> std::io::Result<PathBuf> {
        let path = self.namespace_dir(Namespace::Files).join(file_name);

        for stale in self.files_for_key(key).await? {
            if stale == path {
                continue;
            }
            match fs::remove_file(&stale).await {
                Ok(()) => debug!(key, path = ?stale, "Removed previous upload"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(key, path = ?stale, error = %e, "Failed to remove previous upload"),
            }
        }

        fs::write(&path, data).await?;
        debug!(key, path = ?path, size = data.len(), "Stored file");
        Ok(path)
    }

    pub async fn write_string(&self, key: &str, value: &str) -> std::io::Result<()> {
        fs::write(self.string_path(key), value.as_bytes()).await?;
        debug!(key, size = value.len(), "Stored string");
        Ok(())
    }

    /// Read the string stored for `key`, `None` if there is none.
    /// Bytes that are not valid UTF-8 are replaced.
    pub async fn read_string(&self, key: &str) -> std::io::Result<Option<String>> {
        match fs::read(self.string_path(key)).await {
            Ok(data) => Ok(Some(String::from_utf8_lossy(&data).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn string_exists(&self, key: &str) -> bool {
        fs::metadata(self.string_path(key)).await.is_ok()
    }
}
