use std::ffi::OsStr;
use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{self, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::serde_path;
use crate::util::normalize;

/// Set of file-name suffixes a scan should collect (`swift`, `m`, ...).
/// An empty filter matches every regular file.
/// 掃描時使用的副檔名篩選；空集合代表接受所有檔案。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionFilter(Vec<String>);

impl ExtensionFilter {
    /// Builds a filter, ignoring leading dots, blanks and duplicates.
    /// 建立篩選器；忽略前置的句點、空白項目與重複項目。
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.');
            if !ext.is_empty() && !normalized.iter().any(|known| known == ext) {
                normalized.push(ext.to_string());
            }
        }
        Self(normalized)
    }

    pub fn single(extension: &str) -> Self {
        Self::new([extension])
    }

    pub fn extensions(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true when `name` ends with `.<ext>` for one of the extensions.
    /// Matching is case-sensitive.
    /// 檔名以 `.<ext>` 結尾即視為符合（區分大小寫）。
    pub fn matches_name(&self, name: &OsStr) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let name = name.to_string_lossy();
        self.0.iter().any(|ext| {
            name.strip_suffix(ext.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.matches_name(name))
            .unwrap_or(false)
    }
}

/// Result of scanning one directory tree.
/// 單一目錄掃描結果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(with = "serde_path")]
    pub root: PathBuf,
    pub filter: ExtensionFilter,
    #[serde(with = "serde_path::list")]
    pub files: Vec<PathBuf>,
}

/// Errors raised while walking a scan root.
/// 掃描目錄時可能發生的錯誤。
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan root {0} does not exist")]
    RootMissing(PathBuf),
    #[error("scan root {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Walks `root` recursively and reports every regular file accepted by `filter`.
/// 遞迴掃描 `root`，回傳符合篩選條件的所有檔案。
pub fn scan(root: &Path, filter: &ExtensionFilter) -> Result<ScanReport, ScanError> {
    let root = path::absolute(root)
        .map(|path| normalize(&path))
        .map_err(|source| ScanError::Io {
            path: root.to_path_buf(),
            source,
        })?;
    let metadata = fs::metadata(&root).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ScanError::RootMissing(root.clone()),
        _ => ScanError::Io {
            path: root.clone(),
            source,
        },
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(false) {
        let entry = entry.map_err(|err| ScanError::Io {
            path: err.path().unwrap_or(&root).to_path_buf(),
            source: err.into(),
        })?;
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if is_file && filter.matches_name(entry.file_name()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!(root = %root.display(), matched = files.len(), "scanned directory");

    Ok(ScanReport {
        root,
        filter: filter.clone(),
        files,
    })
}

/// Convenience wrapper returning only the matched paths.
/// 只回傳符合條件的檔案路徑。
pub fn scan_files(root: &Path, filter: &ExtensionFilter) -> Result<Vec<PathBuf>, ScanError> {
    scan(root, filter).map(|report| report.files)
}
