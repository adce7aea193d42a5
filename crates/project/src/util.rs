use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Writes data atomically by using a temporary sibling file followed by rename.
/// The temporary file is removed whenever any step fails, so the destination is
/// either fully replaced or left exactly as it was.
/// 以臨時檔案搭配 rename 實現原子寫入；失敗時移除臨時檔案並保留原檔。
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = temp_sibling(path);
    let result = write_synced(&tmp_path, data).and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() && tmp_path.is_file() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Path of the scratch file used by [`write_atomic`] for `path`.
/// 取得 [`write_atomic`] 使用的臨時檔案路徑。
pub fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Resolves `.` and `..` components without touching the filesystem.
/// `..` never climbs above the root of an absolute path.
/// 不存取檔案系統，僅以字面方式解析 `.` 與 `..`。
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn replaces_existing_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("project.pbxproj");
        fs::write(&target, "old").unwrap();

        write_atomic(&target, b"new").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(!temp_sibling(&target).exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("App.xcodeproj").join("project.pbxproj");

        write_atomic(&target, b"payload").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"payload");
    }

    #[test]
    fn failed_rename_removes_temp_file_and_keeps_destination() {
        let dir = tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file rename.
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "keep").unwrap();

        assert!(write_atomic(&target, b"data").is_err());
        assert!(!temp_sibling(&target).exists());
        assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "keep");
    }

    #[test]
    fn normalize_resolves_parent_components() {
        assert_eq!(
            normalize(Path::new("/work/App/../Shared/./poems.json")),
            PathBuf::from("/work/Shared/poems.json")
        );
        assert_eq!(normalize(Path::new("/../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize(Path::new("../a/../../b")), PathBuf::from("../../b"));
        assert_eq!(normalize(Path::new("a/./b/")), PathBuf::from("a/b"));
    }

    #[test]
    fn temp_sibling_is_hidden_next_to_target() {
        let path = Path::new("/tmp/App.xcodeproj/project.pbxproj");
        assert_eq!(
            temp_sibling(path),
            PathBuf::from("/tmp/App.xcodeproj/.project.pbxproj.tmp")
        );
    }
}
