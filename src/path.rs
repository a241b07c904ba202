use std::collections::BTreeSet;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// The ordered list of directories searched for external commands.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Builds a search path from a `PATH`-style value.
    pub fn new(value: Option<OsString>) -> Self {
        let dirs = value
            .map(|value| env::split_paths(&value).collect())
            .unwrap_or_default();
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Searches for an executable with the given name.
    ///
    /// A name containing `/` is checked as a path on its own; otherwise the
    /// directories are scanned in order and the first hit is returned.
    pub fn find(&self, command: &str) -> Option<PathBuf> {
        if command.is_empty() {
            return None;
        }
        if command.contains('/') {
            let path = PathBuf::from(command);
            return is_executable(&path).then_some(path);
        }

        self.dirs
            .iter()
            .map(|dir| dir.join(command))
            .find(|full_path| is_executable(full_path))
    }

    /// Gets the names of all executables starting with `prefix`.
    ///
    /// Returns names (not full paths), sorted and without duplicates.
    /// Handles non-existent directories gracefully.
    pub fn executables(&self, prefix: &str) -> BTreeSet<String> {
        let mut executables = BTreeSet::new();

        for dir in &self.dirs {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str()
                    && name.starts_with(prefix)
                    && is_executable(&entry.path())
                {
                    executables.insert(name.to_string());
                }
            }
        }

        executables
    }
}

/// A regular file (following symlinks) with any execute bit set.
fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    fn search_path(dirs: &[&Path]) -> SearchPath {
        SearchPath::new(Some(env::join_paths(dirs).unwrap()))
    }

    #[test]
    fn find_returns_first_match_in_order() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        touch(b.path(), "tool", 0o755);
        let first = touch(a.path(), "tool", 0o755);

        let path = search_path(&[a.path(), b.path()]);
        assert_eq!(path.find("tool"), Some(first));
    }

    #[test]
    fn find_skips_non_executables_and_directories() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        touch(a.path(), "tool", 0o644);
        fs::create_dir(a.path().join("sub")).unwrap();
        let exe = touch(b.path(), "tool", 0o700);

        let path = search_path(&[a.path(), b.path()]);
        assert_eq!(path.find("tool"), Some(exe));
        assert_eq!(path.find("sub"), None);
        assert_eq!(path.find("missing"), None);
        assert_eq!(path.find(""), None);
    }

    #[test]
    fn find_accepts_explicit_paths() {
        let dir = tempfile::tempdir().unwrap();
        let exe = touch(dir.path(), "script", 0o755);
        let path = SearchPath::new(None);
        assert_eq!(path.find(exe.to_str().unwrap()), Some(exe));
    }

    #[test]
    fn executables_filters_by_prefix_and_dedups() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        touch(a.path(), "custom_exe", 0o755);
        touch(b.path(), "custom_exe", 0o755);
        touch(b.path(), "custom_other", 0o755);
        touch(b.path(), "custom_plain", 0o644);
        touch(b.path(), "unrelated", 0o755);

        let path = search_path(&[a.path(), Path::new("/does/not/exist"), b.path()]);
        let names: Vec<_> = path.executables("custom").into_iter().collect();
        assert_eq!(names, vec!["custom_exe", "custom_other"]);
    }

    #[test]
    fn unset_path_finds_nothing() {
        let path = SearchPath::new(None);
        assert!(path.dirs().is_empty());
        assert!(path.executables("").is_empty());
        assert_eq!(path.find("ls"), None);
    }
}
