use std::path::{Path, PathBuf};

/// Resolve the project root that holds `.trainlog/`.
///
/// Priority:
/// 1. `--root` flag / `TRAINLOG_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.trainlog/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd).unwrap_or(cwd)
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(trainlog_core::paths::TRAINLOG_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_trainlog_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".trainlog")).unwrap();
        let subdir = dir.path().join("exports/2025");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_upward(&subdir).as_deref(), Some(dir.path()));
    }

    #[test]
    fn no_marker_finds_nothing() {
        let dir = TempDir::new().unwrap();
        let subdir = dir.path().join("a/b");
        std::fs::create_dir_all(&subdir).unwrap();
        // An ancestor outside the tempdir could carry a marker; only assert
        // that nothing inside it matched.
        if let Some(found) = find_upward(&subdir) {
            assert!(!found.starts_with(dir.path()));
        }
    }
}
