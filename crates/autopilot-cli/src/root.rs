use autopilot_core::paths::CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Resolve the project root, where `autopilot.yaml` and the state file live.
///
/// Priority:
/// 1. `--root` flag / `AUTOPILOT_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `autopilot.yaml`
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
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_root(Some(dir.path())), dir.path());
    }

    #[test]
    fn finds_config_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        let deep = dir.path().join("slides/autopilot");
        std::fs::create_dir_all(&deep).unwrap();
        assert_eq!(find_upward(&deep).unwrap(), dir.path());
    }

    #[test]
    fn no_config_anywhere() {
        let dir = TempDir::new().unwrap();
        let deep = dir.path().join("a/b");
        std::fs::create_dir_all(&deep).unwrap();
        // an autopilot.yaml above the temp dir would be found; none is expected
        assert!(find_upward(&deep).map_or(true, |p| !p.starts_with(dir.path())));
    }
}
