use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "autopilot.yaml";
pub const STATE_FILE: &str = "state.yaml";

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve the state file. Relative paths are taken from the project root.
pub fn state_path(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_state_file_joins_root() {
        let p = state_path(Path::new("/demo"), Path::new(STATE_FILE));
        assert_eq!(p, PathBuf::from("/demo/state.yaml"));
    }

    #[test]
    fn absolute_state_file_wins() {
        let p = state_path(Path::new("/demo"), Path::new("/tmp/autopilot.state"));
        assert_eq!(p, PathBuf::from("/tmp/autopilot.state"));
    }
}
