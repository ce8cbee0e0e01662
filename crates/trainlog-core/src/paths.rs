use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TRAINLOG_DIR: &str = ".trainlog";
pub const CONFIG_FILE: &str = ".trainlog/config.yaml";
pub const REPORTS_DIR: &str = ".trainlog/reports";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn trainlog_dir(root: &Path) -> PathBuf {
    root.join(TRAINLOG_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn reports_dir(root: &Path) -> PathBuf {
    root.join(REPORTS_DIR)
}
