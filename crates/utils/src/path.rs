use std::path::PathBuf;

/// Default workspace root, overridable via `LEVELUP_WORKSPACE`.
pub fn default_workspace_root() -> PathBuf {
    if let Ok(dir) = std::env::var("LEVELUP_WORKSPACE") {
        return PathBuf::from(dir);
    }
    std::env::temp_dir().join("levelup-workspace")
}
