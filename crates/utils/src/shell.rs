use std::path::PathBuf;

/// Resolve an executable name to an absolute path, honoring the given
/// environment-variable override (e.g. `GIT_PATH`) before falling back to
/// `PATH` lookup via `which`.
pub fn resolve_executable(name: &str, env_override: &str) -> Option<PathBuf> {
    if let Ok(path) = std::env::var(env_override)
        && !path.is_empty()
    {
        return Some(PathBuf::from(path));
    }
    which::which(name).ok()
}
