use std::path::PathBuf;

/// File name of the synced catalog inside the cache directory.
pub const CATALOG_FILE: &str = "catalog.toml";

/// Return the cache directory for model-advisor data files.
/// Creates it if it doesn't exist.
pub fn cache_dir() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("model-advisor");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok()?;
    }
    Some(dir)
}

/// Return the path to a cached data file, if the cache directory is available.
pub fn cache_path(filename: &str) -> Option<PathBuf> {
    Some(cache_dir()?.join(filename))
}
