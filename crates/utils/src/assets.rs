use std::{env, path::PathBuf};

use directories::ProjectDirs;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");
const ASSET_DIR_ENV: &str = "SUBWAY_ASSET_DIR";
const DATABASE_FILE: &str = "subway.sqlite";

/// Directory holding the SQLite database and other runtime state.
///
/// `SUBWAY_ASSET_DIR` wins when set. Debug builds fall back to `dev_assets/`
/// at the workspace root, release builds to the platform data directory.
pub fn asset_dir() -> std::io::Result<PathBuf> {
    let path = if let Ok(custom_dir) = env::var(ASSET_DIR_ENV) {
        PathBuf::from(custom_dir)
    } else if cfg!(debug_assertions) {
        PathBuf::from(PROJECT_ROOT).join("../../dev_assets")
    } else {
        ProjectDirs::from("dev", "subway", "subway-admin")
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "OS didn't give us a home directory",
                )
            })?
            .data_dir()
            .to_path_buf()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path)?;
        tracing::info!("Created asset directory: {}", path.display());
    }

    Ok(path)
}

pub fn database_path() -> std::io::Result<PathBuf> {
    Ok(asset_dir()?.join(DATABASE_FILE))
}
