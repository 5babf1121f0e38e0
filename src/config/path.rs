//! Module for searching for decoder config files

use std::path::PathBuf;

/// Name of the config file within each search directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Base system fallback path to use if one cannot be found with XDG
const FALLBACK_BASE_PATH: &str = "/usr/share/xbox-ble-report";

/// Returns the base path for configuration data
pub fn get_base_path() -> PathBuf {
    let Ok(base_dirs) = xdg::BaseDirectories::with_prefix("xbox-ble-report") else {
        log::warn!("Unable to determine config base path. Using fallback path.");
        return PathBuf::from(FALLBACK_BASE_PATH);
    };

    // Get the data directories in preference order
    let data_dirs = base_dirs.get_data_dirs();
    for dir in data_dirs {
        if dir.exists() {
            return dir;
        }
    }

    log::debug!("Config base path not found. Using fallback path.");
    PathBuf::from(FALLBACK_BASE_PATH)
}

/// Returns the list of config files in load order. The first one that exists
/// is used.
/// E.g. ["./rootfs/usr/share/xbox-ble-report/config.yaml", "/etc/xbox-ble-report/config.yaml"]
pub fn get_config_paths() -> Vec<PathBuf> {
    let paths = vec![
        PathBuf::from("./rootfs/usr/share/xbox-ble-report"),
        PathBuf::from("/etc/xbox-ble-report"),
        get_base_path(),
    ];

    paths
        .into_iter()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .collect()
}
