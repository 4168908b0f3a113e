//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "SIG_ROOT_FOLDER";

/// Database file inside the root folder, shared by both services
pub const DATABASE_FILE: &str = "sig.db";

/// Root folder resolution priority:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        match read_root_folder(&config_path) {
            Ok(Some(root)) => return root,
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring config file {}: {}", config_path.display(), e),
        }
    }

    // Priority 4: OS-dependent default
    default_root_folder()
}

/// `root_folder` value of a TOML config file, if set
pub fn read_root_folder(config_path: &Path) -> Result<Option<PathBuf>> {
    let content = std::fs::read_to_string(config_path)?;
    let config: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", config_path.display(), e)))?;
    Ok(config
        .get("root_folder")
        .and_then(|v| v.as_str())
        .map(PathBuf::from))
}

/// Locate the configuration file for the platform
fn find_config_file() -> Result<PathBuf> {
    // ~/.config/sig/config.toml first, then /etc/sig/config.toml on Linux
    let user_config = dirs::config_dir().map(|d| d.join("sig").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }
    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/sig/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }
    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/sig (or /var/lib/sig for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("sig"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/sig"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("sig"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/sig"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("sig"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\sig"))
    } else {
        PathBuf::from("./sig_data")
    }
}

/// Database path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// MapTiler key from `MAPTILER_API_KEY`, if set
pub fn maptiler_api_key() -> Option<String> {
    std::env::var("MAPTILER_API_KEY").ok().filter(|k| !k.trim().is_empty())
}
