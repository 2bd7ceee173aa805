//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`CEV_ROOT_FOLDER`)
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "CEV_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "cev.db";

/// Default listen address for the API server
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";

/// Optional settings read from `config.toml`
///
/// Every field is optional; a missing or unreadable file yields the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database
    pub root_folder: Option<PathBuf>,
    /// Listen address for the API server, e.g. `0.0.0.0:8000`
    pub bind_address: Option<String>,
}

impl TomlConfig {
    /// Listen address, falling back to [`DEFAULT_BIND_ADDRESS`]
    pub fn bind_address_or_default(&self) -> String {
        self.bind_address
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
}

/// Load the platform config file, or defaults when absent or broken
///
/// A missing config is not an error: the service starts with defaults.
pub fn load_default_toml_config() -> TomlConfig {
    let Some(path) = default_config_path() else {
        debug!("No config file found, using defaults");
        return TomlConfig::default();
    };

    match load_toml_config(&path) {
        Ok(config) => {
            info!("Loaded config file: {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config file {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Get the configuration file path for the platform, if one exists
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("cev").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/cev/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/cev (or /var/lib/cev for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("cev"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/cev"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/cev
        dirs::data_dir()
            .map(|d| d.join("cev"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/cev"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\cev
        dirs::data_local_dir()
            .map(|d| d.join("cev"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\cev"))
    } else {
        PathBuf::from("./cev_data")
    }
}

/// Resolves the root folder through the four configuration tiers
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_config: Option<TomlConfig>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_arg: None,
            toml_config: None,
        }
    }

    /// Command-line override (tier 1)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Parsed TOML config (tier 3); when unset the platform file is consulted
    pub fn with_toml_config(mut self, config: TomlConfig) -> Self {
        self.toml_config = Some(config);
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("[{}] Root folder from command line: {}", self.module_name, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("[{}] Root folder from {}: {}", self.module_name, ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        let toml_config = self
            .toml_config
            .clone()
            .unwrap_or_else(load_default_toml_config);
        if let Some(path) = toml_config.root_folder {
            info!("[{}] Root folder from config file: {}", self.module_name, path.display());
            return path;
        }

        let path = default_root_folder();
        info!("[{}] Root folder (default): {}", self.module_name, path.display());
        path
    }
}

/// Creates the root folder and locates files inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}
