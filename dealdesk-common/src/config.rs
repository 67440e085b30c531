//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// TOML configuration file contents (`~/.config/dealdesk/config.toml`)
///
/// All fields optional; unset fields fall back to environment variables or
/// database-stored settings at resolution time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root data folder (database lives here)
    pub root_folder: Option<String>,
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// Perplexity API key
    pub perplexity_api_key: Option<String>,
    /// Google Custom Search API key
    pub google_search_api_key: Option<String>,
    /// Google Custom Search engine ID
    pub google_search_engine_id: Option<String>,
    /// Maximum enrichment packs in flight at once
    pub pack_concurrency: Option<usize>,
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config) = load_toml_config() {
        if let Some(root_folder) = config.root_folder {
            return Ok(PathBuf::from(root_folder));
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_root_folder())
}

/// Load the TOML config file from the platform config directory
pub fn load_toml_config() -> Result<TomlConfig> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read config file failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse config file failed: {}", e)))
}

/// Get configuration file path for the platform
fn config_file_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/dealdesk/config.toml first, then /etc/dealdesk/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("dealdesk").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/dealdesk/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("dealdesk").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("dealdesk"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/dealdesk"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("dealdesk"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/dealdesk"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("dealdesk"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\dealdesk"))
    } else {
        PathBuf::from("./dealdesk_data")
    }
}

/// Database file path inside the root folder
pub fn database_path(root_folder: &std::path::Path) -> PathBuf {
    root_folder.join("dealdesk.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn cli_arg_wins_over_env() {
        std::env::set_var("DEALDESK_TEST_ROOT", "/tmp/from-env");
        let resolved = resolve_root_folder(Some("/tmp/from-cli"), "DEALDESK_TEST_ROOT").unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/from-cli"));
        std::env::remove_var("DEALDESK_TEST_ROOT");
    }

    #[test]
    #[serial]
    fn env_used_when_no_cli_arg() {
        std::env::set_var("DEALDESK_TEST_ROOT_2", "/tmp/from-env");
        let resolved = resolve_root_folder(None, "DEALDESK_TEST_ROOT_2").unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/from-env"));
        std::env::remove_var("DEALDESK_TEST_ROOT_2");
    }

    #[test]
    fn toml_config_parses_partial_file() {
        let config: TomlConfig =
            toml::from_str("openai_api_key = \"sk-test\"\npack_concurrency = 5\n").unwrap();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.pack_concurrency, Some(5));
        assert!(config.perplexity_api_key.is_none());
    }
}
