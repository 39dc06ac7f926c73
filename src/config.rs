//! Configuration module for the reflection extractor.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PYREFLECT_` and use double
//! underscores to separate nested levels:
//! - `PYREFLECT_LOADER__PARALLEL_THREADS=8` sets `loader.parallel_threads`
//! - `PYREFLECT_OUTPUT__PRETTY=false` sets `output.pretty`
//! - `PYREFLECT_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directory holding the settings file, looked up from the current directory upwards
pub const CONFIG_DIR: &str = ".pyreflect";
pub const CONFIG_FILE: &str = "settings.toml";
pub const ENV_PREFIX: &str = "PYREFLECT_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Module discovery
    #[serde(default)]
    pub loader: LoaderConfig,

    /// CLI output
    #[serde(default)]
    pub output: OutputConfig,

    /// Log levels
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Modules and packages `pyreflect load` reflects when none are given
    #[serde(default)]
    pub modules: Vec<String>,

    /// Directories searched for modules; empty means the current directory.
    /// A `*` entry expands to the directories in `PYTHONPATH`.
    #[serde(default)]
    pub search_path: Vec<PathBuf>,

    /// Number of files reflected in parallel
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Include file/line locations in JSON output
    #[serde(default = "default_true")]
    pub include_locations: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level for everything without a module override
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `loader = "info"`
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            loader: LoaderConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            search_path: Vec::new(),
            parallel_threads: default_parallel_threads(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            include_locations: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| Path::new(CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration with a specific file as the TOML layer
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nested levels, single underscore stays in field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the settings file by looking for the config directory
    /// from the current directory up to the root
    pub fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file under `root`
    pub fn init_config_file(
        root: impl AsRef<Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }

    /// Effective settings rendered as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert!(settings.loader.parallel_threads > 0);
        assert!(settings.loader.search_path.is_empty());
        assert!(settings.output.pretty);
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2

[loader]
modules = ["mypkg", "tools.cli"]
search_path = ["src", "*"]
parallel_threads = 4

[output]
include_locations = false

[logging]
default = "info"

[logging.modules]
loader = "debug"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.loader.modules, vec!["mypkg", "tools.cli"]);
        assert_eq!(
            settings.loader.search_path,
            vec![PathBuf::from("src"), PathBuf::from("*")]
        );
        assert_eq!(settings.loader.parallel_threads, 4);
        assert!(!settings.output.include_locations);
        assert!(settings.output.pretty);
        assert_eq!(settings.logging.default, "info");
        assert_eq!(settings.logging.modules["loader"], "debug");
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.loader.parallel_threads = 2;
        settings.loader.modules = vec!["app".to_string()];

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.loader.parallel_threads, 2);
        assert_eq!(loaded.loader.modules, vec!["app"]);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();

        let path = Settings::init_config_file(temp_dir.path(), false).unwrap();
        assert!(path.ends_with(Path::new(CONFIG_DIR).join(CONFIG_FILE)));
        assert!(Settings::init_config_file(temp_dir.path(), false).is_err());
        assert!(Settings::init_config_file(temp_dir.path(), true).is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.output, OutputConfig::default());
    }
}
