//! Layered engine settings: system, user and project files, `JOINER_*` variables, CLI file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::combine::Combine;
use crate::dirs::{CONFIG_FILE, system_config_file, user_config_file};

/// Default package document, relative to the working directory.
pub const DEFAULT_PACKAGES: &str = "joiner.json";

/// Resolved engine settings, after every layer has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Package document (`.json` or `.toml`) declaring the packages
    pub packages: PathBuf,

    /// Base directory for relative source paths.
    /// Defaults to the directory holding the package document.
    pub root: Option<PathBuf>,

    /// Read the files of each list in parallel (output order is unchanged)
    pub parallel_reads: bool,

    /// Reject packages whose files do not all share the inferred type
    pub strict_types: bool,
}

impl Default for Config {
    fn default() -> Self {
        ConfigLayer::default().resolve()
    }
}

/// Settings from one source (a config file or the environment).
///
/// Keys a layer leaves unset fall through to the layers below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConfigLayer {
    /// See [`Config::packages`]
    pub packages: Option<PathBuf>,
    /// See [`Config::root`]
    pub root: Option<PathBuf>,
    /// See [`Config::parallel_reads`]
    pub parallel_reads: Option<bool>,
    /// See [`Config::strict_types`]
    pub strict_types: Option<bool>,
}

impl Combine for ConfigLayer {
    fn combine(self, other: Self) -> Self {
        Self {
            packages: self.packages.combine(other.packages),
            root: self.root.combine(other.root),
            parallel_reads: self.parallel_reads.combine(other.parallel_reads),
            strict_types: self.strict_types.combine(other.strict_types),
        }
    }
}

impl ConfigLayer {
    /// Load configuration values from environment variables with JOINER_ prefix
    pub fn from_env() -> Self {
        Self {
            packages: non_empty_var("JOINER_PACKAGES").map(PathBuf::from),
            root: non_empty_var("JOINER_ROOT").map(PathBuf::from),
            parallel_reads: non_empty_var("JOINER_PARALLEL_READS").and_then(|v| parse_bool(&v)),
            strict_types: non_empty_var("JOINER_STRICT_TYPES").and_then(|v| parse_bool(&v)),
        }
    }

    /// Load a single config file from a path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut layer: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        // Paths inside a config file are relative to that file
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            for value in [layer.packages.as_mut(), layer.root.as_mut()]
                .into_iter()
                .flatten()
            {
                if value.is_relative() {
                    *value = dir.join(&*value);
                }
            }
        }

        Ok(layer)
    }

    /// Fill every unset key with its default.
    pub fn resolve(self) -> Config {
        Config {
            packages: self
                .packages
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PACKAGES)),
            root: self.root,
            parallel_reads: self.parallel_reads.unwrap_or(false),
            strict_types: self.strict_types.unwrap_or(false),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parse a boolean value from string, supporting various common formats
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Override the package document path (e.g. from the CLI)
    pub fn set_packages(&mut self, packages: PathBuf) {
        self.packages = packages;
    }

    /// Load configuration with hierarchical precedence:
    /// 1. CLI-provided config path (highest precedence)
    /// 2. Environment variables (JOINER_*)
    /// 3. Project config (joiner.toml in current directory)
    /// 4. User config (~/.config/joiner/joiner.toml)
    /// 5. System config (/etc/joiner/joiner.toml or equivalent)
    /// 6. Default values (lowest precedence)
    pub fn load(cli_config_path: Option<&Path>) -> Result<Self> {
        let mut layer = ConfigLayer::default();

        if let Some(system_config_path) = system_config_file() {
            log::debug!("Loading system config from: {:?}", system_config_path);
            let system_layer =
                ConfigLayer::load_from_file(&system_config_path).with_context(|| {
                    format!("Failed to load system config from {:?}", system_config_path)
                })?;
            layer = system_layer.combine(layer);
        }

        if let Some(user_config_path) = user_config_file().filter(|path| path.exists()) {
            log::debug!("Loading user config from: {:?}", user_config_path);
            let user_layer = ConfigLayer::load_from_file(&user_config_path).with_context(|| {
                format!("Failed to load user config from {:?}", user_config_path)
            })?;
            layer = user_layer.combine(layer);
        }

        let project_config_path = PathBuf::from(CONFIG_FILE);
        if project_config_path.exists() {
            log::debug!("Loading project config from: {:?}", project_config_path);
            let project_layer =
                ConfigLayer::load_from_file(&project_config_path).with_context(|| {
                    format!(
                        "Failed to load project config from {:?}",
                        project_config_path
                    )
                })?;
            layer = project_layer.combine(layer);
        }

        layer = ConfigLayer::from_env().combine(layer);

        if let Some(cli_config_path) = cli_config_path {
            log::debug!("Loading CLI config from: {:?}", cli_config_path);
            let cli_layer = ConfigLayer::load_from_file(cli_config_path)
                .with_context(|| format!("Failed to load CLI config from {:?}", cli_config_path))?;
            layer = cli_layer.combine(layer);
        }

        Ok(layer.resolve())
    }
}
