//! Configuration management

use crate::core::error::{Error, Result};
use crate::lim::types::LanguageKind;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of string table buckets
pub const DEFAULT_STRING_BUCKETS: u32 = 511;

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
    pub filter: FilterConfig,
    pub output: OutputConfig,
    pub strings: StringsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Language tag written into member nodes and the header
    pub language: String,
    /// Base name of the produced graph files
    pub lim_name: Option<String>,
    /// Build configuration recorded in the header (e.g. Debug)
    pub configuration: Option<String>,
    /// Target platform recorded in the header (e.g. AnyCPU)
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Rule file whose excluded paths are skipped entirely
    pub hard: Option<PathBuf>,
    /// Rule file whose excluded paths produce filtered nodes
    pub soft: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write a LIMML text dump next to the graph
    pub dump_limml: bool,
    /// Write the filtered companion graph
    pub filtered_graph: bool,
    /// Write the per-node filter state file
    pub filter_state: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StringsConfig {
    /// Number of hash buckets in the string table
    pub buckets: u32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            language: "csharp".to_string(),
            lim_name: None,
            configuration: None,
            platform: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dump_limml: false,
            filtered_graph: false,
            filter_state: true,
        }
    }
}

impl Default for StringsConfig {
    fn default() -> Self {
        Self {
            buckets: DEFAULT_STRING_BUCKETS,
        }
    }
}

impl BuildConfig {
    /// Resolve the configured language name
    pub fn language_kind(&self) -> Result<LanguageKind> {
        LanguageKind::from_name(&self.language).ok_or_else(|| Error::ConfigError {
            message: format!("Unknown language: {}", self.language),
        })
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.strings.buckets == 0 || self.strings.buckets > u16::MAX as u32 {
            return Err(Error::ConfigError {
                message: format!(
                    "strings.buckets must be in 1..={} (got {})",
                    u16::MAX,
                    self.strings.buckets
                ),
            });
        }
        self.build.language_kind()?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = Self::limgraph_home()?;
        Ok(home.join("config.toml"))
    }

    /// Get the limgraph home directory
    pub fn limgraph_home() -> Result<PathBuf> {
        // Check LIMGRAPH_HOME env var first
        if let Ok(home) = std::env::var("LIMGRAPH_HOME") {
            return Ok(PathBuf::from(home));
        }

        ProjectDirs::from("dev", "limgraph", "limgraph")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| Error::ConfigError {
                message: "Could not determine limgraph home directory".to_string(),
            })
    }
}
