//! Layered configuration.
//!
//! Defaults, then `.symbolscope/settings.toml`, then `SYMSCOPE_`-prefixed
//! environment variables — in that order, each layer overriding the last
//! (figment's merge order).
//!
//! # Environment variables
//!
//! `SYMSCOPE_` prefixed, double underscore separates nested levels:
//! - `SYMSCOPE_INDEXING__PARALLEL_THREADS=8` sets `indexing.parallel_threads`
//! - `SYMSCOPE_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AnalyzerError, AnalyzerResult};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,

    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_state_path() -> PathBuf {
    PathBuf::from(".symbolscope/state.bin")
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_ignore_patterns() -> Vec<String> {
    vec![
        "target/**".to_string(),
        "node_modules/**".to_string(),
        ".git/**".to_string(),
        "dist/**".to_string(),
        "build/**".to_string(),
    ]
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            state_path: default_state_path(),
            indexing: IndexingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_parallel_threads(),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Loads configuration from all layers (spec §10.3: defaults → TOML →
    /// env). Missing config file is not an error — it's simply skipped by
    /// figment's `Toml::file`.
    pub fn load() -> Result<Self, figment::Error> {
        let config_path = Self::find_workspace_config().unwrap_or_else(|| PathBuf::from(".symbolscope/settings.toml"));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("SYMSCOPE_").map(|key| key.as_str().to_lowercase().replace("__", ".").into()))
            .extract()
    }

    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SYMSCOPE_").map(|key| key.as_str().to_lowercase().replace("__", ".").into()))
            .extract()
    }

    /// Searches from the current directory upward for a `.symbolscope`
    /// directory, the same "nearest ancestor wins" rule a VCS root search
    /// uses.
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".symbolscope");
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }
        None
    }

    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        current
            .ancestors()
            .find(|ancestor| ancestor.join(".symbolscope").is_dir())
            .map(|p| p.to_path_buf())
    }

    /// Writes the default settings to `.symbolscope/settings.toml` in the
    /// current directory (the `init` CLI command). Refuses to overwrite an
    /// existing file unless `force` is set.
    pub fn init_config_file(force: bool) -> AnalyzerResult<PathBuf> {
        let dir = PathBuf::from(".symbolscope");
        let path = dir.join("settings.toml");
        if path.exists() && !force {
            return Err(AnalyzerError::ConfigError {
                reason: format!("configuration file already exists at {}", path.display()),
            });
        }

        std::fs::create_dir_all(&dir).map_err(|source| AnalyzerError::FileWrite {
            path: dir.clone(),
            source,
        })?;
        let toml_str = toml::to_string_pretty(&Settings::default())
            .map_err(|err| AnalyzerError::ConfigError { reason: err.to_string() })?;
        std::fs::write(&path, toml_str).map_err(|source| AnalyzerError::FileWrite {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert!(settings.indexing.parallel_threads >= 1);
        assert_eq!(settings.logging.default, "warn");
    }
}
