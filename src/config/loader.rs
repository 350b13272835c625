//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `--config FILE`, else `.presence-picker.toml` in the working directory
//! 4. `~/.config/presence-picker/config.toml` (global defaults)
//! 5. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::env::Env;
use crate::models::{ChartKind, IdField};
use crate::render::ChartSettings;
use crate::selector::SelectorSettings;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub selector: SelectorConfig,
    pub chart: ChartConfig,
}

/// Where the users listing comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub users_endpoint: String,
    pub id_field: IdField,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            users_endpoint: constants::DEFAULT_USERS_ENDPOINT.to_string(),
            id_field: IdField::default(),
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Selection control behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Value meaning "all users / no user".
    pub sentinel: String,
    pub avatar_placeholder: Option<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            sentinel: constants::DEFAULT_SENTINEL.to_string(),
            avatar_placeholder: None,
        }
    }
}

/// Chart rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub kind: ChartKind,
    /// Chart API root; derived from the users endpoint when unset.
    pub api_base: Option<String>,
    pub locale: String,
    pub packages: Vec<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let settings = ChartSettings::default();
        Self {
            kind: ChartKind::default(),
            api_base: None,
            locale: settings.locale,
            packages: settings.packages,
        }
    }
}

/// One config file as written: only the keys it sets are `Some`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    source: SourceLayer,
    selector: SelectorLayer,
    chart: ChartLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SourceLayer {
    users_endpoint: Option<String>,
    id_field: Option<IdField>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SelectorLayer {
    sentinel: Option<String>,
    avatar_placeholder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChartLayer {
    kind: Option<ChartKind>,
    api_base: Option<String>,
    locale: Option<String>,
    packages: Option<Vec<String>>,
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// `explicit` replaces the working-directory file when given; unlike
    /// the implicit files it must exist.
    pub fn load(cwd: Option<&Path>, explicit: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: explicit or working-directory config
        match explicit {
            Some(path) => config.merge(Self::load_file(path)?),
            None => {
                if let Some(dir) = cwd {
                    let local_path = dir.join(constants::CONFIG_FILENAME);
                    if local_path.exists() {
                        config.merge(Self::load_file(&local_path)?);
                    }
                }
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Load a config layer from a specific file.
    fn load_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge a file layer into this config; every key the layer sets wins.
    fn merge(&mut self, layer: ConfigLayer) {
        let ConfigLayer {
            source,
            selector,
            chart,
        } = layer;

        if let Some(endpoint) = source.users_endpoint {
            self.source.users_endpoint = endpoint;
        }
        if let Some(field) = source.id_field {
            self.source.id_field = field;
        }
        if let Some(secs) = source.timeout_secs {
            self.source.timeout_secs = secs;
        }

        if let Some(sentinel) = selector.sentinel {
            self.selector.sentinel = sentinel;
        }
        if selector.avatar_placeholder.is_some() {
            self.selector.avatar_placeholder = selector.avatar_placeholder;
        }

        if let Some(kind) = chart.kind {
            self.chart.kind = kind;
        }
        if chart.api_base.is_some() {
            self.chart.api_base = chart.api_base;
        }
        if let Some(locale) = chart.locale {
            self.chart.locale = locale;
        }
        if let Some(packages) = chart.packages {
            self.chart.packages = packages;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.non_empty(constants::ENV_USERS_URL) {
            self.source.users_endpoint = val;
        }
        if let Some(val) = env.non_empty(constants::ENV_ID_FIELD) {
            match val.parse::<IdField>() {
                Ok(field) => self.source.id_field = field,
                Err(e) => tracing::warn!("ignoring invalid {}: {e}", constants::ENV_ID_FIELD),
            }
        }
        if let Some(val) = env.non_empty(constants::ENV_CHART) {
            match val.parse::<ChartKind>() {
                Ok(kind) => self.chart.kind = kind,
                Err(_) => tracing::warn!("ignoring invalid {} value: {val}", constants::ENV_CHART),
            }
        }
        if let Some(val) = env.non_empty(constants::ENV_LOCALE) {
            self.chart.locale = val;
        }
        if let Some(val) = env.non_empty(constants::ENV_API_BASE) {
            self.chart.api_base = Some(val);
        }
    }

    /// Chart API root: the configured one, or the users endpoint's directory.
    pub fn api_base(&self) -> Result<String, ConfigError> {
        if let Some(ref base) = self.chart.api_base {
            return Ok(base.clone());
        }
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: self.source.users_endpoint.clone(),
            reason,
        };
        let users = Url::parse(&self.source.users_endpoint).map_err(|e| invalid(e.to_string()))?;
        let base = users.join("./").map_err(|e| invalid(e.to_string()))?;
        Ok(base.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    pub fn selector_settings(&self) -> SelectorSettings {
        SelectorSettings {
            id_field: self.source.id_field.clone(),
            sentinel: self.selector.sentinel.clone(),
            avatar_placeholder: self.selector.avatar_placeholder.clone(),
        }
    }

    pub fn chart_settings(&self) -> ChartSettings {
        ChartSettings {
            locale: self.chart.locale.clone(),
            packages: self.chart.packages.clone(),
        }
    }
}
