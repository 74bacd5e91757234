use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::provider::SourceId;

/// Configuration for a single remote source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Database file; the platform data directory is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Dates this many days back (through today) go to the forecast source.
    pub forecast_window_days: u32,
    /// Years of cached history averaged for future dates.
    pub history_years: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self { forecast_window_days: 10, history_years: 10 }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Example TOML:
    /// [sources.archive]
    /// base_url = "https://archive-api.open-meteo.com/v1"
    pub sources: HashMap<String, SourceConfig>,

    pub cache: CacheConfig,

    pub routing: RoutingConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Platform data directory location used when `cache.path` is unset.
    pub fn default_database_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("weather.db"))
    }

    /// Record an explicit cache path only when it differs from the platform
    /// default or an override already exists.
    pub fn set_cache_path(&mut self, path: PathBuf, default: &Path) {
        if path.as_path() != default || self.cache.path.is_some() {
            self.cache.path = Some(path);
        }
    }

    /// Cache database location, creating its directory as needed.
    pub fn database_path(&self) -> Result<PathBuf> {
        let path = match &self.cache.path {
            Some(p) => p.clone(),
            None => Self::default_database_path()?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        Ok(path)
    }

    /// Base URL for a source, falling back to the public Open-Meteo host.
    pub fn source_base_url(&self, id: SourceId) -> &str {
        self.sources
            .get(id.as_str())
            .map(|cfg| cfg.base_url.as_str())
            .unwrap_or_else(|| id.default_base_url())
    }

    /// Set/replace a source base URL.
    pub fn upsert_source_base_url(&mut self, id: SourceId, base_url: String) {
        self.sources.insert(id.as_str().to_string(), SourceConfig { base_url });
    }

    pub fn is_source_overridden(&self, id: SourceId) -> bool {
        self.sources.contains_key(id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_open_meteo() {
        let cfg = Config::default();
        assert_eq!(cfg.source_base_url(SourceId::Archive), "https://archive-api.open-meteo.com/v1");
        assert_eq!(cfg.source_base_url(SourceId::Forecast), "https://api.open-meteo.com/v1");
        assert_eq!(cfg.routing.forecast_window_days, 10);
        assert_eq!(cfg.routing.history_years, 10);
    }

    #[test]
    fn upsert_overrides_one_source_only() {
        let mut cfg = Config::default();
        cfg.upsert_source_base_url(SourceId::Archive, "http://localhost:8080/v1".into());

        assert_eq!(cfg.source_base_url(SourceId::Archive), "http://localhost:8080/v1");
        assert!(cfg.is_source_overridden(SourceId::Archive));
        assert!(!cfg.is_source_overridden(SourceId::Forecast));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [routing]
            history_years = 5

            [sources.forecast]
            base_url = "http://mirror/v1"
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.routing.history_years, 5);
        assert_eq!(cfg.routing.forecast_window_days, 10);
        assert_eq!(cfg.source_base_url(SourceId::Forecast), "http://mirror/v1");
        assert!(cfg.cache.path.is_none());
    }

    #[test]
    fn toml_roundtrip_keeps_overrides() {
        let mut cfg = Config::default();
        cfg.cache.path = Some(PathBuf::from("/tmp/w.db"));
        cfg.upsert_source_base_url(SourceId::Forecast, "http://x/v1".into());

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.cache.path, cfg.cache.path);
        assert_eq!(back.source_base_url(SourceId::Forecast), "http://x/v1");
    }

    #[test]
    fn accepting_default_cache_path_keeps_it_unset() {
        let default = PathBuf::from("/data/weather.db");
        let mut cfg = Config::default();

        cfg.set_cache_path(default.clone(), &default);
        assert!(cfg.cache.path.is_none());

        cfg.set_cache_path(PathBuf::from("/elsewhere/w.db"), &default);
        assert_eq!(cfg.cache.path, Some(PathBuf::from("/elsewhere/w.db")));

        cfg.set_cache_path(default.clone(), &default);
        assert_eq!(cfg.cache.path, Some(default));
    }

    #[test]
    fn explicit_database_path_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.cache.path = Some(dir.path().join("nested").join("weather.db"));

        let path = cfg.database_path().unwrap();
        assert!(path.parent().unwrap().is_dir());
    }
}
