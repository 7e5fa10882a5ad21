// src/config.rs
//! Service configuration.
//!
//! Layering: built-in defaults → optional TOML file (`$SNAPI_CONFIG_PATH`,
//! else `config/snapi.toml` when present) → environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::lookup::LookupTtls;
use crate::sync::{ScheduleCfg, DEFAULT_EVENTS_CRON, DEFAULT_LAUNCHES_CRON, DEFAULT_PAGE_SIZE};

pub const DEFAULT_CONFIG_PATH: &str = "config/snapi.toml";
pub const ENV_CONFIG_PATH: &str = "SNAPI_CONFIG_PATH";

fn default_ll_url() -> String {
    "https://ll.thespacedevs.com/2.2.0".to_string()
}
fn default_true() -> bool {
    true
}
fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}
fn default_launches_cron() -> String {
    DEFAULT_LAUNCHES_CRON.to_string()
}
fn default_events_cron() -> String {
    DEFAULT_EVENTS_CRON.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_lookup_ttl() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SyncSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Cron expression, UTC.
    #[serde(default = "default_launches_cron")]
    pub launches_cron: String,
    /// Cron expression, UTC.
    #[serde(default = "default_events_cron")]
    pub events_cron: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: default_page_size(),
            launches_cron: default_launches_cron(),
            events_cron: default_events_cron(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CacheSection {
    #[serde(default = "default_lookup_ttl")]
    pub lookup_ttl_secs: u64,
    #[serde(default = "default_lookup_ttl")]
    pub negative_ttl_secs: u64,
    /// Upper bound on cached lookups; unbounded when unset.
    #[serde(default)]
    pub capacity: Option<u64>,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            lookup_ttl_secs: default_lookup_ttl(),
            negative_ttl_secs: default_lookup_ttl(),
            capacity: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_ll_url")]
    pub ll_url: String,
    #[serde(default)]
    pub ll_token: Option<String>,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub cache: CacheSection,
    /// JSON snapshot used to seed the in-memory store.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
    #[serde(default)]
    pub metrics: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ll_url: default_ll_url(),
            ll_token: None,
            sync: SyncSection::default(),
            cache: CacheSection::default(),
            seed_path: None,
            metrics: false,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| anyhow!("invalid value for {name}: '{raw}'"))
}

// Shape check only; the scheduler parses the expression when jobs are added.
fn check_cron(name: &str, raw: &str) -> Result<()> {
    let fields = raw.split_whitespace().count();
    if (5..=6).contains(&fields) {
        Ok(())
    } else {
        Err(anyhow!("{name} must be a 5 or 6 field cron expression, got '{raw}'"))
    }
}

impl AppConfig {
    /// Defaults, then the config file, then process env.
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut cfg = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Apply overrides from an env-like lookup.
    pub fn apply_env<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("LL_URL") {
            self.ll_url = v;
        }
        if let Some(v) = get("LL_TOKEN") {
            self.ll_token = Some(v);
        }
        if let Some(v) = get("SYNC_ENABLED") {
            self.sync.enabled = matches!(v.trim(), "1" | "true" | "yes");
        }
        if let Some(v) = get("SYNC_PAGE_SIZE") {
            self.sync.page_size = parse_env("SYNC_PAGE_SIZE", &v)?;
        }
        if let Some(v) = get("SYNC_LAUNCHES_CRON") {
            self.sync.launches_cron = v.trim().to_string();
        }
        if let Some(v) = get("SYNC_EVENTS_CRON") {
            self.sync.events_cron = v.trim().to_string();
        }
        if let Some(v) = get("UPSTREAM_TIMEOUT_SECS") {
            self.sync.timeout_secs = parse_env("UPSTREAM_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("LOOKUP_CACHE_TTL_SECS") {
            self.cache.lookup_ttl_secs = parse_env("LOOKUP_CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = get("LOOKUP_NEGATIVE_TTL_SECS") {
            self.cache.negative_ttl_secs = parse_env("LOOKUP_NEGATIVE_TTL_SECS", &v)?;
        }
        if let Some(v) = get("LOOKUP_CACHE_CAPACITY") {
            self.cache.capacity = Some(parse_env("LOOKUP_CACHE_CAPACITY", &v)?);
        }
        if let Some(v) = get("SNAPI_SEED_PATH") {
            self.seed_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("SNAPI_METRICS") {
            self.metrics = matches!(v.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync.page_size == 0 {
            return Err(anyhow!("sync.page_size must be at least 1"));
        }
        check_cron("sync.launches_cron", &self.sync.launches_cron)?;
        check_cron("sync.events_cron", &self.sync.events_cron)?;
        Ok(())
    }

    pub fn schedule(&self) -> ScheduleCfg {
        ScheduleCfg {
            launches_cron: self.sync.launches_cron.clone(),
            events_cron: self.sync.events_cron.clone(),
        }
    }

    pub fn lookup_ttls(&self) -> LookupTtls {
        LookupTtls {
            positive: Duration::from_secs(self.cache.lookup_ttl_secs),
            negative: Duration::from_secs(self.cache.negative_ttl_secs),
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_service_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.sync.page_size, 100);
        assert_eq!(cfg.cache.lookup_ttl_secs, 3600);
        assert_eq!(cfg.cache.capacity, None);
        assert_eq!(cfg.lookup_ttls(), LookupTtls::default());
        assert_eq!(cfg.schedule(), ScheduleCfg::default());
    }

    #[test]
    fn toml_then_env_layering() {
        let toml = r#"
            ll_url = "http://localhost:9000"
            [sync]
            page_size = 50
            events_cron = "30 7 * * *"
            [cache]
            negative_ttl_secs = 60
        "#;
        let mut cfg = AppConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.sync.page_size, 50);
        assert_eq!(cfg.sync.launches_cron, "0 6 * * *");
        assert_eq!(cfg.cache.negative_ttl_secs, 60);
        assert_eq!(cfg.cache.lookup_ttl_secs, 3600);

        let env: HashMap<&str, &str> = [("SYNC_PAGE_SIZE", "25"), ("LL_TOKEN", "secret")].into();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.sync.page_size, 25);
        assert_eq!(cfg.ll_token.as_deref(), Some("secret"));
        assert_eq!(cfg.ll_url, "http://localhost:9000");
        assert_eq!(cfg.schedule().events_cron, "30 7 * * *");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut cfg = AppConfig::default();
        assert!(cfg
            .apply_env(|k| (k == "SYNC_PAGE_SIZE").then(|| "lots".to_string()))
            .is_err());

        let mut cfg = AppConfig::default();
        cfg.sync.launches_cron = "6am".into();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.sync.events_cron = "*/10 * * * * *".into();
        assert!(cfg.validate().is_ok());
    }

    #[serial_test::serial]
    #[test]
    fn load_reads_file_from_env_path() {
        let dir = std::env::temp_dir().join(format!("snapi-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snapi.toml");
        std::fs::write(&path, "metrics = true\n[sync]\nenabled = false\n").unwrap();

        std::env::set_var(ENV_CONFIG_PATH, &path);
        let cfg = AppConfig::load().unwrap();
        std::env::remove_var(ENV_CONFIG_PATH);
        let _ = std::fs::remove_dir_all(&dir);

        assert!(cfg.metrics);
        assert!(!cfg.sync.enabled);
    }
}
