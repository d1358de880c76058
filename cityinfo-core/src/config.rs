use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api-ugi2pflmha-ew.a.run.app";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// host = "0.0.0.0"
/// port = 8080
/// ready_webhook_url = "https://example.com/ready"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key sent as `apiKey` to both upstreams.
    pub api_key: Option<String>,
    pub host: String,
    pub port: u16,
    pub insights_base_url: String,
    pub weather_base_url: String,
    /// Receives a POST once the listener is bound.
    pub ready_webhook_url: Option<String>,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            insights_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            weather_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            ready_webhook_url: None,
            log_level: None,
        }
    }
}

impl Config {
    /// Load config from the platform config dir, or defaults if there is no file yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Path to the default config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityinfo", "cityinfo-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Overlay values from `lookup`. Empty values count as unset.
    ///
    /// `RENDER_EXTERNAL_URL` forces the bind host to `0.0.0.0`, overriding `HOST`.
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(port) = var("PORT") {
            self.port = port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{port}'"))?;
        }
        if let Some(host) = var("HOST") {
            self.host = host;
        }
        if var("RENDER_EXTERNAL_URL").is_some() {
            self.host = "0.0.0.0".to_string();
        }
        if let Some(url) = var("INSIGHTS_BASE_URL") {
            self.insights_base_url = url;
        }
        if let Some(url) = var("WEATHER_BASE_URL") {
            self.weather_base_url = url;
        }
        if let Some(url) = var("READY_WEBHOOK_URL") {
            self.ready_webhook_url = Some(url);
        }

        Ok(())
    }

    /// API key for upstream calls; empty when none is configured.
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_local_development() {
        let cfg = Config::default();

        assert_eq!(cfg.bind_address(), "localhost:3000");
        assert_eq!(cfg.insights_base_url, DEFAULT_UPSTREAM_BASE_URL);
        assert_eq!(cfg.api_key(), "");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::from_toml_str("api_key = \"FILE\"\nport = 4000\n").expect("toml");

        cfg.apply_vars(vars(&[("API_KEY", "ENV"), ("HOST", "127.0.0.1")])).expect("env");

        assert_eq!(cfg.api_key(), "ENV");
        assert_eq!(cfg.bind_address(), "127.0.0.1:4000");
    }

    #[test]
    fn render_forces_wildcard_host() {
        let mut cfg = Config::default();

        cfg.apply_vars(vars(&[
            ("HOST", "example.internal"),
            ("RENDER_EXTERNAL_URL", "https://cityinfo.onrender.com"),
            ("PORT", "10000"),
        ]))
        .expect("env");

        assert_eq!(cfg.bind_address(), "0.0.0.0:10000");
    }

    #[test]
    fn empty_vars_are_ignored() {
        let mut cfg = Config::default();
        cfg.apply_vars(vars(&[("PORT", ""), ("API_KEY", "  ")])).expect("env");

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn invalid_port_is_an_error() {
        let mut cfg = Config::default();
        let err = cfg.apply_vars(vars(&[("PORT", "eighty")])).unwrap_err();

        assert!(err.to_string().contains("PORT must be a port number"));
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "weather_base_url = \"http://127.0.0.1:9999\"\n").expect("write");

        let cfg = Config::load_from(&path).expect("load");
        assert_eq!(cfg.weather_base_url, "http://127.0.0.1:9999");
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();

        assert!(err.to_string().contains("Failed to read config file"));
    }
}
