//! Client configuration: YAML file, then environment, then CLI flags.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_TIMEOUT_SECS;

pub const LOCAL_CONFIG_FILE: &str = "ficous.yaml";
pub const ENV_API_URL: &str = "FICOUS_API_URL";
pub const ENV_TIMEOUT: &str = "FICOUS_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_secs: u64,
    /// `EnvFilter` directive used when `FICOUS_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_filter: "ficous_quiz=info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self, String> {
        let mut config: Config =
            serde_yaml::from_str(content).map_err(|e| format!("Invalid config: {}", e))?;
        config.normalize();
        Ok(config)
    }

    /// Apply `FICOUS_API_URL` / `FICOUS_TIMEOUT_SECS` as returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            self.request_timeout_secs = raw
                .trim()
                .parse()
                .map_err(|_| format!("{} must be a number of seconds, got {:?}", ENV_TIMEOUT, raw))?;
        }
        self.normalize();
        Ok(())
    }

    pub fn set_api_url(&mut self, url: &str) {
        self.api_url = url.to_string();
        self.normalize();
    }

    fn normalize(&mut self) {
        let trimmed = self.api_url.trim().trim_end_matches('/');
        self.api_url = trimmed.to_string();
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("br", "Ficous", "ficous-quiz")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.yaml"))
}

pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.data_dir().to_path_buf())
}

/// Load configuration.
///
/// Search order: the explicit `path` (must exist), `./ficous.yaml`, the
/// per-user config file, then built-in defaults. Environment overrides are
/// applied on top.
pub fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => return Err(format!("Config file not found: {}", p.display())),
        None => {
            let local = PathBuf::from(LOCAL_CONFIG_FILE);
            if local.exists() {
                Some(local)
            } else {
                default_config_path().filter(|p| p.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(p) => {
            let content = fs::read_to_string(&p)
                .map_err(|e| format!("Cannot read config {}: {}", p.display(), e))?;
            Config::from_yaml(&content).map_err(|e| format!("{} ({})", e, p.display()))?
        }
        None => Config::default(),
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("api_url: https://api.ficous.app/\n").unwrap();
        assert_eq!(config.api_url, "https://api.ficous.app");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.log_filter, "ficous_quiz=info");
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(Config::from_yaml("request_timeout_secs: soon").is_err());
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://10.0.0.2:9000/"),
            (ENV_TIMEOUT, "5"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_url, "http://10.0.0.2:9000");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn bad_timeout_env_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(|k| (k == ENV_TIMEOUT).then(|| "fast".to_string()))
            .unwrap_err();
        assert!(err.contains(ENV_TIMEOUT));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/ficous.yaml"))).unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn loads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "api_url: http://example.test\nrequest_timeout_secs: 12\n").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let mut config = Config::from_yaml(&content).unwrap();
        config.apply_env(|_| None).unwrap();
        assert_eq!(config.api_url, "http://example.test");
        assert_eq!(config.request_timeout_secs, 12);

        assert!(load_config(Some(&dir.path().join("missing.yaml"))).is_err());
    }
}
