//! Connection settings, layered file < environment < command line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::rundeck::{DEFAULT_API_VERSION, Error, RequestContext};

pub const CONFIG_ENV: &str = "RUNDECK_CONFIG";

/// Shape of the optional config file (YAML or JSON).
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub token: Option<String>,
    pub project_name: Option<String>,
    pub insecure: Option<bool>,
    pub proxy: Option<bool>,
    pub api_version: Option<u32>,
    pub file_store: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let lower = path.to_string_lossy().to_ascii_lowercase();
        if lower.ends_with(".json") {
            serde_json::from_str(&raw).context("failed to parse JSON config file")
        } else {
            serde_yaml::from_str(&raw).context("failed to parse YAML config file")
        }
    }

    /// Fill unset fields from `other`; fields already set win.
    fn or(self, other: ConfigFile) -> ConfigFile {
        ConfigFile {
            url: self.url.or(other.url),
            token: self.token.or(other.token),
            project_name: self.project_name.or(other.project_name),
            insecure: self.insecure.or(other.insecure),
            proxy: self.proxy.or(other.proxy),
            api_version: self.api_version.or(other.api_version),
            file_store: self.file_store.or(other.file_store),
        }
    }

    fn from_env(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        Ok(ConfigFile {
            url: get("RUNDECK_URL"),
            token: get("RUNDECK_TOKEN"),
            project_name: get("RUNDECK_PROJECT"),
            insecure: get("RUNDECK_INSECURE")
                .map(|v| parse_bool("RUNDECK_INSECURE", &v))
                .transpose()?,
            proxy: get("RUNDECK_PROXY")
                .map(|v| parse_bool("RUNDECK_PROXY", &v))
                .transpose()?,
            api_version: None,
            file_store: get("RUNDECK_FILE_STORE").map(PathBuf::from),
        })
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("{name} must be a boolean, got '{other}'")).into()),
    }
}

fn missing(what: &str, flag: &str, var: &str) -> Error {
    Error::Config(format!(
        "no {what} configured (use {flag}, {var} or the config file)"
    ))
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub url: String,
    pub token: String,
    pub project_name: Option<String>,
    pub insecure: bool,
    pub proxy: bool,
    pub api_version: u32,
    pub file_store: Option<PathBuf>,
}

impl Config {
    /// Merge the three layers. `env` is a variable lookup (normally
    /// `std::env::var(..).ok()`).
    pub fn resolve(
        file: Option<ConfigFile>,
        env: impl Fn(&str) -> Option<String>,
        overrides: ConfigFile,
    ) -> Result<Self> {
        let merged = overrides
            .or(ConfigFile::from_env(env)?)
            .or(file.unwrap_or_default());

        let url = merged
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| missing("server URL", "--url", "RUNDECK_URL"))?;
        let token = merged
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| missing("API token", "--token", "RUNDECK_TOKEN"))?;

        let cfg = Config {
            url: url.trim().to_string(),
            token: token.trim().to_string(),
            project_name: merged.project_name.filter(|p| !p.trim().is_empty()),
            insecure: merged.insecure.unwrap_or(false),
            proxy: merged.proxy.unwrap_or(false),
            api_version: merged.api_version.unwrap_or(DEFAULT_API_VERSION),
            file_store: merged.file_store,
        };
        debug!(
            url = %cfg.url,
            project = cfg.project_name.as_deref().unwrap_or("-"),
            insecure = cfg.insecure,
            proxy = cfg.proxy,
            "configuration resolved"
        );
        Ok(cfg)
    }

    /// Read the file named by `path` (or `RUNDECK_CONFIG`), then resolve
    /// against the process environment.
    pub fn from_sources(path: Option<&Path>, overrides: ConfigFile) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok().filter(|p| !p.is_empty());
        let file = match path.map(Path::to_path_buf).or(env_path.map(PathBuf::from)) {
            Some(p) => Some(ConfigFile::load(&p)?),
            None => None,
        };
        Self::resolve(file, |k| std::env::var(k).ok(), overrides)
    }

    pub fn request_context(&self) -> Result<RequestContext> {
        RequestContext::new(
            &self.url,
            self.api_version,
            &self.token,
            self.project_name.clone(),
            !self.insecure,
            self.proxy,
        )
        .context("invalid server URL")
    }
}
