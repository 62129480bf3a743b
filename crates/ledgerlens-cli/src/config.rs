// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use ledgerlens_app::{DEFAULT_PAGE_SIZE, ResourceKind};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "ledgerlens";
const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT: &str = "10s";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
    pub page_size: Option<u64>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
            page_size: Some(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub resource: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            resource: Some(ResourceKind::Channels.as_str().to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("LEDGERLENS_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set LEDGERLENS_CONFIG_PATH to the config file"
            )
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [api] and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Self = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url
            && base_url.trim().is_empty()
        {
            bail!("api.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(page_size) = self.api.page_size
            && page_size == 0
        {
            bail!("api.page_size in {} must be at least 1", path.display());
        }

        if let Some(resource) = &self.ui.resource
            && ResourceKind::parse(resource).is_none()
        {
            bail!(
                "ui.resource in {} must be \"channels\" or \"connections\", got {:?}",
                path.display(),
                resource
            );
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn page_size(&self) -> u64 {
        self.api.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    pub fn resource(&self) -> ResourceKind {
        self.ui
            .resource
            .as_deref()
            .and_then(ResourceKind::parse)
            .unwrap_or(ResourceKind::Channels)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# ledgerlens config\n# Place this file at: {}\n\nversion = 1\n\n[api]\n# Base url of the protocol-query service\nbase_url = \"{}\"\ntimeout = \"{}\"\npage_size = {}\n\n[ui]\n# Listing shown on startup: \"channels\" or \"connections\"\nresource = \"channels\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_PAGE_SIZE,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use ledgerlens_app::ResourceKind;
    use std::path::PathBuf;
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.base_url(), "http://localhost:3000");
        assert_eq!(config.page_size(), 20);
        assert_eq!(config.resource(), ResourceKind::Channels);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[api]\nbase_url=\"http://localhost:3000\"\n")?;
        let error = Config::load(&path).expect_err("unversioned schema should fail");
        assert!(error.to_string().contains("version = 1"));
        Ok(())
    }

    #[test]
    fn future_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("future version should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[api]\nbase_url = \"http://explorer.example:8080/\"\ntimeout = \"2s\"\npage_size = 50\n[ui]\nresource = \"connections\"\n",
        )?;
        let config = Config::load(&path)?;
        assert_eq!(config.base_url(), "http://explorer.example:8080");
        assert_eq!(config.timeout()?, Duration::from_secs(2));
        assert_eq!(config.page_size(), 50);
        assert_eq!(config.resource(), ResourceKind::Connections);
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unknown_resource_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nresource = \"packets\"\n")?;
        let error = Config::load(&path).expect_err("unknown resource should fail");
        assert!(error.to_string().contains("ui.resource"));
        Ok(())
    }

    #[test]
    fn zero_page_size_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[api]\npage_size = 0\n")?;
        let error = Config::load(&path).expect_err("zero page size should fail");
        assert!(error.to_string().contains("page_size"));
        Ok(())
    }

    #[test]
    fn parse_duration_accepts_supported_suffixes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        assert!(parse_duration("5h").is_err());
        assert!(parse_duration("fast").is_err());
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;
        let config = Config::load(&path)?;
        assert_eq!(config.page_size(), 20);
        assert_eq!(config.resource(), ResourceKind::Channels);
        Ok(())
    }
}
