use std::{fs, path::Path, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "finchat.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub backend_url: Option<String>,
    pub query_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub listing_timeout_secs: u64,
    pub event_capacity: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_url: None,
            query_timeout_secs: 120,
            upload_timeout_secs: 300,
            listing_timeout_secs: 30,
            event_capacity: 256,
        }
    }
}

impl ClientSettings {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs.max(1))
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs.max(1))
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs.max(1))
    }

    pub fn with_backend_url(mut self, raw: &str) -> anyhow::Result<Self> {
        self.backend_url = Some(normalize_backend_url(raw)?);
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    backend_url: Option<String>,
    query_timeout_secs: Option<u64>,
    upload_timeout_secs: Option<u64>,
    listing_timeout_secs: Option<u64>,
    event_capacity: Option<usize>,
}

/// Defaults, then `path` (or `finchat.toml` in the working directory when it
/// exists), then `FINCHAT_*` environment variables.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let file = match path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_SETTINGS_FILE).ok(),
    };
    if let Some(raw) = file {
        apply_file(&mut settings, &raw)?;
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw).context("invalid settings file")?;

    if let Some(v) = file.backend_url {
        settings.backend_url = Some(normalize_backend_url(&v)?);
    }
    if let Some(v) = file.query_timeout_secs {
        settings.query_timeout_secs = v;
    }
    if let Some(v) = file.upload_timeout_secs {
        settings.upload_timeout_secs = v;
    }
    if let Some(v) = file.listing_timeout_secs {
        settings.listing_timeout_secs = v;
    }
    if let Some(v) = file.event_capacity {
        settings.event_capacity = v;
    }
    Ok(())
}

fn apply_env(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("FINCHAT_BACKEND_URL") {
        settings.backend_url = Some(normalize_backend_url(&v)?);
    }
    if let Some(v) = lookup("FINCHAT_QUERY_TIMEOUT_SECS") {
        settings.query_timeout_secs = parse_env("FINCHAT_QUERY_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("FINCHAT_UPLOAD_TIMEOUT_SECS") {
        settings.upload_timeout_secs = parse_env("FINCHAT_UPLOAD_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("FINCHAT_LISTING_TIMEOUT_SECS") {
        settings.listing_timeout_secs = parse_env("FINCHAT_LISTING_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("FINCHAT_EVENT_CAPACITY") {
        settings.event_capacity = parse_env("FINCHAT_EVENT_CAPACITY", &v)?;
    }
    Ok(())
}

fn parse_env<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("invalid value '{raw}' for {key}"))
}

pub fn normalize_backend_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid backend url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!(
            "backend url '{raw}' must use http or https, not '{}'",
            url.scheme()
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
