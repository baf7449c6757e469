use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use session_core::{SessionSettings, StaleFetchPolicy};

const DEFAULT_CONFIG_FILE: &str = "storefront.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub page_size: usize,
    pub stale_fetch_policy: StaleFetchPolicy,
    pub queue_capacity: usize,
    pub source_latency_ms: u64,
    /// JSON catalog seed; the built-in demo catalog when unset.
    pub catalog_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        let session = SessionSettings::default();
        Self {
            page_size: session.page_size,
            stale_fetch_policy: session.stale_fetch_policy,
            queue_capacity: session.queue_capacity,
            source_latency_ms: 0,
            catalog_path: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn session(&self) -> SessionSettings {
        SessionSettings {
            page_size: self.page_size,
            stale_fetch_policy: self.stale_fetch_policy,
            queue_capacity: self.queue_capacity,
        }
    }

    pub fn source_latency(&self) -> Duration {
        Duration::from_millis(self.source_latency_ms)
    }
}

/// Defaults, then the config file, then environment overrides.
///
/// An explicit `path` must exist; otherwise `storefront.toml` in the working
/// directory is read when present.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_settings_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Settings::default(),
    };
    let settings = apply_env_overrides(settings, |key| std::env::var(key).ok())?;
    validate(&settings)?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

/// `STOREFRONT_*` variables win over their `APP__*` aliases.
fn apply_env_overrides(
    mut settings: Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let var = |name: &str| {
        lookup(&format!("STOREFRONT_{name}")).or_else(|| lookup(&format!("APP__{name}")))
    };

    if let Some(v) = var("PAGE_SIZE") {
        settings.page_size = parse_var("PAGE_SIZE", &v)?;
    }
    if let Some(v) = var("QUEUE_CAPACITY") {
        settings.queue_capacity = parse_var("QUEUE_CAPACITY", &v)?;
    }
    if let Some(v) = var("SOURCE_LATENCY_MS") {
        settings.source_latency_ms = parse_var("SOURCE_LATENCY_MS", &v)?;
    }
    if let Some(v) = var("STALE_FETCH_POLICY") {
        settings.stale_fetch_policy = parse_policy(&v)?;
    }
    if let Some(v) = var("CATALOG_PATH") {
        settings.catalog_path = if v.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(v))
        };
    }
    if let Some(v) = var("LOG") {
        settings.log_filter = v;
    }

    Ok(settings)
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("invalid value '{raw}' for STOREFRONT_{name}"))
}

fn parse_policy(raw: &str) -> anyhow::Result<StaleFetchPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "apply_all" => Ok(StaleFetchPolicy::ApplyAll),
        "discard_stale" => Ok(StaleFetchPolicy::DiscardStale),
        other => bail!(
            "invalid value '{other}' for STOREFRONT_STALE_FETCH_POLICY (expected apply_all or discard_stale)"
        ),
    }
}

fn validate(settings: &Settings) -> anyhow::Result<()> {
    if settings.page_size == 0 {
        bail!("page_size must be at least 1");
    }
    if settings.queue_capacity == 0 {
        bail!("queue_capacity must be at least 1");
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
