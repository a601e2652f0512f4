//! Service configuration loading and types.
//!
//! Non-secret settings come from an optional YAML file with environment
//! overrides. The provider credential is read from the environment only.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use flight_protocol::ApiCredential;
use serde::{Deserialize, Serialize};

/// Environment variable holding the provider API token.
pub const CREDENTIAL_ENV: &str = "SKYDIO_API_TOKEN";

/// Environment variable overriding `upstream.base_url`.
pub const BASE_URL_ENV: &str = "SKYDIO_BASE_URL";

/// Environment variable overriding `upstream.query_timeout_secs`.
pub const QUERY_TIMEOUT_ENV: &str = "FLIGHT_API_QUERY_TIMEOUT_SECS";

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub clustering: ClusteringConfig,

    #[serde(default)]
    pub map: MapConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file does not exist, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;

        tracing::info!(path = %path.display(), "Loaded service config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            self.upstream.base_url = base_url;
        }

        if let Some(secs) = lookup(QUERY_TIMEOUT_ENV) {
            self.upstream.query_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", QUERY_TIMEOUT_ENV))?;
        }

        self.validate()
    }

    fn validate(&self) -> Result<()> {
        let base = &self.upstream.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            bail!("upstream.base_url must be an http(s) URL, got '{}'", base);
        }
        if self.upstream.query_timeout_secs == 0 {
            bail!("upstream.query_timeout_secs must be greater than zero");
        }
        if !(self.clustering.radius_px.is_finite() && self.clustering.radius_px >= 0.0) {
            bail!("clustering.radius_px must be a non-negative number");
        }
        Ok(())
    }
}

/// Read the provider credential from the process environment.
pub fn credential_from_env() -> Result<ApiCredential> {
    load_credential(|key| std::env::var(key).ok())
}

/// Read the provider credential from an arbitrary variable source.
pub fn load_credential<F>(lookup: F) -> Result<ApiCredential>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(CREDENTIAL_ENV).and_then(ApiCredential::new) {
        Some(credential) => Ok(credential),
        None => bail!("{} is not set; the flight provider credential is required", CREDENTIAL_ENV),
    }
}

/// Flight provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Provider API root; `/flights` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Wall-clock limit for one query, including the provider call.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// TCP/TLS connect limit for the provider client.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            query_timeout_secs: default_query_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.skydio.com/api/v0".to_string()
}
fn default_query_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    10
}

/// Marker grouping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Merge radius in screen pixels.
    #[serde(default = "default_radius_px")]
    pub radius_px: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            radius_px: default_radius_px(),
        }
    }
}

fn default_radius_px() -> f64 {
    clustering::DEFAULT_RADIUS_PX
}

/// Initial map view handed to front-ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_notice")]
    pub notice: String,

    #[serde(default = "default_center_lat")]
    pub center_lat: f64,

    #[serde(default = "default_center_lon")]
    pub center_lon: f64,

    #[serde(default = "default_zoom")]
    pub zoom: u32,

    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    #[serde(default = "default_attribution")]
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            notice: default_notice(),
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            zoom: default_zoom(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
        }
    }
}

fn default_title() -> String {
    "Oklahoma City Public Safety's UAS Locations".to_string()
}
fn default_notice() -> String {
    "This will only display up to 500 locations at once and no locations in the last 7 days"
        .to_string()
}
fn default_center_lat() -> f64 {
    35.4676
}
fn default_center_lon() -> f64 {
    -97.5164
}
fn default_zoom() -> u32 {
    11
}
fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}
fn default_attribution() -> String {
    "&copy; OpenStreetMap contributors".to_string()
}
