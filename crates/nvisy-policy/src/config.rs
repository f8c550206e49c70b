//! Policy service configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{FilePolicySource, PolicyError, PolicyResult, PolicySource, RemotePolicySource};

/// Default policy service URL.
pub const DEFAULT_CLOUD_URL: &str = "https://api.daxa.ai";

/// Default interval between policy refreshes: 30 seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// Default timeout for policy requests: 20 seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Where policies are loaded from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PolicySourceKind {
    /// `policy-<app>.json` on local disk.
    #[default]
    File,
    /// The remote policy endpoint.
    Cloud,
}

/// Configuration for policy loading and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct PolicyServiceConfig {
    /// Application name policies are scoped to
    #[cfg_attr(feature = "config", arg(long = "app-name", env = "PEBBLO_APP_NAME"))]
    pub app_name: String,

    /// Where policies are loaded from
    #[cfg_attr(
        feature = "config",
        arg(long = "policy-source", env = "PEBBLO_POLICY_SOURCE", value_enum, default_value = "file")
    )]
    #[serde(default)]
    pub policy_source: PolicySourceKind,

    /// Directory containing policy files
    #[cfg_attr(
        feature = "config",
        arg(long = "policy-dir", env = "PEBBLO_POLICY_DIR", default_value = ".")
    )]
    #[serde(default = "default_policy_dir")]
    pub policy_dir: PathBuf,

    /// Base URL of the policy service
    #[cfg_attr(
        feature = "config",
        arg(long = "cloud-url", env = "PEBBLO_CLOUD_URL", default_value = DEFAULT_CLOUD_URL)
    )]
    #[serde(default = "default_cloud_url")]
    pub cloud_url: String,

    /// API key for the policy service
    #[cfg_attr(feature = "config", arg(long = "api-key", env = "PEBBLO_API_KEY"))]
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Seconds between policy refreshes
    #[cfg_attr(
        feature = "config",
        arg(long = "policy-refresh-interval", env = "PEBBLO_POLICY_REFRESH_INTERVAL", default_value_t = DEFAULT_REFRESH_INTERVAL_SECS)
    )]
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Policy request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "policy-timeout", env = "PEBBLO_POLICY_TIMEOUT", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)
    )]
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_policy_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_cloud_url() -> String {
    DEFAULT_CLOUD_URL.to_owned()
}

fn default_refresh_interval_secs() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl PolicyServiceConfig {
    /// Creates a file-backed configuration for `app_name`.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            policy_source: PolicySourceKind::File,
            policy_dir: default_policy_dir(),
            cloud_url: default_cloud_url(),
            api_key: None,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Switches to the remote policy endpoint.
    #[must_use]
    pub fn with_cloud(mut self, cloud_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.policy_source = PolicySourceKind::Cloud;
        self.cloud_url = cloud_url.into();
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the policy directory.
    #[must_use]
    pub fn with_policy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.policy_dir = dir.into();
        self
    }

    /// Returns the refresh interval.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Returns the request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> PolicyResult<()> {
        if self.app_name.trim().is_empty() {
            return Err(PolicyError::invalid_config("app name must not be empty"));
        }
        FilePolicySource::check_app_name(&self.app_name)?;

        if self.refresh_interval_secs == 0 {
            return Err(PolicyError::invalid_config(
                "policy refresh interval must be at least one second",
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(PolicyError::invalid_config(
                "policy timeout must be at least one second",
            ));
        }

        if self.policy_source == PolicySourceKind::Cloud
            && self.api_key.as_deref().is_none_or(str::is_empty)
        {
            return Err(PolicyError::invalid_config(
                "cloud policy source requires an API key",
            ));
        }

        Ok(())
    }

    /// Builds the configured policy source.
    pub fn build_source(&self) -> PolicyResult<Arc<dyn PolicySource>> {
        self.validate()?;

        let source: Arc<dyn PolicySource> = match self.policy_source {
            PolicySourceKind::File => Arc::new(FilePolicySource::new(&self.policy_dir)),
            PolicySourceKind::Cloud => Arc::new(RemotePolicySource::new(
                &self.cloud_url,
                self.api_key.clone(),
                self.http_timeout(),
            )?),
        };

        Ok(source)
    }
}
