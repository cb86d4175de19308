//! Platform client configuration.
//!
//! Built once at process start from environment variables. Credentials are
//! held in [`Zeroizing`] buffers and redacted from `Debug` output.

use url::Url;
use zeroize::Zeroizing;

use adsync_core::CustomerId;

use crate::fetcher::DEFAULT_PAGE_SIZE;
use crate::hierarchy::LeafPolicy;

/// Google Ads REST client configuration.
#[derive(Clone)]
pub struct GoogleAdsConfig {
    /// Default: <https://googleads.googleapis.com>
    pub api_url: Url,
    /// API version path segment, e.g. `v17`.
    pub api_version: String,
    pub developer_token: Zeroizing<String>,
    /// OAuth2 access token. Refreshing it is the caller's job.
    pub access_token: Zeroizing<String>,
    /// Manager account the credentials act through, sent as `login-customer-id`.
    pub login_customer_id: Option<CustomerId>,
    /// Explicit hierarchy seeds. Empty means discover them.
    pub seed_customer_ids: Vec<CustomerId>,
    pub leaf_policy: LeafPolicy,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GoogleAdsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAdsConfig")
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("developer_token", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("login_customer_id", &self.login_customer_id)
            .field("seed_customer_ids", &self.seed_customer_ids)
            .field("leaf_policy", &self.leaf_policy)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GoogleAdsConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `GOOGLE_ADS_DEVELOPER_TOKEN` (required)
    /// - `GOOGLE_ADS_ACCESS_TOKEN` (required)
    /// - `GOOGLE_ADS_LOGIN_CUSTOMER_ID`
    /// - `GOOGLE_ADS_SEED_CUSTOMER_IDS` (comma-separated)
    /// - `GOOGLE_ADS_API_URL` (default: `https://googleads.googleapis.com`)
    /// - `GOOGLE_ADS_API_VERSION` (default: `v17`)
    /// - `GOOGLE_ADS_LEAF_POLICY` (`per-manager` | `unique`, default `per-manager`)
    /// - `GOOGLE_ADS_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let developer_token = required(&var, "GOOGLE_ADS_DEVELOPER_TOKEN")?;
        let access_token = required(&var, "GOOGLE_ADS_ACCESS_TOKEN")?;

        let login_customer_id = non_empty(&var, "GOOGLE_ADS_LOGIN_CUSTOMER_ID")
            .map(|raw| customer_id("GOOGLE_ADS_LOGIN_CUSTOMER_ID", &raw))
            .transpose()?;

        let seed_customer_ids = non_empty(&var, "GOOGLE_ADS_SEED_CUSTOMER_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| customer_id("GOOGLE_ADS_SEED_CUSTOMER_IDS", s))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        let leaf_policy = match non_empty(&var, "GOOGLE_ADS_LEAF_POLICY") {
            Some(raw) => raw.parse::<LeafPolicy>().map_err(|reason| ConfigError::InvalidValue {
                var: "GOOGLE_ADS_LEAF_POLICY".into(),
                reason,
            })?,
            None => LeafPolicy::default(),
        };

        Ok(Self {
            api_url: env_url(&var, "GOOGLE_ADS_API_URL", "https://googleads.googleapis.com")?,
            api_version: non_empty(&var, "GOOGLE_ADS_API_VERSION")
                .unwrap_or_else(|| "v17".to_string()),
            developer_token,
            access_token,
            login_customer_id,
            seed_customer_ids,
            leaf_policy,
            timeout_secs: parsed(&var, "GOOGLE_ADS_TIMEOUT_SECS", 30)?,
        })
    }
}

/// TikTok Business API client configuration.
#[derive(Clone)]
pub struct TiktokConfig {
    /// Default: <https://business-api.tiktok.com>
    pub api_url: Url,
    pub app_id: String,
    pub secret: Zeroizing<String>,
    pub access_token: Zeroizing<String>,
    pub page_size: u32,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for TiktokConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokConfig")
            .field("api_url", &self.api_url)
            .field("app_id", &self.app_id)
            .field("secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl TiktokConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TIKTOK_APP_ID`, `TIKTOK_SECRET`, `TIKTOK_ACCESS_TOKEN` (required)
    /// - `TIKTOK_API_URL` (default: `https://business-api.tiktok.com`)
    /// - `TIKTOK_PAGE_SIZE` (default: 1000)
    /// - `TIKTOK_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let page_size = parsed(&var, "TIKTOK_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidValue {
                var: "TIKTOK_PAGE_SIZE".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(Self {
            api_url: env_url(&var, "TIKTOK_API_URL", "https://business-api.tiktok.com")?,
            app_id: non_empty(&var, "TIKTOK_APP_ID").ok_or(ConfigError::Missing("TIKTOK_APP_ID"))?,
            secret: required(&var, "TIKTOK_SECRET")?,
            access_token: required(&var, "TIKTOK_ACCESS_TOKEN")?,
            page_size,
            timeout_secs: parsed(&var, "TIKTOK_TIMEOUT_SECS", 30)?,
        })
    }
}

fn non_empty(var: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    var(name).filter(|v| !v.trim().is_empty())
}

fn required(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Zeroizing<String>, ConfigError> {
    non_empty(var, name)
        .map(Zeroizing::new)
        .ok_or(ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match non_empty(var, name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn env_url(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> Result<Url, ConfigError> {
    let raw = non_empty(var, name).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))
}

fn customer_id(name: &str, raw: &str) -> Result<CustomerId, ConfigError> {
    CustomerId::new(raw).map_err(|e| ConfigError::InvalidValue {
        var: name.to_string(),
        reason: e.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
    #[error("{0} contains characters not allowed in an HTTP header")]
    InvalidHeader(&'static str),
}
