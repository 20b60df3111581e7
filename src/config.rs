use crate::stations::error::CacheError;
use crate::utils::get_cache_dir;
use bon::Builder;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str =
    "https://dataset.api.hub.geosphere.at/v1/station/current/tawes-v1-10min";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
/// The TAWES dataset is published every ten minutes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_USER_AGENT: &str = concat!("zamg-rs/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every request a [`Zamg`](crate::Zamg) client makes.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use zamg::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .request_timeout(Duration::from_secs(3))
///     .verify_tls(false)
///     .build();
/// assert_eq!(config.request_timeout, Duration::from_secs(3));
/// assert!(config.cache_dir.is_none());
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ClientConfig {
    /// Observation endpoint. The station metadata lives at `<base_url>/metadata`.
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
    /// Minimum age of a snapshot, measured from its server timestamp, before it is re-fetched.
    #[builder(default = DEFAULT_REFRESH_INTERVAL)]
    pub refresh_interval: Duration,
    #[builder(into, default = DEFAULT_USER_AGENT.to_string())]
    pub user_agent: String,
    #[builder(default = true)]
    pub verify_tls: bool,
    /// Directory for the persisted station catalog. `None` keeps the catalog in memory only.
    #[builder(into)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientConfig {
    /// Persists the station catalog in the platform cache directory
    /// (e.g. `~/.cache/zamg_rs_cache` on Linux).
    pub fn with_default_cache_dir(mut self) -> Result<Self, CacheError> {
        self.cache_dir = Some(get_cache_dir().map_err(CacheError::CacheDirResolution)?);
        Ok(self)
    }

    pub fn metadata_url(&self) -> String {
        format!("{}/metadata", self.base_url.trim_end_matches('/'))
    }

    pub fn observation_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }
}
