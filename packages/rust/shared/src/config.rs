//! Application configuration for unifind.
//!
//! User config lives at `~/.unifind/unifind.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UnifindError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "unifind.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".unifind";

// ---------------------------------------------------------------------------
// Config structs (matching unifind.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Google Maps Platform settings.
    #[serde(default)]
    pub google: GoogleConfig,

    /// Institution discovery settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Distance matrix settings.
    #[serde(default)]
    pub distance: DistanceConfig,

    /// Filtering and ranking settings.
    #[serde(default)]
    pub ranking: RankingConfig,
}

/// `[google]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the Maps web services, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GOOGLE_MAPS_API_KEY".into()
}
fn default_base_url() -> String {
    "https://maps.googleapis.com/maps/api".into()
}
fn default_timeout_secs() -> u64 {
    10
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search radius around the property, in meters.
    #[serde(default = "default_radius")]
    pub radius_m: u32,

    /// Place type used by the type-based strategy.
    #[serde(default = "default_place_type")]
    pub place_type: String,

    /// Keywords OR-ed together by the keyword fallback strategy.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Maximum nearby-search fetches per strategy (first page included).
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Wait before following a next-page token, in ms.
    #[serde(default = "default_page_delay")]
    pub page_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_m: default_radius(),
            place_type: default_place_type(),
            keywords: default_keywords(),
            max_pages: default_max_pages(),
            page_delay_ms: default_page_delay(),
        }
    }
}

fn default_radius() -> u32 {
    30_000
}
fn default_place_type() -> String {
    "university".into()
}
fn default_keywords() -> Vec<String> {
    vec!["university".into(), "college".into(), "institute".into()]
}
fn default_max_pages() -> u32 {
    3
}
fn default_page_delay() -> u64 {
    2_000
}

/// `[distance]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceConfig {
    /// Maximum destinations per distance-matrix call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    25
}

/// `[ranking]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Minimum review counts, tried in order until something survives.
    #[serde(default = "default_review_thresholds")]
    pub review_thresholds: Vec<u32>,

    /// Default number of institutions returned.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Driving-time heuristic.
    #[serde(default = "default_minutes_per_km")]
    pub minutes_per_km: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            review_thresholds: default_review_thresholds(),
            limit: default_limit(),
            minutes_per_km: default_minutes_per_km(),
        }
    }
}

fn default_review_thresholds() -> Vec<u32> {
    vec![50, 25, 10]
}
fn default_limit() -> usize {
    5
}
fn default_minutes_per_km() -> f64 {
    1.5
}

// ---------------------------------------------------------------------------
// Proximity config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ProximityConfig {
    /// Search radius in meters.
    pub radius_m: u32,
    /// Place type for the type-based strategy.
    pub place_type: String,
    /// Keywords for the keyword fallback strategy.
    pub keywords: Vec<String>,
    /// Fetch cap per strategy.
    pub max_pages: u32,
    /// Delay before each next-page fetch.
    pub page_delay: Duration,
    /// Destinations per distance-matrix call.
    pub batch_size: usize,
    /// Review-count ladder.
    pub review_thresholds: Vec<u32>,
    /// Default result limit.
    pub limit: usize,
    /// Driving minutes per kilometer.
    pub minutes_per_km: f64,
    /// Timeout applied to every outbound call.
    pub call_timeout: Duration,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ProximityConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            radius_m: config.search.radius_m,
            place_type: config.search.place_type.clone(),
            keywords: config.search.keywords.clone(),
            max_pages: config.search.max_pages,
            page_delay: Duration::from_millis(config.search.page_delay_ms),
            batch_size: config.distance.batch_size,
            review_thresholds: config.ranking.review_thresholds.clone(),
            limit: config.ranking.limit,
            minutes_per_km: config.ranking.minutes_per_km,
            call_timeout: Duration::from_secs(config.google.timeout_secs),
        }
    }
}

impl ProximityConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(UnifindError::validation("distance.batch_size must be at least 1"));
        }
        if self.max_pages == 0 {
            return Err(UnifindError::validation("search.max_pages must be at least 1"));
        }
        if self.review_thresholds.is_empty() {
            return Err(UnifindError::validation(
                "ranking.review_thresholds must not be empty",
            ));
        }
        if self.minutes_per_km.is_nan() || self.minutes_per_km <= 0.0 {
            return Err(UnifindError::validation(format!(
                "ranking.minutes_per_km must be positive, got {}",
                self.minutes_per_km
            )));
        }
        if self.call_timeout.is_zero() {
            return Err(UnifindError::validation("google.timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.unifind/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| UnifindError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.unifind/unifind.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| UnifindError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| UnifindError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| UnifindError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| UnifindError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| UnifindError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the Maps API key from the env var named in the config.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.google.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(UnifindError::config(format!(
            "Google Maps API key not found. Set the {var_name} environment variable.\n\
             Keys are managed at https://console.cloud.google.com/google/maps-apis/credentials"
        ))),
    }
}
