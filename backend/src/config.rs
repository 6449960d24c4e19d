//! Planner configuration.
//!
//! Everything the engine needs (provider endpoints and credentials, distance
//! limits, speed bands, deadlines) lives in [`PlannerConfig`], which is passed
//! to the engine constructor. Only the binaries read the process environment.

use std::time::Duration;

use crate::duration::SpeedBand;
use crate::error::ConfigError;

const DEFAULT_ORS_URL: &str = "https://api.openrouteservice.org";
const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";
const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_CONTACT_EMAIL: &str = "dev@example.com";

/// Limits for point-to-point bike legs.
#[derive(Debug, Clone, PartialEq)]
pub struct BikeLimits {
    pub max_km_per_day: f64,
    /// Slack above the cap a routed leg may still be accepted with.
    pub tolerance_km: f64,
    pub min_leg_km: f64,
    pub max_attempts: usize,
    pub default_bearings_deg: [f64; 2],
    pub default_day_distances_km: [f64; 2],
}

impl Default for BikeLimits {
    fn default() -> Self {
        Self {
            max_km_per_day: 60.0,
            tolerance_km: 0.3,
            min_leg_km: 10.0,
            max_attempts: 8,
            default_bearings_deg: [80.0, 30.0],
            default_day_distances_km: [45.0, 45.0],
        }
    }
}

/// Limits for closed trek loops.
#[derive(Debug, Clone, PartialEq)]
pub struct TrekLimits {
    pub min_km: f64,
    pub max_km: f64,
    /// Slack on both sides of the band a routed loop may still be accepted with.
    pub band_slack_km: f64,
    pub max_attempts: usize,
    pub default_loop_km: f64,
}

impl Default for TrekLimits {
    fn default() -> Self {
        Self {
            min_km: 5.0,
            max_km: 15.0,
            band_slack_km: 0.2,
            max_attempts: 14,
            default_loop_km: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// OpenRouteService is skipped entirely when no key is configured.
    pub ors_api_key: Option<String>,
    pub ors_base_url: String,
    pub osrm_base_url: String,
    /// How many times OSRM appears in each chain; the extra passes absorb
    /// transient failures of the public demo server.
    pub osrm_passes: usize,
    pub call_timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            ors_api_key: None,
            ors_base_url: DEFAULT_ORS_URL.to_string(),
            osrm_base_url: DEFAULT_OSRM_URL.to_string(),
            osrm_passes: 2,
            call_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderSettings {
    pub base_url: String,
    /// Sent in the User-Agent, as Nominatim's usage policy requires.
    pub contact_email: String,
    pub timeout: Duration,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NOMINATIM_URL.to_string(),
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub bike: BikeLimits,
    pub trek: TrekLimits,
    pub bike_speed: SpeedBand,
    pub trek_speed: SpeedBand,
    pub providers: ProviderSettings,
    pub geocoder: GeocoderSettings,
    /// Upper bound for a whole plan request, geocoding included.
    pub request_deadline: Duration,
    /// Base pause after an attempt where every provider was unavailable.
    /// Zero disables pausing.
    pub attempt_backoff: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            bike: BikeLimits::default(),
            trek: TrekLimits::default(),
            bike_speed: SpeedBand::BIKE,
            trek_speed: SpeedBand::TREK,
            providers: ProviderSettings::default(),
            geocoder: GeocoderSettings::default(),
            request_deadline: Duration::from_secs(120),
            attempt_backoff: Duration::ZERO,
        }
    }
}

impl PlannerConfig {
    /// Build a configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from any variable source, falling back to the
    /// defaults for unset or empty variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        config.providers.ors_api_key = get("ORS_API_KEY");
        if let Some(url) = get("ORS_URL") {
            config.providers.ors_base_url = url;
        }
        if let Some(url) = get("OSRM_URL") {
            config.providers.osrm_base_url = url;
        }
        if let Some(passes) = get("OSRM_PASSES") {
            config.providers.osrm_passes = parse_var("OSRM_PASSES", passes)?;
        }
        if let Some(secs) = get("PROVIDER_TIMEOUT_SECS") {
            config.providers.call_timeout = Duration::from_secs(parse_var("PROVIDER_TIMEOUT_SECS", secs)?);
        }
        if let Some(url) = get("NOMINATIM_URL") {
            config.geocoder.base_url = url;
        }
        if let Some(email) = get("USER_AGENT_EMAIL") {
            config.geocoder.contact_email = email;
        }
        if let Some(secs) = get("PLAN_DEADLINE_SECS") {
            config.request_deadline = Duration::from_secs(parse_var("PLAN_DEADLINE_SECS", secs)?);
        }
        if let Some(ms) = get("ATTEMPT_BACKOFF_MS") {
            config.attempt_backoff = Duration::from_millis(parse_var("ATTEMPT_BACKOFF_MS", ms)?);
        }

        Ok(config)
    }

    pub fn with_request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = deadline;
        self
    }

    pub fn with_attempt_backoff(mut self, backoff: Duration) -> Self {
        self.attempt_backoff = backoff;
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidVar { name, value })
}
