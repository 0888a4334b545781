use std::env;
use std::time::Duration;

use kirana_shared::GeoPoint;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub leads: LeadRules,
    #[serde(default)]
    pub nearby: NearbyRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    10
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IdentityConfig {
    /// Previously stored requester/vendor phone. Absent means the
    /// documented placeholder identity applies.
    pub stored_phone: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LeadRules {
    #[serde(default = "default_offer_window_seconds")]
    pub offer_window_seconds: u32,
}

fn default_offer_window_seconds() -> u32 {
    60
}

impl Default for LeadRules {
    fn default() -> Self {
        Self {
            offer_window_seconds: default_offer_window_seconds(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NearbyRules {
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
    pub default_lat: Option<f64>,
    pub default_lon: Option<f64>,
    /// Product term the agent keeps a proximity watch on, if any.
    pub watch_term: Option<String>,
}

fn default_poll_interval_seconds() -> u64 {
    8
}

impl Default for NearbyRules {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
            default_lat: None,
            default_lon: None,
            watch_term: None,
        }
    }
}

impl NearbyRules {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Configured fallback origin, or the built-in default coordinate.
    pub fn default_origin(&self) -> GeoPoint {
        match (self.default_lat, self.default_lon) {
            (Some(lat), Some(lon)) => GeoPoint { lat, lon },
            _ => GeoPoint::DEFAULT,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file that stays out of git
            .add_source(config::File::with_name("config/local").required(false))
            // Environment overrides, e.g. KIRANA__GATEWAY__BASE_URL
            .add_source(config::Environment::with_prefix("KIRANA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
