use serde::Deserialize;
use std::env;

/// Marketplace policy knobs. Every bound the catalog and booking engine
/// enforce comes from here rather than being hard-coded at the call site.
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Seat capacity bounds for a new ride.
    #[serde(default = "default_min_seats")]
    pub min_seats: i32,
    #[serde(default = "default_max_seats")]
    pub max_seats: i32,

    /// Listed price bounds, in minor currency units (FCFA).
    #[serde(default = "default_min_price")]
    pub min_price_per_seat: i64,
    #[serde(default = "default_max_price")]
    pub max_price_per_seat: i64,

    /// A ride must depart at least this far in the future at creation.
    #[serde(default = "default_lead_time")]
    pub min_lead_time_minutes: i64,

    /// When set, bookings are created `CONFIRMED`; otherwise they start
    /// `PENDING` and wait for driver acceptance.
    #[serde(default)]
    pub auto_confirm: bool,

    /// When set, a passenger may hold several open bookings on one ride
    /// (top-ups). Default is one open booking per passenger per ride.
    #[serde(default)]
    pub allow_repeat_bookings: bool,

    /// Pending bookings older than this auto-cancel to release their seats.
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_seconds: i64,

    /// Cadence of the background expiry sweep.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Bounded wait for a ride's serialization cell before surfacing
    /// `StorageContention`.
    #[serde(default = "default_lock_wait")]
    pub lock_wait_ms: u64,
    #[serde(default = "default_lock_attempts")]
    pub lock_attempts: u32,
}

fn default_min_seats() -> i32 {
    1
}
fn default_max_seats() -> i32 {
    8
}
fn default_min_price() -> i64 {
    500
}
fn default_max_price() -> i64 {
    50_000
}
fn default_lead_time() -> i64 {
    60
}
fn default_pending_ttl() -> i64 {
    1800
}
fn default_sweep_interval() -> u64 {
    60
}
fn default_lock_wait() -> u64 {
    250
}
fn default_lock_attempts() -> u32 {
    3
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            min_seats: default_min_seats(),
            max_seats: default_max_seats(),
            min_price_per_seat: default_min_price(),
            max_price_per_seat: default_max_price(),
            min_lead_time_minutes: default_lead_time(),
            auto_confirm: false,
            allow_repeat_bookings: false,
            pending_ttl_seconds: default_pending_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
            lock_wait_ms: default_lock_wait(),
            lock_attempts: default_lock_attempts(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub business_rules: BusinessRules,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            // Environment-specific file, e.g. config/production
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `COVOIT_BUSINESS_RULES__AUTO_CONFIRM=true`
            .add_source(config::Environment::with_prefix("COVOIT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
