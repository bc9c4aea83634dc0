use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Commission applied to buys and sells when the caller does not supply a fee.
    pub default_fee_rate: f64,
    /// Quantity at or below which a position counts as fully closed.
    pub close_epsilon: f64,
    /// Starting cash balance for a freshly provisioned wallet.
    pub initial_balance: f64,
    pub currency: String,
    /// Upper bound on a single price-source fetch.
    pub price_timeout: Duration,
    /// How long a fetched price stays fresh in the cache.
    pub price_cache_ttl: Duration,
    /// Cadence of the background refresh-and-snapshot pass.
    pub snapshot_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_fee_rate: 0.005,
            close_epsilon: 1e-9,
            initial_balance: 100_000.0,
            currency: "MAD".to_string(),
            price_timeout: Duration::from_secs(10),
            price_cache_ttl: Duration::from_secs(5 * 60),
            snapshot_interval: Duration::from_secs(15 * 60),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_fee_rate: env_parse("PAPERFOLIO_FEE_RATE", defaults.default_fee_rate),
            close_epsilon: env_parse("PAPERFOLIO_CLOSE_EPSILON", defaults.close_epsilon),
            initial_balance: env_parse("PAPERFOLIO_INITIAL_BALANCE", defaults.initial_balance),
            currency: std::env::var("PAPERFOLIO_CURRENCY").unwrap_or(defaults.currency),
            price_timeout: Duration::from_secs(env_parse(
                "PAPERFOLIO_PRICE_TIMEOUT_SECS",
                defaults.price_timeout.as_secs(),
            )),
            price_cache_ttl: Duration::from_secs(env_parse(
                "PAPERFOLIO_PRICE_CACHE_TTL_SECS",
                defaults.price_cache_ttl.as_secs(),
            )),
            snapshot_interval: Duration::from_secs(env_parse(
                "PAPERFOLIO_SNAPSHOT_INTERVAL_SECS",
                defaults.snapshot_interval.as_secs(),
            )),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..1.0).contains(&self.default_fee_rate) {
            return Err("PAPERFOLIO_FEE_RATE must be in [0, 1)".to_string());
        }
        if self.close_epsilon < 0.0 || !self.close_epsilon.is_finite() {
            return Err("PAPERFOLIO_CLOSE_EPSILON must be finite and >= 0".to_string());
        }
        if self.initial_balance < 0.0 || !self.initial_balance.is_finite() {
            return Err("PAPERFOLIO_INITIAL_BALANCE must be finite and >= 0".to_string());
        }
        if self.currency.trim().is_empty() {
            return Err("PAPERFOLIO_CURRENCY must not be empty".to_string());
        }
        if self.price_timeout.is_zero() {
            return Err("PAPERFOLIO_PRICE_TIMEOUT_SECS must be > 0".to_string());
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
