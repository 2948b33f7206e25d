use config::{Config, ConfigError, File};
use serde::Deserialize;

/// Refresh cadence intervals.
///
/// - Fast: wallet-scoped user data (balances, allowances, pending rewards)
/// - Slow: market-wide public data (pool reserves, prices)
/// - Chain head: current block number
#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_fast_interval_ms")]
    pub fast_interval_ms: u64,
    #[serde(default = "default_slow_interval_ms")]
    pub slow_interval_ms: u64,
    #[serde(default = "default_chain_head_interval_ms")]
    pub chain_head_interval_ms: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            fast_interval_ms: default_fast_interval_ms(),
            slow_interval_ms: default_slow_interval_ms(),
            chain_head_interval_ms: default_chain_head_interval_ms(),
        }
    }
}

fn default_fast_interval_ms() -> u64 {
    10_000
}

fn default_slow_interval_ms() -> u64 {
    60_000
}

fn default_chain_head_interval_ms() -> u64 {
    6_000
}

/// Pivot pools and quote-token symbols used for cross-rate pricing.
///
/// The native pivot quotes the native gas token against the stablecoin; the
/// governance pivot quotes the governance token against the native token.
/// Both are looked up in the farms collection.
#[derive(Debug, Deserialize, Clone)]
pub struct PricingSettings {
    #[serde(default = "default_native_pivot_pid")]
    pub native_pivot_pid: u64,
    #[serde(default = "default_governance_pivot_pid")]
    pub governance_pivot_pid: u64,
    #[serde(default = "default_stable_symbol")]
    pub stable_symbol: String,
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    #[serde(default = "default_governance_symbol")]
    pub governance_symbol: String,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            native_pivot_pid: default_native_pivot_pid(),
            governance_pivot_pid: default_governance_pivot_pid(),
            stable_symbol: default_stable_symbol(),
            native_symbol: default_native_symbol(),
            governance_symbol: default_governance_symbol(),
        }
    }
}

fn default_native_pivot_pid() -> u64 {
    1
}

fn default_governance_pivot_pid() -> u64 {
    4
}

fn default_stable_symbol() -> String {
    "usdt".to_string()
}

fn default_native_symbol() -> String {
    "avax".to_string()
}

fn default_governance_symbol() -> String {
    "lyd".to_string()
}

/// File-backed data source used by the `farmsync` binary.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    /// Directory holding `farms.json`, `pools.json`, `maximus.json`,
    /// `prices.json`, `block.json` and `users/<account>/*.json`
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Wallet account to track; user data is not fetched when unset
    #[serde(default)]
    pub account: Option<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            account: None,
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

/// Root application configuration.
///
/// Loaded from `config.{yaml,toml,json}` at startup. Every section is
/// optional and falls back to its defaults.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub pricing: PricingSettings,
    #[serde(default)]
    pub source: SourceSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config").required(false))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
