//! Engine configuration.
//!
//! Every threshold the engine applies lives here, grouped by the component
//! that reads it. The defaults reproduce the dashboard's behavior; a TOML file
//! only needs to name the keys it changes.
//!
//! ```toml
//! [risk]
//! high_threshold = 65
//!
//! [simulation]
//! fallback_baseline = 25000.0
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "FOLIO_CONFIG";

/// Complete engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub risk: RiskPolicy,
    pub concentration: ConcentrationPolicy,
    pub simulation: VarPolicy,
    pub indicators: IndicatorSettings,
    pub metrics: MetricsSettings,
}

impl EngineConfig {
    /// Get the default configuration file path.
    ///
    /// Default path: `<config dir>/folio/config.toml`
    /// Can be overridden with the `FOLIO_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("folio/config.toml"))
            .unwrap_or_else(|| PathBuf::from("folio.toml"))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path`, or return the defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(
                "No configuration at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load from the default path, falling back to defaults.
    pub fn load_default() -> Result<Self> {
        Self::load_or_default(&Self::default_path())
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Adjustments and buckets for the composite risk score.
///
/// The score starts at `base_score`, receives one adjustment per factor and
/// is clamped to [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskPolicy {
    pub base_score: i32,

    /// Annual volatility (%) above which the high adjustment applies
    pub volatility_high: f64,
    /// Annual volatility (%) above which the elevated adjustment applies
    pub volatility_elevated: f64,
    /// Annual volatility (%) below which the calm adjustment applies
    pub volatility_calm: f64,
    pub volatility_high_adjustment: i32,
    pub volatility_elevated_adjustment: i32,
    pub volatility_calm_adjustment: i32,

    pub sharpe_poor: f64,
    pub sharpe_strong: f64,
    pub sharpe_poor_adjustment: i32,
    pub sharpe_strong_adjustment: i32,

    /// Max drawdown (%) below which the severe adjustment applies
    pub drawdown_severe: f64,
    /// Max drawdown (%) below which the moderate adjustment applies
    pub drawdown_moderate: f64,
    pub drawdown_severe_adjustment: i32,
    pub drawdown_moderate_adjustment: i32,

    /// Holding counts below this are under-diversified
    pub few_holdings: usize,
    /// Holding counts above this are well diversified
    pub many_holdings: usize,
    pub few_holdings_adjustment: i32,
    pub many_holdings_adjustment: i32,

    /// Scores at or above this are Moderate
    pub moderate_threshold: u8,
    /// Scores at or above this are High
    pub high_threshold: u8,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            base_score: 50,
            volatility_high: 30.0,
            volatility_elevated: 20.0,
            volatility_calm: 10.0,
            volatility_high_adjustment: 20,
            volatility_elevated_adjustment: 10,
            volatility_calm_adjustment: -10,
            sharpe_poor: 0.5,
            sharpe_strong: 1.5,
            sharpe_poor_adjustment: 15,
            sharpe_strong_adjustment: -15,
            drawdown_severe: -20.0,
            drawdown_moderate: -10.0,
            drawdown_severe_adjustment: 25,
            drawdown_moderate_adjustment: 10,
            few_holdings: 5,
            many_holdings: 10,
            few_holdings_adjustment: 20,
            many_holdings_adjustment: -10,
            moderate_threshold: 30,
            high_threshold: 60,
        }
    }
}

/// Concentration grading, alert triggers and recommendation rules.
///
/// Weights are fractions of total portfolio value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConcentrationPolicy {
    /// Per-holding weight above which concentration is High
    pub high_weight: f64,
    /// Per-holding weight above which concentration is Medium
    pub medium_weight: f64,
    /// Any weight above this raises a concentration alert
    pub alert_weight: f64,
    /// Risk scores above this raise a high-risk alert
    pub high_risk_score: u8,
    /// Holding counts below this raise a diversification alert
    pub min_holdings: usize,
    /// Sharpe ratios below this raise a risk-return alert
    pub min_sharpe: f64,
    /// Largest weight above which the portfolio-level grade is High
    pub assessment_high_weight: f64,
    /// Largest weight above which the portfolio-level grade is Medium
    pub assessment_medium_weight: f64,
    /// Holding count that earns a full diversification score
    pub target_holdings: usize,
    /// Share of losing holdings above which a review is recommended
    pub losing_share: f64,
}

impl Default for ConcentrationPolicy {
    fn default() -> Self {
        Self {
            high_weight: 0.25,
            medium_weight: 0.15,
            alert_weight: 0.30,
            high_risk_score: 70,
            min_holdings: 5,
            min_sharpe: 0.5,
            assessment_high_weight: 0.30,
            assessment_medium_weight: 0.20,
            target_holdings: 10,
            losing_share: 0.6,
        }
    }
}

/// VaR simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VarPolicy {
    /// Number of simulated days
    pub horizon_days: u32,
    /// Daily returns are drawn uniformly from [-max, max)
    pub max_daily_return: f64,
    /// var95 as a fraction of portfolio value
    pub var95_fraction: f64,
    /// var99 as a fraction of portfolio value
    pub var99_fraction: f64,
    /// Reference line as a fraction of the baseline
    pub threshold_fraction: f64,
    /// Baseline used for the path when the portfolio has no value
    pub fallback_baseline: f64,
}

impl Default for VarPolicy {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            max_daily_return: 0.02,
            var95_fraction: 0.025,
            var99_fraction: 0.15,
            threshold_fraction: 0.95,
            fallback_baseline: 10_000.0,
        }
    }
}

/// Windows and thresholds for per-symbol indicators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndicatorSettings {
    pub sma_short: usize,
    pub sma_long: usize,
    pub rsi_period: usize,
    pub overbought: f64,
    pub oversold: f64,
    /// Trailing window for support/resistance
    pub level_window: usize,
    /// Trailing window for the price-range summary
    pub range_window: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_long: 50,
            rsi_period: crate::indicators::DEFAULT_RSI_PERIOD,
            overbought: 70.0,
            oversold: 30.0,
            level_window: 20,
            range_window: 30,
        }
    }
}

/// Return-metric windows and volatility grading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsSettings {
    /// Periods per year used to annualize daily figures
    pub trading_days: usize,
    /// Bars of history used for portfolio return metrics
    pub lookback_bars: usize,
    /// Bars of history used for per-holding volatility grading
    pub volatility_lookback: usize,
    /// Average annual volatility (%) above which the grade is High
    pub volatility_high: f64,
    /// Average annual volatility (%) above which the grade is Medium
    pub volatility_medium: f64,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            trading_days: 252,
            lookback_bars: 252,
            volatility_lookback: 30,
            volatility_high: 30.0,
            volatility_medium: 20.0,
        }
    }
}
