//! Folio Core - Portfolio analytics and risk-scoring engine.
//!
//! This crate turns already-fetched holdings and price history into the
//! derived values a portfolio dashboard displays:
//!
//! - **Price series**: normalization of raw feed bars into validated series
//! - **Technical indicators**: SMA, RSI, support/resistance, price range
//! - **Portfolio valuation**: market value, gain/loss and weights per holding
//! - **Risk scoring**: composite 0-100 score, concentration alerts, recommendations
//! - **VaR simulation**: reproducible 30-day value path with loss thresholds
//!
//! Every computation is a pure function of its inputs.
//!
//! # Example
//!
//! ```rust
//! use folio_core::{score_risk, Holding, PortfolioMetrics, RiskLevel, RiskPolicy};
//!
//! let holding = Holding::new("aapl", "Apple Inc.", 10.0, 100.0, 120.0);
//! assert_eq!(holding.market_value(), 1200.0);
//! assert_eq!(holding.gain_loss_percent(), 20.0);
//!
//! let metrics = PortfolioMetrics {
//!     annual_volatility: 35.0,
//!     sharpe_ratio: 0.2,
//!     max_drawdown: -25.0,
//!     ..Default::default()
//! };
//! let score = score_risk(&metrics, 1, &RiskPolicy::default());
//! assert_eq!(score.score, 100);
//! assert_eq!(score.level, RiskLevel::High);
//! ```

pub mod analytics;
pub mod config;
pub mod indicators;
pub mod portfolio;
pub mod series;
pub mod simulation;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, Holding, HoldingValuation, PortfolioAnalytics, PortfolioMetrics, PriceBar,
    PriceSeries, RiskAssessment, RiskLevel, RiskScore, SimulatedPoint, Tier, VarResult,
};

// Re-export main functionality
pub use analytics::{PortfolioAnalyzer, PortfolioReport};
pub use config::{
    ConcentrationPolicy, EngineConfig, IndicatorSettings, MetricsSettings, RiskPolicy, VarPolicy,
};
pub use indicators::{
    price_range, rsi, rsi_series, sma, snapshot_all, support_resistance, IndicatorSnapshot,
    PriceRange, RsiSignal, SupportResistance, Trend, DEFAULT_RSI_PERIOD,
};
pub use portfolio::{
    analyze_concentration, assess_risk, beta, historical_var, portfolio_metrics, recommendations,
    score_risk, value_holdings, Alert, AlertKind, AlertSeverity, ConcentrationReport,
    HoldingConcentration, PortfolioValuation,
};
pub use series::{normalize_bars, normalize_feed};
pub use simulation::{simulate_var, simulate_var_seeded};

/// Error types for folio-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: String },

    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid period: {0}")]
    InvalidPeriod(usize),

    #[error("Price bars are not in strictly increasing time order")]
    UnorderedSeries,

    #[error("Invalid holding: {0}")]
    InvalidHolding(String),
}

/// Result type for folio-core operations.
pub type Result<T> = std::result::Result<T, Error>;
