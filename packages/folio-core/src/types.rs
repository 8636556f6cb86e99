//! Core data types for the analytics engine.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single OHLCV bar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Check the bar's numeric invariants.
    ///
    /// Returns a human-readable reason on failure so callers can attach
    /// their own context (e.g. the bar's index in a feed).
    pub fn check(&self) -> std::result::Result<(), String> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(format!("{} is not a finite number", name));
            }
        }

        if self.volume < 0.0 {
            return Err(format!("volume {} is negative", self.volume));
        }
        if self.high < self.low {
            return Err(format!("high {} is below low {}", self.high, self.low));
        }
        if self.high < self.open.max(self.close) {
            return Err(format!(
                "high {} is below open/close ({}, {})",
                self.high, self.open, self.close
            ));
        }
        if self.low > self.open.min(self.close) {
            return Err(format!(
                "low {} is above open/close ({}, {})",
                self.low, self.open, self.close
            ));
        }

        Ok(())
    }
}

/// A validated price series, ascending by timestamp with no duplicates.
///
/// Built fresh for each analysis and never mutated; use
/// [`crate::series::normalize_bars`] to build one from loosely typed feed data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(try_from = "Vec<PriceBar>", into = "Vec<PriceBar>")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from bars that are already in time order.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        for (index, bar) in bars.iter().enumerate() {
            bar.check()
                .map_err(|reason| Error::MalformedBar { index, reason })?;
        }
        if bars.windows(2).any(|w| w[0].timestamp >= w[1].timestamp) {
            return Err(Error::UnorderedSeries);
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// The trailing `n` bars (or all of them when the series is shorter).
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Close-to-close simple returns, paired with the timestamp of the later bar.
    pub fn daily_returns(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.bars
            .windows(2)
            .filter(|w| w[0].close != 0.0)
            .map(|w| (w[1].timestamp, (w[1].close - w[0].close) / w[0].close))
            .collect()
    }
}

impl TryFrom<Vec<PriceBar>> for PriceSeries {
    type Error = Error;

    fn try_from(bars: Vec<PriceBar>) -> Result<Self> {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<PriceBar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

fn uppercase<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.to_uppercase())
}

/// A holding in a portfolio as delivered by the portfolio service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    /// Stock ticker symbol (uppercase)
    #[serde(deserialize_with = "uppercase")]
    pub symbol: String,
    /// Company display name
    #[serde(default)]
    pub company_name: String,
    /// Number of shares owned
    pub shares: f64,
    /// Average purchase price per share
    pub average_price: f64,
    /// Last known market price per share
    #[serde(default)]
    pub current_price: f64,
}

impl Holding {
    /// Create a new holding. The symbol is upper-cased.
    pub fn new(
        symbol: &str,
        company_name: &str,
        shares: f64,
        average_price: f64,
        current_price: f64,
    ) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            company_name: company_name.to_string(),
            shares,
            average_price,
            current_price,
        }
    }

    /// Check `shares > 0` and non-negative, finite prices.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(Error::InvalidHolding("symbol is empty".to_string()));
        }
        if !(self.shares.is_finite() && self.shares > 0.0) {
            return Err(Error::InvalidHolding(format!(
                "{}: shares must be positive, got {}",
                self.symbol, self.shares
            )));
        }
        if !(self.average_price.is_finite() && self.average_price >= 0.0) {
            return Err(Error::InvalidHolding(format!(
                "{}: average price must be non-negative, got {}",
                self.symbol, self.average_price
            )));
        }
        if !(self.current_price.is_finite() && self.current_price >= 0.0) {
            return Err(Error::InvalidHolding(format!(
                "{}: current price must be non-negative, got {}",
                self.symbol, self.current_price
            )));
        }
        Ok(())
    }

    /// Total amount paid for the position.
    pub fn cost_basis(&self) -> f64 {
        self.shares * self.average_price
    }

    pub fn market_value(&self) -> f64 {
        self.shares * self.current_price
    }

    pub fn gain_loss(&self) -> f64 {
        self.market_value() - self.cost_basis()
    }

    /// Unrealized gain/loss percentage; 0 when the cost basis is 0.
    pub fn gain_loss_percent(&self) -> f64 {
        let cost = self.cost_basis();
        if cost > 0.0 {
            (self.gain_loss() / cost) * 100.0
        } else {
            0.0
        }
    }

    /// Copy of the holding repriced at `current_price`.
    pub fn with_price(&self, current_price: f64) -> Self {
        Self {
            current_price,
            ..self.clone()
        }
    }
}

/// Derived per-holding values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingValuation {
    pub symbol: String,
    pub company_name: String,
    pub shares: f64,
    pub average_price: f64,
    pub current_price: f64,
    pub market_value: f64,
    pub gain_loss: f64,
    pub gain_loss_percent: f64,
    /// Share of total portfolio value (0.0-1.0)
    pub weight: f64,
}

/// Three-step qualitative grade used for concentration and volatility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::Low => "Low",
            Tier::Medium => "Medium",
            Tier::High => "High",
        };
        f.write_str(label)
    }
}

/// Return and risk metrics derived from price history.
///
/// All values are percentages except the Sharpe ratio. Missing values
/// deserialize as 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PortfolioMetrics {
    /// Annualized mean return (%)
    pub annual_return: f64,
    /// Annualized volatility (%)
    pub annual_volatility: f64,
    /// Annual return over annual volatility
    pub sharpe_ratio: f64,
    /// Worst peak-to-trough decline (%, zero or negative)
    pub max_drawdown: f64,
    /// Sum of daily returns over the window (%)
    pub total_return: f64,
}

/// Qualitative risk assessment of the holding set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RiskAssessment {
    /// Grade of average per-holding volatility (absent without price history)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility_level: Option<Tier>,
    /// Holding-count diversification score (0-100)
    pub diversification_score: f64,
    /// Grade of the largest holding weight (absent for an empty portfolio)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concentration_risk: Option<Tier>,
}

/// Portfolio analytics as returned to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PortfolioAnalytics {
    pub total_value: f64,
    pub total_gain_loss: f64,
    pub metrics: PortfolioMetrics,
    pub risk_assessment: RiskAssessment,
    pub recommendations: Vec<String>,
}

/// Risk classification of a composite score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Status colour used by the dashboard for this level.
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "success",
            RiskLevel::Moderate => "warning",
            RiskLevel::High => "error",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        };
        f.write_str(label)
    }
}

/// Composite risk score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskScore {
    /// Score in [0, 100]
    pub score: u8,
    pub level: RiskLevel,
}

/// One point of a simulated value path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimulatedPoint {
    /// Day number, starting at 1
    pub day: u32,
    pub value: f64,
}

/// Result of a VaR simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VarResult {
    /// Value the path starts from
    pub baseline: f64,
    pub simulated_path: Vec<SimulatedPoint>,
    /// 1-day loss threshold at 95% confidence
    pub var95: f64,
    /// 30-day loss threshold at 99% confidence
    pub var99: f64,
    /// Reference line drawn under the path (baseline at 95%)
    pub threshold_line: f64,
}

/// API response wrapper for CLI output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(day: u32, open: f64, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_holding_new_uppercases_symbol() {
        let holding = Holding::new("aapl", "Apple Inc.", 10.0, 150.0, 150.0);
        assert_eq!(holding.symbol, "AAPL");
        assert_eq!(holding.company_name, "Apple Inc.");
    }

    #[test]
    fn test_holding_derived_values() {
        let holding = Holding::new("AAPL", "Apple Inc.", 10.0, 100.0, 120.0);

        assert_eq!(holding.market_value(), 1200.0);
        assert_eq!(holding.gain_loss(), 200.0);
        assert_eq!(holding.gain_loss_percent(), 20.0);
    }

    #[test]
    fn test_holding_zero_cost_basis() {
        let holding = Holding::new("GIFT", "", 5.0, 0.0, 40.0);

        assert_eq!(holding.gain_loss(), 200.0);
        assert_eq!(holding.gain_loss_percent(), 0.0);
    }

    #[test]
    fn test_holding_validate() {
        assert!(Holding::new("AAPL", "", 1.0, 10.0, 10.0).validate().is_ok());
        assert!(matches!(
            Holding::new("AAPL", "", 0.0, 10.0, 10.0).validate(),
            Err(Error::InvalidHolding(_))
        ));
        assert!(matches!(
            Holding::new("AAPL", "", 1.0, -1.0, 10.0).validate(),
            Err(Error::InvalidHolding(_))
        ));
        assert!(matches!(
            Holding::new("", "", 1.0, 1.0, 10.0).validate(),
            Err(Error::InvalidHolding(_))
        ));
    }

    #[test]
    fn test_holding_deserialize_defaults() {
        let holding: Holding =
            serde_json::from_str(r#"{"symbol":"MSFT","shares":3,"average_price":300}"#).unwrap();
        assert_eq!(holding.company_name, "");
        assert_eq!(holding.current_price, 0.0);
    }

    #[test]
    fn test_holding_deserialize_uppercases_symbol() {
        let holding: Holding =
            serde_json::from_str(r#"{"symbol":"msft","shares":3,"average_price":300}"#).unwrap();
        assert_eq!(holding.symbol, "MSFT");
    }

    #[test]
    fn test_bar_check() {
        assert!(bar(1, 10.0, 12.0, 9.0, 11.0).check().is_ok());
        assert!(bar(1, 10.0, 9.0, 12.0, 11.0).check().is_err());
        assert!(bar(1, 13.0, 12.0, 9.0, 11.0).check().is_err());
        assert!(bar(1, 10.0, 12.0, 9.0, f64::NAN).check().is_err());
    }

    #[test]
    fn test_series_rejects_unordered() {
        let bars = vec![bar(2, 10.0, 11.0, 9.0, 10.0), bar(1, 10.0, 11.0, 9.0, 10.0)];
        assert!(matches!(PriceSeries::new(bars), Err(Error::UnorderedSeries)));
    }

    #[test]
    fn test_series_tail_and_returns() {
        let series = PriceSeries::new(vec![
            bar(1, 100.0, 101.0, 99.0, 100.0),
            bar(2, 100.0, 111.0, 99.0, 110.0),
            bar(3, 110.0, 111.0, 98.0, 99.0),
        ])
        .unwrap();

        assert_eq!(series.tail(2).len(), 2);
        assert_eq!(series.tail(10).len(), 3);

        let returns: Vec<f64> = series.daily_returns().into_iter().map(|(_, r)| r).collect();
        assert!((returns[0] - 0.10).abs() < 1e-12);
        assert!((returns[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_series_deserialize_validates() {
        let json = r#"[{"timestamp":"2024-01-01T00:00:00Z","open":1,"high":0.5,"low":1,"close":1,"volume":0}]"#;
        assert!(serde_json::from_str::<PriceSeries>(json).is_err());
    }

    #[test]
    fn test_risk_level_color() {
        assert_eq!(RiskLevel::Low.color(), "success");
        assert_eq!(RiskLevel::Moderate.color(), "warning");
        assert_eq!(RiskLevel::High.color(), "error");
        assert_eq!(RiskLevel::Moderate.to_string(), "Moderate");
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
    }
}
