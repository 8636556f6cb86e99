//! Portfolio analytics module.
//!
//! Provides holdings valuation, return metrics, risk scoring, concentration
//! alerts and recommendations.

mod assessment;
mod concentration;
mod metrics;
mod scoring;
mod valuation;

pub use assessment::{assess_risk, recommendations};
pub use concentration::{
    analyze_concentration, concentration_level, risk_alerts, Alert, AlertKind, AlertSeverity,
    ConcentrationReport, HoldingConcentration,
};
pub use metrics::{
    annualized_volatility, beta, historical_var, max_drawdown, metrics_from_returns,
    portfolio_metrics,
};
pub use scoring::{classify, score_risk};
pub use valuation::{value_holdings, PortfolioValuation};
