//! Concentration analysis and portfolio risk alerts.

use super::valuation::PortfolioValuation;
use crate::config::ConcentrationPolicy;
use crate::types::{RiskScore, Tier};
use serde::{Deserialize, Serialize};

/// Concentration figures for one holding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingConcentration {
    pub symbol: String,
    /// Share of total portfolio value (0.0-1.0)
    pub weight: f64,
    /// weight * |gain/loss %|
    pub risk_contribution: f64,
    pub level: Tier,
}

/// Which condition raised an alert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    HighRisk,
    Concentration,
    Diversification,
    RiskReturnImbalance,
}

impl AlertKind {
    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::HighRisk => "High Risk Alert",
            AlertKind::Concentration => "Concentration Risk",
            AlertKind::Diversification => "Diversification Alert",
            AlertKind::RiskReturnImbalance => "Risk-Return Imbalance",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Error,
    Warning,
    Info,
}

/// Advisory alert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
}

/// Per-holding concentration plus portfolio-level alerts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConcentrationReport {
    pub holdings: Vec<HoldingConcentration>,
    pub alerts: Vec<Alert>,
}

/// Grade a single holding's weight.
pub fn concentration_level(weight: f64, policy: &ConcentrationPolicy) -> Tier {
    if weight > policy.high_weight {
        Tier::High
    } else if weight > policy.medium_weight {
        Tier::Medium
    } else {
        Tier::Low
    }
}

/// Analyze concentration and raise alerts.
///
/// Alerts are evaluated in a fixed order (high risk, concentration,
/// diversification, risk-return) and any number may fire together.
pub fn analyze_concentration(
    valuation: &PortfolioValuation,
    risk: &RiskScore,
    sharpe_ratio: f64,
    policy: &ConcentrationPolicy,
) -> ConcentrationReport {
    let holdings = valuation
        .holdings
        .iter()
        .map(|h| HoldingConcentration {
            symbol: h.symbol.clone(),
            weight: h.weight,
            risk_contribution: h.weight * h.gain_loss_percent.abs(),
            level: concentration_level(h.weight, policy),
        })
        .collect();

    ConcentrationReport {
        holdings,
        alerts: risk_alerts(valuation, risk, sharpe_ratio, policy),
    }
}

/// Portfolio-level alerts, in evaluation order.
pub fn risk_alerts(
    valuation: &PortfolioValuation,
    risk: &RiskScore,
    sharpe_ratio: f64,
    policy: &ConcentrationPolicy,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if risk.score > policy.high_risk_score {
        alerts.push(Alert {
            kind: AlertKind::HighRisk,
            severity: AlertSeverity::Error,
            message: format!(
                "Your portfolio risk score is {}/100. Consider reducing exposure to volatile assets.",
                risk.score
            ),
        });
    }

    if valuation
        .holdings
        .iter()
        .any(|h| h.weight > policy.alert_weight)
    {
        alerts.push(Alert {
            kind: AlertKind::Concentration,
            severity: AlertSeverity::Warning,
            message: "You have significant exposure to a single stock. Consider diversifying your holdings.".to_string(),
        });
    }

    if valuation.holding_count() < policy.min_holdings {
        alerts.push(Alert {
            kind: AlertKind::Diversification,
            severity: AlertSeverity::Warning,
            message: format!(
                "Your portfolio contains fewer than {} holdings. Consider adding more stocks for better diversification.",
                policy.min_holdings
            ),
        });
    }

    let sharpe = if sharpe_ratio.is_finite() { sharpe_ratio } else { 0.0 };
    if sharpe < policy.min_sharpe {
        alerts.push(Alert {
            kind: AlertKind::RiskReturnImbalance,
            severity: AlertSeverity::Info,
            message: format!(
                "Your Sharpe ratio is below {}. Consider optimizing your risk-return profile.",
                policy.min_sharpe
            ),
        });
    }

    alerts
}
