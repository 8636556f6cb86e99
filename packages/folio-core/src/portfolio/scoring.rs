//! Composite portfolio risk score.

use crate::config::RiskPolicy;
use crate::types::{PortfolioMetrics, RiskLevel, RiskScore};

/// Calculate the composite risk score.
///
/// Starts at `policy.base_score` and applies one independent adjustment for
/// each of volatility, Sharpe ratio, max drawdown and holding count, then
/// clamps to [0, 100]. Non-finite metrics count as 0.
pub fn score_risk(
    metrics: &PortfolioMetrics,
    holding_count: usize,
    policy: &RiskPolicy,
) -> RiskScore {
    // Widened so configured values at the i32 limits cannot overflow
    let raw = i64::from(policy.base_score)
        + i64::from(volatility_adjustment(finite_or_zero(metrics.annual_volatility), policy))
        + i64::from(sharpe_adjustment(finite_or_zero(metrics.sharpe_ratio), policy))
        + i64::from(drawdown_adjustment(finite_or_zero(metrics.max_drawdown), policy))
        + i64::from(holdings_adjustment(holding_count, policy));

    let score = raw.clamp(0, 100) as u8;
    RiskScore {
        score,
        level: classify(score, policy),
    }
}

/// Map a score onto its risk level.
pub fn classify(score: u8, policy: &RiskPolicy) -> RiskLevel {
    if score < policy.moderate_threshold {
        RiskLevel::Low
    } else if score < policy.high_threshold {
        RiskLevel::Moderate
    } else {
        RiskLevel::High
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn volatility_adjustment(volatility: f64, policy: &RiskPolicy) -> i32 {
    if volatility > policy.volatility_high {
        policy.volatility_high_adjustment
    } else if volatility > policy.volatility_elevated {
        policy.volatility_elevated_adjustment
    } else if volatility < policy.volatility_calm {
        policy.volatility_calm_adjustment
    } else {
        0
    }
}

fn sharpe_adjustment(sharpe: f64, policy: &RiskPolicy) -> i32 {
    if sharpe < policy.sharpe_poor {
        policy.sharpe_poor_adjustment
    } else if sharpe > policy.sharpe_strong {
        policy.sharpe_strong_adjustment
    } else {
        0
    }
}

fn drawdown_adjustment(drawdown: f64, policy: &RiskPolicy) -> i32 {
    if drawdown < policy.drawdown_severe {
        policy.drawdown_severe_adjustment
    } else if drawdown < policy.drawdown_moderate {
        policy.drawdown_moderate_adjustment
    } else {
        0
    }
}

fn holdings_adjustment(count: usize, policy: &RiskPolicy) -> i32 {
    if count < policy.few_holdings {
        policy.few_holdings_adjustment
    } else if count > policy.many_holdings {
        policy.many_holdings_adjustment
    } else {
        0
    }
}
