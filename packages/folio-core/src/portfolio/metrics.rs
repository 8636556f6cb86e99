//! Return and risk metrics from price history.
//!
//! Daily close-to-close returns of each holding are aligned on timestamp and
//! combined by portfolio weight; the resulting return stream is annualized.

use super::valuation::PortfolioValuation;
use crate::config::MetricsSettings;
use crate::types::{PortfolioMetrics, PriceSeries};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Volatility below this is treated as zero when dividing.
const MIN_VOLATILITY: f64 = 1e-12;

/// Calculate portfolio return metrics.
///
/// Holdings without history (or with zero weight) are left out and the
/// remaining weights renormalized. Returns all-zero metrics when fewer than
/// two aligned returns are available.
pub fn portfolio_metrics(
    valuation: &PortfolioValuation,
    histories: &BTreeMap<String, PriceSeries>,
    settings: &MetricsSettings,
) -> PortfolioMetrics {
    let mut streams: Vec<(f64, BTreeMap<DateTime<Utc>, f64>)> = Vec::new();

    for holding in &valuation.holdings {
        let Some(series) = histories.get(&holding.symbol) else {
            tracing::warn!(
                "No price history for {}, excluded from return metrics",
                holding.symbol
            );
            continue;
        };
        if holding.weight <= 0.0 {
            continue;
        }

        // `lookback_bars` bars give one fewer return
        let returns: BTreeMap<DateTime<Utc>, f64> = series
            .daily_returns()
            .into_iter()
            .rev()
            .take(settings.lookback_bars.saturating_sub(1))
            .collect();
        if returns.is_empty() {
            tracing::warn!(
                "Not enough history for {}, excluded from return metrics",
                holding.symbol
            );
            continue;
        }
        streams.push((holding.weight, returns));
    }

    let weight_sum: f64 = streams.iter().map(|(w, _)| w).sum();
    if weight_sum <= 0.0 {
        return PortfolioMetrics::default();
    }

    // Only dates every remaining holding has a return for
    let Some((_, first)) = streams.first() else {
        return PortfolioMetrics::default();
    };
    let portfolio_returns: Vec<f64> = first
        .keys()
        .filter(|ts| streams.iter().all(|(_, r)| r.contains_key(*ts)))
        .map(|ts| {
            streams
                .iter()
                .map(|(w, r)| (w / weight_sum) * r[ts])
                .sum::<f64>()
        })
        .collect();

    if portfolio_returns.len() < 2 {
        tracing::debug!(
            "Only {} aligned returns, skipping return metrics",
            portfolio_returns.len()
        );
        return PortfolioMetrics::default();
    }

    metrics_from_returns(&portfolio_returns, settings.trading_days)
}

/// Annualize a daily return stream into [`PortfolioMetrics`].
///
/// Percent values and the Sharpe ratio are rounded to two decimals.
pub fn metrics_from_returns(returns: &[f64], trading_days: usize) -> PortfolioMetrics {
    if returns.is_empty() {
        return PortfolioMetrics::default();
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let annual_return = mean * trading_days as f64;
    let annual_volatility = sample_std(returns) * (trading_days as f64).sqrt();

    let sharpe_ratio = if annual_volatility > MIN_VOLATILITY {
        annual_return / annual_volatility
    } else {
        0.0
    };

    PortfolioMetrics {
        annual_return: round2(annual_return * 100.0),
        annual_volatility: round2(annual_volatility * 100.0),
        sharpe_ratio: round2(sharpe_ratio),
        max_drawdown: round2(max_drawdown(returns) * 100.0),
        total_return: round2(returns.iter().sum::<f64>() * 100.0),
    }
}

/// Calculate maximum drawdown from a series of returns.
///
/// Returns the worst peak-to-trough change of the compounded value as a
/// non-positive decimal (e.g., -0.15 for a 15% drawdown).
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut running_max = f64::NEG_INFINITY;
    let mut worst = 0.0;

    for r in returns {
        cumulative *= 1.0 + r;
        if cumulative > running_max {
            running_max = cumulative;
        }
        if running_max > 0.0 {
            let drawdown = (cumulative - running_max) / running_max;
            if drawdown < worst {
                worst = drawdown;
            }
        }
    }

    worst
}

/// Annualized volatility in percent (sample standard deviation).
pub fn annualized_volatility(returns: &[f64], trading_days: usize) -> f64 {
    sample_std(returns) * (trading_days as f64).sqrt() * 100.0
}

/// Historical Value-at-Risk of a return stream.
///
/// The `tail` quantile (e.g. 0.05) of the observed returns, linearly
/// interpolated between order statistics. The result is a return, negative
/// when the tail is a loss. Empty input gives 0.
pub fn historical_var(returns: &[f64], tail: f64) -> f64 {
    let mut sorted: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);

    let rank = tail.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// Beta of a return stream against market returns.
///
/// Uses the most recent returns common to both slices. Returns 1.0 when
/// fewer than two pairs are available or the market does not move.
pub fn beta(stock_returns: &[f64], market_returns: &[f64]) -> f64 {
    let n = stock_returns.len().min(market_returns.len());
    if n < 2 {
        return 1.0;
    }
    let stock = &stock_returns[stock_returns.len() - n..];
    let market = &market_returns[market_returns.len() - n..];

    let stock_mean = stock.iter().sum::<f64>() / n as f64;
    let market_mean = market.iter().sum::<f64>() / n as f64;

    let covariance = stock
        .iter()
        .zip(market)
        .map(|(s, m)| (s - stock_mean) * (m - market_mean))
        .sum::<f64>()
        / (n - 1) as f64;
    let market_variance = sample_std(market).powi(2);

    if market_variance > MIN_VOLATILITY * MIN_VOLATILITY {
        covariance / market_variance
    } else {
        1.0
    }
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
