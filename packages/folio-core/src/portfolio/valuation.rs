//! Holdings valuation and aggregation.

use crate::types::{Holding, HoldingValuation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Portfolio valuation summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PortfolioValuation {
    /// Per-holding values, in input order
    pub holdings: Vec<HoldingValuation>,
    /// Total market value
    pub total_value: f64,
    /// Total cost basis of all holdings
    pub total_cost: f64,
    /// Total unrealized gain/loss in dollars
    pub total_gain_loss: f64,
    /// Total unrealized gain/loss percentage
    pub total_gain_loss_percent: f64,
    /// Number of holdings with gains
    pub positions_in_profit: usize,
    /// Number of holdings with losses
    pub positions_in_loss: usize,
}

impl PortfolioValuation {
    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }

    /// Weight of each holding as `(symbol, weight)`.
    pub fn weights(&self) -> Vec<(String, f64)> {
        self.holdings
            .iter()
            .map(|h| (h.symbol.clone(), h.weight))
            .collect()
    }

    /// Largest single-holding weight, if any.
    pub fn max_weight(&self) -> Option<f64> {
        self.holdings.iter().map(|h| h.weight).reduce(f64::max)
    }
}

/// Value a set of holdings.
///
/// Each holding is priced from `prices` (keyed by symbol) when a finite,
/// non-negative quote is available, otherwise at its own `current_price`.
/// Symbols are upper-cased in the result. Weights are
/// `market_value / total_value`, or 0 for every holding when the total is
/// not positive.
///
/// # Example
///
/// ```rust
/// use folio_core::{value_holdings, Holding};
/// use std::collections::HashMap;
///
/// let holdings = vec![Holding::new("AAPL", "Apple Inc.", 10.0, 100.0, 0.0)];
/// let prices = HashMap::from([("AAPL".to_string(), 120.0)]);
///
/// let valuation = value_holdings(&holdings, &prices);
/// assert_eq!(valuation.total_value, 1200.0);
/// assert_eq!(valuation.total_gain_loss, 200.0);
/// assert_eq!(valuation.holdings[0].weight, 1.0);
/// ```
pub fn value_holdings(holdings: &[Holding], prices: &HashMap<String, f64>) -> PortfolioValuation {
    let priced: Vec<Holding> = holdings
        .iter()
        .map(|holding| {
            let symbol = holding.symbol.to_uppercase();
            let quote = prices
                .get(&holding.symbol)
                .or_else(|| prices.get(&symbol))
                .copied();
            let priced = match quote {
                Some(price) if price.is_finite() && price >= 0.0 => holding.with_price(price),
                Some(price) => {
                    tracing::debug!(
                        "Ignoring invalid quote {} for {}, using last known price {}",
                        price,
                        holding.symbol,
                        holding.current_price
                    );
                    holding.clone()
                }
                None => {
                    tracing::debug!(
                        "No quote for {}, using last known price {}",
                        holding.symbol,
                        holding.current_price
                    );
                    holding.clone()
                }
            };
            Holding { symbol, ..priced }
        })
        .collect();

    let total_value: f64 = priced.iter().map(|h| h.market_value()).sum();
    let total_cost: f64 = priced.iter().map(|h| h.cost_basis()).sum();
    let total_gain_loss: f64 = priced.iter().map(|h| h.gain_loss()).sum();

    let total_gain_loss_percent = if total_cost > 0.0 {
        (total_gain_loss / total_cost) * 100.0
    } else {
        0.0
    };

    let valued: Vec<HoldingValuation> = priced
        .iter()
        .map(|h| {
            let market_value = h.market_value();
            HoldingValuation {
                symbol: h.symbol.clone(),
                company_name: h.company_name.clone(),
                shares: h.shares,
                average_price: h.average_price,
                current_price: h.current_price,
                market_value,
                gain_loss: h.gain_loss(),
                gain_loss_percent: h.gain_loss_percent(),
                weight: if total_value > 0.0 {
                    market_value / total_value
                } else {
                    0.0
                },
            }
        })
        .collect();

    let positions_in_profit = valued.iter().filter(|h| h.gain_loss > 0.0).count();
    let positions_in_loss = valued.iter().filter(|h| h.gain_loss < 0.0).count();

    PortfolioValuation {
        holdings: valued,
        total_value,
        total_cost,
        total_gain_loss,
        total_gain_loss_percent,
        positions_in_profit,
        positions_in_loss,
    }
}
