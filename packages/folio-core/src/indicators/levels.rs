//! Price levels: support/resistance, trailing price range and trend.

use crate::types::PriceSeries;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Support and resistance over a trailing window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SupportResistance {
    /// Lowest low in the window
    pub support: f64,
    /// Highest high in the window
    pub resistance: f64,
    /// Number of bars actually inspected
    pub bars: usize,
}

/// Highest high, lowest low and mean volume over a trailing window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceRange {
    pub highest: f64,
    pub lowest: f64,
    pub average_volume: f64,
    /// Number of bars actually inspected
    pub bars: usize,
}

fn check_window(series: &PriceSeries, window: usize) -> Result<()> {
    if window == 0 {
        return Err(Error::InvalidPeriod(window));
    }
    if series.is_empty() {
        return Err(Error::InsufficientData {
            required: 1,
            available: 0,
        });
    }
    Ok(())
}

/// Calculate support and resistance over the trailing `window` bars.
///
/// A series shorter than `window` is used in full.
pub fn support_resistance(series: &PriceSeries, window: usize) -> Result<SupportResistance> {
    check_window(series, window)?;
    let bars = series.tail(window);

    Ok(SupportResistance {
        support: bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
        resistance: bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
        bars: bars.len(),
    })
}

/// Summarize the trailing `window` bars. A shorter series is used in full.
pub fn price_range(series: &PriceSeries, window: usize) -> Result<PriceRange> {
    check_window(series, window)?;
    let bars = series.tail(window);
    let total_volume: f64 = bars.iter().map(|b| b.volume).sum();

    Ok(PriceRange {
        highest: bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
        lowest: bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
        average_volume: total_volume / bars.len() as f64,
        bars: bars.len(),
    })
}

/// Direction of price relative to its moving average.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// Bullish when `price` is strictly above `average`.
    pub fn from_price(price: f64, average: f64) -> Self {
        if price > average {
            Trend::Bullish
        } else {
            Trend::Bearish
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => f.write_str("Bullish"),
            Trend::Bearish => f.write_str("Bearish"),
        }
    }
}
