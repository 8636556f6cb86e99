//! Relative Strength Index (RSI) indicator.

use crate::types::PriceSeries;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conventional RSI lookback.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Calculate RSI value from average gain and average loss.
/// No losses in the window reads as maximal strength (RSI=100).
#[inline]
fn calculate_rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// RSI of a window of `period + 1` closes.
fn window_rsi(closes: &[f64]) -> f64 {
    let period = (closes.len() - 1) as f64;
    let (gains, losses) = closes
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(gains, losses), change| {
            if change > 0.0 {
                (gains + change, losses)
            } else {
                (gains, losses - change)
            }
        });

    calculate_rsi_value(gains / period, losses / period)
}

fn check_period(period: usize, available: usize) -> Result<()> {
    if period == 0 {
        return Err(Error::InvalidPeriod(period));
    }
    // `period` deltas need `period + 1` closes
    if available <= period {
        return Err(Error::InsufficientData {
            required: period + 1,
            available,
        });
    }
    Ok(())
}

/// Calculate the Relative Strength Index at the end of the series.
///
/// Formula:
/// 1. Take the close-to-close changes of the trailing `period` intervals
/// 2. avg_gain = sum of positive changes / period
/// 3. avg_loss = sum of negative change magnitudes / period
/// 4. RSI = 100 - (100 / (1 + avg_gain / avg_loss))
///
/// # Errors
///
/// [`Error::InsufficientData`] unless the series has more than `period` bars.
///
/// # Example
///
/// ```rust
/// use folio_core::indicators::rsi_values;
///
/// let prices = vec![44.0, 44.25, 44.5, 43.75, 44.5, 44.25, 44.5, 44.0, 43.5, 44.0,
///                   44.25, 44.0, 43.5, 44.0, 44.5, 44.25, 44.0];
/// let rsi = rsi_values(&prices, 14).unwrap();
///
/// assert!(rsi >= 0.0 && rsi <= 100.0);
/// ```
pub fn rsi(series: &PriceSeries, period: usize) -> Result<f64> {
    rsi_values(&series.closes(), period)
}

/// RSI at the end of a plain close slice.
pub fn rsi_values(closes: &[f64], period: usize) -> Result<f64> {
    check_period(period, closes.len())?;
    Ok(window_rsi(&closes[closes.len() - period - 1..]))
}

/// Rolling RSI, one value for every bar from index `period` on.
pub fn rsi_series(series: &PriceSeries, period: usize) -> Result<Vec<f64>> {
    let closes = series.closes();
    check_period(period, closes.len())?;

    Ok(closes.windows(period + 1).map(window_rsi).collect())
}

/// Momentum reading of an RSI value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiSignal {
    /// Classify with the conventional 70/30 bands.
    pub fn from_rsi(rsi: f64) -> Self {
        Self::classify(rsi, 70.0, 30.0)
    }

    /// Classify against custom bands. Values on a band are Neutral.
    pub fn classify(rsi: f64, overbought: f64, oversold: f64) -> Self {
        if rsi > overbought {
            RsiSignal::Overbought
        } else if rsi < oversold {
            RsiSignal::Oversold
        } else {
            RsiSignal::Neutral
        }
    }
}

impl fmt::Display for RsiSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RsiSignal::Overbought => "Overbought",
            RsiSignal::Oversold => "Oversold",
            RsiSignal::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}
