//! Simple Moving Average (SMA) indicator.

use crate::types::PriceSeries;
use crate::{Error, Result};

/// Calculate the Simple Moving Average of closing prices.
///
/// # Arguments
///
/// * `series` - Price series
/// * `period` - Lookback period
///
/// # Returns
///
/// One value per complete window: element `j` is the mean close of bars
/// `j..j + period`, so the result has `len - period + 1` values.
///
/// # Errors
///
/// [`Error::InvalidPeriod`] for a zero period, [`Error::InsufficientData`]
/// when the series is shorter than `period`.
pub fn sma(series: &PriceSeries, period: usize) -> Result<Vec<f64>> {
    sma_values(&series.closes(), period)
}

/// SMA over a plain value slice.
///
/// # Example
///
/// ```rust
/// use folio_core::indicators::sma_values;
///
/// let prices = vec![10.0, 11.0, 12.0, 11.0, 10.0];
/// let sma = sma_values(&prices, 3).unwrap();
///
/// // First window = (10 + 11 + 12) / 3 = 11.0
/// assert_eq!(sma.len(), 3);
/// assert!((sma[0] - 11.0).abs() < 0.001);
/// ```
pub fn sma_values(data: &[f64], period: usize) -> Result<Vec<f64>> {
    if period == 0 {
        return Err(Error::InvalidPeriod(period));
    }
    if data.len() < period {
        return Err(Error::InsufficientData {
            required: period,
            available: data.len(),
        });
    }

    Ok(data
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64)
        .collect())
}
