//! Technical indicators for price analysis.
//!
//! - **SMA**: Simple Moving Average
//! - **RSI**: Relative Strength Index
//! - **Levels**: support/resistance, trailing price range, trend
//!
//! All indicators are deterministic functions of the input series.

mod levels;
mod rsi;
mod sma;

pub use levels::{price_range, support_resistance, PriceRange, SupportResistance, Trend};
pub use rsi::{rsi, rsi_series, rsi_values, RsiSignal, DEFAULT_RSI_PERIOD};
pub use sma::{sma, sma_values};

use crate::config::IndicatorSettings;
use crate::types::PriceSeries;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Latest indicator readings for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorSnapshot {
    /// Price the trend is judged on (quote if given, else last close)
    pub current_price: f64,
    pub last_close: f64,
    /// Latest short-window SMA (absent when the series is too short)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_short: Option<f64>,
    /// Latest long-window SMA (absent when the series is too short)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_long: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi_signal: Option<RsiSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    pub levels: SupportResistance,
    pub range: PriceRange,
}

/// Map an insufficient-data failure to `None`, keeping other errors.
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::InsufficientData { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

impl IndicatorSnapshot {
    /// Compute the snapshot for one series.
    ///
    /// Indicators whose window exceeds the series are left empty rather than
    /// failing the whole snapshot; an empty series is an error.
    pub fn compute(
        series: &PriceSeries,
        current_price: Option<f64>,
        settings: &IndicatorSettings,
    ) -> Result<Self> {
        let last_close = series
            .last()
            .map(|bar| bar.close)
            .ok_or(Error::InsufficientData {
                required: 1,
                available: 0,
            })?;
        let current_price = current_price.unwrap_or(last_close);

        let sma_short = optional(sma(series, settings.sma_short))?.and_then(|v| v.last().copied());
        let sma_long = optional(sma(series, settings.sma_long))?.and_then(|v| v.last().copied());
        let rsi = optional(rsi(series, settings.rsi_period))?;

        Ok(Self {
            current_price,
            last_close,
            sma_short,
            sma_long,
            rsi,
            rsi_signal: rsi
                .map(|value| RsiSignal::classify(value, settings.overbought, settings.oversold)),
            trend: sma_short.map(|average| Trend::from_price(current_price, average)),
            levels: support_resistance(series, settings.level_window)?,
            range: price_range(series, settings.range_window)?,
        })
    }
}

/// Compute snapshots for many symbols.
///
/// Results are keyed by symbol; one symbol failing does not affect the others.
pub fn snapshot_all(
    histories: &BTreeMap<String, PriceSeries>,
    prices: &HashMap<String, f64>,
    settings: &IndicatorSettings,
) -> BTreeMap<String, Result<IndicatorSnapshot>> {
    histories
        .iter()
        .map(|(symbol, series)| {
            let snapshot =
                IndicatorSnapshot::compute(series, prices.get(symbol).copied(), settings);
            if let Err(e) = &snapshot {
                tracing::debug!("No indicators for {}: {}", symbol, e);
            }
            (symbol.clone(), snapshot)
        })
        .collect()
}
