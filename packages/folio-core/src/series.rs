//! Price series normalization.
//!
//! Market-data feeds deliver bars as loosely typed JSON: numbers are often
//! strings, field names vary between endpoints and the current-day bar may be
//! resent after a partial update. This module turns that into a validated,
//! ascending [`PriceSeries`].

use crate::types::{PriceBar, PriceSeries};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const TIMESTAMP_KEYS: &[&str] = &["timestamp", "date", "time", "index", "1. timestamp"];
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];
const OPEN_KEYS: &[&str] = &["open", "1. open"];
const HIGH_KEYS: &[&str] = &["high", "2. high"];
const LOW_KEYS: &[&str] = &["low", "3. low"];
const CLOSE_KEYS: &[&str] = &["close", "4. close"];
const VOLUME_KEYS: &[&str] = &["volume", "5. volume"];

/// Normalize raw bar records into a price series.
///
/// Records may arrive in any order. When two records share a timestamp the
/// later one in input order wins.
///
/// # Errors
///
/// Returns [`Error::MalformedBar`] when a record is not an object, misses a
/// required field, holds a non-numeric or non-finite value, or violates the
/// high/low ordering.
///
/// # Example
///
/// ```rust
/// use folio_core::normalize_bars;
/// use serde_json::json;
///
/// let raw = vec![
///     json!({"date": "2024-01-03", "open": 11, "high": 12, "low": 10, "close": 11.5, "volume": 900}),
///     json!({"date": "2024-01-02", "open": "10", "high": "11", "low": "9.5", "close": "10.5", "volume": "1000"}),
/// ];
/// let series = normalize_bars(&raw).unwrap();
///
/// assert_eq!(series.closes(), vec![10.5, 11.5]);
/// ```
pub fn normalize_bars(raw: &[Value]) -> Result<PriceSeries> {
    let mut by_time: BTreeMap<DateTime<Utc>, PriceBar> = BTreeMap::new();

    for (index, record) in raw.iter().enumerate() {
        let object = record.as_object().ok_or_else(|| Error::MalformedBar {
            index,
            reason: "record is not an object".to_string(),
        })?;

        let bar = parse_bar(index, object)?;
        bar.check()
            .map_err(|reason| Error::MalformedBar { index, reason })?;

        if by_time.insert(bar.timestamp, bar).is_some() {
            tracing::debug!(
                "Replacing earlier bar at {} with record {}",
                bar.timestamp,
                index
            );
        }
    }

    PriceSeries::new(by_time.into_values().collect())
}

/// Normalize the feed's `{date: {field: value}}` object form.
pub fn normalize_feed(feed: &Map<String, Value>) -> Result<PriceSeries> {
    let records: Vec<Value> = feed
        .iter()
        .map(|(date, fields)| {
            let mut record = fields.as_object().cloned().unwrap_or_default();
            record.insert("timestamp".to_string(), Value::String(date.clone()));
            Value::Object(record)
        })
        .collect();

    normalize_bars(&records)
}

fn parse_bar(index: usize, object: &Map<String, Value>) -> Result<PriceBar> {
    let malformed = |reason: String| Error::MalformedBar { index, reason };

    let timestamp_value =
        lookup(object, TIMESTAMP_KEYS).ok_or_else(|| malformed("missing timestamp".into()))?;
    let timestamp = parse_timestamp(timestamp_value)
        .ok_or_else(|| malformed(format!("unrecognized timestamp {}", timestamp_value)))?;

    let number = |keys: &[&str]| -> Result<f64> {
        let name = keys[0];
        let value = lookup(object, keys).ok_or_else(|| malformed(format!("missing {}", name)))?;
        let parsed = parse_number(value)
            .ok_or_else(|| malformed(format!("{} is not a number: {}", name, value)))?;
        if !parsed.is_finite() {
            return Err(malformed(format!("{} is not a finite number", name)));
        }
        Ok(parsed)
    };

    Ok(PriceBar {
        timestamp,
        open: number(OPEN_KEYS)?,
        high: number(HIGH_KEYS)?,
        low: number(LOW_KEYS)?,
        close: number(CLOSE_KEYS)?,
        volume: number(VOLUME_KEYS)?,
    })
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| object.get(*key))
        .filter(|value| !value.is_null())
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// RFC 3339 strings, naive `YYYY-MM-DD[(T| )HH:MM:SS[.fff]]` (UTC) or integer
/// Unix seconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Some(naive) = NAIVE_DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            {
                return Some(Utc.from_utc_datetime(&naive));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(date: &str, close: f64) -> Value {
        json!({
            "date": date,
            "open": close,
            "high": close + 1.0,
            "low": close - 1.0,
            "close": close,
            "volume": 1000
        })
    }

    #[test]
    fn test_sorts_ascending() {
        let raw = vec![
            record("2024-01-03", 12.0),
            record("2024-01-01", 10.0),
            record("2024-01-02", 11.0),
        ];
        let series = normalize_bars(&raw).unwrap();

        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_duplicate_timestamp_later_record_wins() {
        let raw = vec![
            record("2024-01-01", 10.0),
            record("2024-01-02", 11.0),
            record("2024-01-02", 11.7),
        ];
        let series = normalize_bars(&raw).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.0, 11.7]);
    }

    #[test]
    fn test_accepts_feed_keys_and_strings() {
        let raw = vec![json!({
            "timestamp": "2024-01-02T16:00:00Z",
            "1. open": "150.10",
            "2. high": "152.00",
            "3. low": "149.50",
            "4. close": "151.25",
            "5. volume": "1200300"
        })];
        let series = normalize_bars(&raw).unwrap();
        let bar = series.last().unwrap();

        assert_eq!(bar.open, 150.10);
        assert_eq!(bar.close, 151.25);
        assert_eq!(bar.volume, 1_200_300.0);
    }

    #[test]
    fn test_unix_timestamp() {
        let raw = vec![json!({
            "time": 1_704_067_200,
            "open": 1, "high": 1, "low": 1, "close": 1, "volume": 0
        })];
        let series = normalize_bars(&raw).unwrap();

        assert_eq!(
            series.last().unwrap().timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_high_below_low_is_malformed() {
        let raw = vec![
            record("2024-01-01", 10.0),
            json!({"date": "2024-01-02", "open": 10, "high": 9, "low": 11, "close": 10, "volume": 5}),
        ];

        match normalize_bars(&raw) {
            Err(Error::MalformedBar { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected MalformedBar, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let raw = vec![json!({"date": "2024-01-01", "open": 1, "high": 1, "low": 1, "volume": 1})];
        assert!(matches!(
            normalize_bars(&raw),
            Err(Error::MalformedBar { index: 0, .. })
        ));
    }

    #[test]
    fn test_non_finite_is_malformed() {
        let raw = vec![json!({
            "date": "2024-01-01", "open": "NaN", "high": 1, "low": 1, "close": 1, "volume": 1
        })];
        assert!(matches!(
            normalize_bars(&raw),
            Err(Error::MalformedBar { .. })
        ));
    }

    #[test]
    fn test_negative_volume_is_malformed() {
        let raw = vec![json!({
            "date": "2024-01-01", "open": 1, "high": 1, "low": 1, "close": 1, "volume": -3
        })];
        assert!(matches!(
            normalize_bars(&raw),
            Err(Error::MalformedBar { .. })
        ));
    }

    #[test]
    fn test_bad_timestamp_is_malformed() {
        let raw = vec![json!({
            "date": "yesterday", "open": 1, "high": 1, "low": 1, "close": 1, "volume": 1
        })];
        assert!(matches!(
            normalize_bars(&raw),
            Err(Error::MalformedBar { .. })
        ));
    }

    #[test]
    fn test_normalize_feed() {
        let feed = json!({
            "2024-01-02": {"1. open": "11", "2. high": "12", "3. low": "10", "4. close": "11.5", "5. volume": "10"},
            "2024-01-01": {"1. open": "10", "2. high": "11", "3. low": "9", "4. close": "10.5", "5. volume": "20"}
        });
        let series = normalize_feed(feed.as_object().unwrap()).unwrap();

        assert_eq!(series.closes(), vec![10.5, 11.5]);
    }

    #[test]
    fn test_records_keyed_by_index() {
        // Rows from a reset DataFrame index carry a naive ISO datetime
        let raw = vec![json!({
            "index": "2024-01-02T00:00:00",
            "open": 10.0, "high": 11.0, "low": 9.0, "close": 10.5, "volume": 100
        })];
        let series = normalize_bars(&raw).unwrap();

        assert_eq!(
            series.last().unwrap().timestamp,
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_naive_iso_datetime() {
        let raw = vec![
            json!({
                "timestamp": "2024-01-02T15:30:00",
                "open": 1, "high": 1, "low": 1, "close": 1, "volume": 1
            }),
            json!({
                "timestamp": "2024-01-03T09:00:00.250",
                "open": 1, "high": 1, "low": 1, "close": 1, "volume": 1
            }),
        ];
        let series = normalize_bars(&raw).unwrap();

        assert_eq!(
            series.bars()[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 2, 15, 30, 0).unwrap()
        );
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_numbered_timestamp_key() {
        let raw = vec![json!({
            "1. timestamp": "2024-01-02",
            "1. open": "10", "2. high": "11", "3. low": "9", "4. close": "10.5", "5. volume": "100"
        })];
        let series = normalize_bars(&raw).unwrap();

        assert_eq!(
            series.last().unwrap().timestamp,
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_empty_input() {
        let series = normalize_bars(&[]).unwrap();
        assert!(series.is_empty());
    }
}
