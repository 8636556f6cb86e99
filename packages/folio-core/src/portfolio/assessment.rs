//! Qualitative risk assessment and advisory recommendations.

use super::metrics::annualized_volatility;
use super::valuation::PortfolioValuation;
use crate::config::{ConcentrationPolicy, MetricsSettings};
use crate::types::{PriceSeries, RiskAssessment, Tier};
use std::collections::BTreeMap;

/// Grade concentration, diversification and volatility of the holding set.
pub fn assess_risk(
    valuation: &PortfolioValuation,
    histories: &BTreeMap<String, PriceSeries>,
    settings: &MetricsSettings,
    policy: &ConcentrationPolicy,
) -> RiskAssessment {
    if valuation.holdings.is_empty() {
        return RiskAssessment::default();
    }

    let concentration_risk = valuation.max_weight().map(|max| {
        if max > policy.assessment_high_weight {
            Tier::High
        } else if max > policy.assessment_medium_weight {
            Tier::Medium
        } else {
            Tier::Low
        }
    });

    let target = policy.target_holdings.max(1) as f64;
    let diversification_score = (valuation.holding_count() as f64 * 100.0 / target).min(100.0);

    let volatilities: Vec<f64> = valuation
        .holdings
        .iter()
        .filter_map(|h| histories.get(&h.symbol))
        .filter_map(|series| {
            let returns: Vec<f64> = series
                .daily_returns()
                .into_iter()
                .rev()
                .take(settings.volatility_lookback.saturating_sub(1))
                .map(|(_, r)| r)
                .collect();
            (returns.len() >= 2).then(|| annualized_volatility(&returns, settings.trading_days))
        })
        .collect();

    let volatility_level = if volatilities.is_empty() {
        None
    } else {
        let average = volatilities.iter().sum::<f64>() / volatilities.len() as f64;
        Some(if average > settings.volatility_high {
            Tier::High
        } else if average > settings.volatility_medium {
            Tier::Medium
        } else {
            Tier::Low
        })
    };

    RiskAssessment {
        volatility_level,
        diversification_score,
        concentration_risk,
    }
}

/// Advisory recommendations for the holding set, most general first.
pub fn recommendations(
    valuation: &PortfolioValuation,
    policy: &ConcentrationPolicy,
) -> Vec<String> {
    if valuation.holdings.is_empty() {
        return vec!["Start by adding some stocks to your portfolio".to_string()];
    }

    let mut advice = Vec::new();

    if valuation.holding_count() < policy.min_holdings {
        advice.push(format!(
            "Consider diversifying with more holdings ({}-{} stocks recommended)",
            policy.min_holdings, policy.target_holdings
        ));
    }

    for holding in &valuation.holdings {
        if holding.weight > policy.alert_weight {
            advice.push(format!(
                "Consider reducing exposure to {} (currently {:.1}% of portfolio)",
                holding.symbol,
                holding.weight * 100.0
            ));
        }
    }

    let losing = valuation.holdings.iter().filter(|h| h.gain_loss < 0.0).count();
    if losing as f64 > valuation.holding_count() as f64 * policy.losing_share {
        advice.push(
            "Consider reviewing your stock selection - majority of holdings are underperforming"
                .to_string(),
        );
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::value_holdings;
    use crate::types::{Holding, PriceBar};
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashMap;

    fn alternating_series(swing: f64, bars: usize) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = (0..bars)
            .map(|i| {
                let close = if i % 2 == 0 { 100.0 } else { 100.0 + swing };
                PriceBar {
                    timestamp: start + Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 10.0,
                }
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn test_assessment_grades() {
        let holdings = vec![
            Holding::new("AAA", "", 10.0, 100.0, 100.0),
            Holding::new("BBB", "", 5.0, 100.0, 100.0),
            Holding::new("CCC", "", 5.0, 100.0, 100.0),
        ];
        let valuation = value_holdings(&holdings, &HashMap::new());

        let mut histories = BTreeMap::new();
        // ~3% daily swings annualize far above 30%
        histories.insert("AAA".to_string(), alternating_series(3.0, 40));

        let assessment = assess_risk(
            &valuation,
            &histories,
            &MetricsSettings::default(),
            &ConcentrationPolicy::default(),
        );

        assert_eq!(assessment.concentration_risk, Some(Tier::High)); // 50%
        assert_eq!(assessment.diversification_score, 30.0);
        assert_eq!(assessment.volatility_level, Some(Tier::High));
    }

    #[test]
    fn test_assessment_calm_and_diversified() {
        let holdings: Vec<Holding> = (0..12)
            .map(|i| Holding::new(&format!("S{}", i), "", 1.0, 10.0, 10.0))
            .collect();
        let valuation = value_holdings(&holdings, &HashMap::new());

        let mut histories = BTreeMap::new();
        histories.insert("S0".to_string(), alternating_series(0.01, 40));

        let assessment = assess_risk(
            &valuation,
            &histories,
            &MetricsSettings::default(),
            &ConcentrationPolicy::default(),
        );

        assert_eq!(assessment.concentration_risk, Some(Tier::Low));
        assert_eq!(assessment.diversification_score, 100.0);
        assert_eq!(assessment.volatility_level, Some(Tier::Low));
    }

    #[test]
    fn test_assessment_without_history() {
        let holdings = vec![Holding::new("AAA", "", 1.0, 1.0, 1.0)];
        let valuation = value_holdings(&holdings, &HashMap::new());

        let assessment = assess_risk(
            &valuation,
            &BTreeMap::new(),
            &MetricsSettings::default(),
            &ConcentrationPolicy::default(),
        );

        assert!(assessment.volatility_level.is_none());
        assert_eq!(assessment.diversification_score, 10.0);
    }

    #[test]
    fn test_recommendations_empty_portfolio() {
        let valuation = value_holdings(&[], &HashMap::new());
        let advice = recommendations(&valuation, &ConcentrationPolicy::default());

        assert_eq!(advice, vec!["Start by adding some stocks to your portfolio"]);
    }

    #[test]
    fn test_recommendations() {
        let holdings = vec![
            Holding::new("AAPL", "", 10.0, 150.0, 100.0),
            Holding::new("F", "", 10.0, 15.0, 10.0),
            Holding::new("T", "", 10.0, 15.0, 20.0),
        ];
        let valuation = value_holdings(&holdings, &HashMap::new());
        let advice = recommendations(&valuation, &ConcentrationPolicy::default());

        assert_eq!(advice.len(), 3);
        assert!(advice[0].contains("5-10 stocks"));
        assert_eq!(
            advice[1],
            "Consider reducing exposure to AAPL (currently 76.9% of portfolio)"
        );
        assert!(advice[2].contains("underperforming"));
    }
}
