//! Analytics orchestration.
//!
//! [`PortfolioAnalyzer`] runs the individual derivations in dependency order
//! and assembles the result the dashboard consumes. It holds only
//! configuration; every call is independent.

use crate::config::EngineConfig;
use crate::indicators::{snapshot_all, IndicatorSnapshot};
use crate::portfolio::{
    analyze_concentration, assess_risk, portfolio_metrics, recommendations, score_risk,
    value_holdings, ConcentrationReport, PortfolioValuation,
};
use crate::simulation::simulate_var;
use crate::types::{Holding, PortfolioAnalytics, PriceSeries, RiskScore, VarResult};
use crate::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Everything derived for one analytics request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioReport {
    pub analytics: PortfolioAnalytics,
    pub valuation: PortfolioValuation,
    pub risk: RiskScore,
    pub concentration: ConcentrationReport,
}

/// Runs analytics with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct PortfolioAnalyzer {
    config: EngineConfig,
}

impl PortfolioAnalyzer {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Derive analytics, risk score and alerts for a holding set.
    ///
    /// `prices` overrides each holding's last known price; `histories` feeds
    /// return metrics and volatility grading. Missing data degrades to zeroed
    /// metrics rather than failing.
    pub fn analyze(
        &self,
        holdings: &[Holding],
        prices: &HashMap<String, f64>,
        histories: &BTreeMap<String, PriceSeries>,
    ) -> PortfolioReport {
        let config = &self.config;

        let valuation = value_holdings(holdings, prices);
        let metrics = portfolio_metrics(&valuation, histories, &config.metrics);
        let risk_assessment =
            assess_risk(&valuation, histories, &config.metrics, &config.concentration);
        let risk = score_risk(&metrics, valuation.holding_count(), &config.risk);
        let concentration = analyze_concentration(
            &valuation,
            &risk,
            metrics.sharpe_ratio,
            &config.concentration,
        );

        tracing::debug!(
            holdings = valuation.holding_count(),
            total_value = valuation.total_value,
            score = risk.score,
            alerts = concentration.alerts.len(),
            "Portfolio analyzed"
        );

        let analytics = PortfolioAnalytics {
            total_value: valuation.total_value,
            total_gain_loss: valuation.total_gain_loss,
            metrics,
            risk_assessment,
            recommendations: recommendations(&valuation, &config.concentration),
        };

        PortfolioReport {
            analytics,
            valuation,
            risk,
            concentration,
        }
    }

    /// Indicator snapshots for every symbol with history.
    pub fn indicators(
        &self,
        histories: &BTreeMap<String, PriceSeries>,
        prices: &HashMap<String, f64>,
    ) -> BTreeMap<String, Result<IndicatorSnapshot>> {
        snapshot_all(histories, prices, &self.config.indicators)
    }

    /// Simulate a value path from the report's total value.
    pub fn simulate<R: Rng + ?Sized>(&self, report: &PortfolioReport, rng: &mut R) -> VarResult {
        simulate_var(report.analytics.total_value, rng, &self.config.simulation)
    }
}
