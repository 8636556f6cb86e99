//! Simplified Value-at-Risk simulation.
//!
//! Produces an illustrative 30-day value path for the dashboard chart. The
//! reported loss thresholds are fixed fractions of portfolio value and are
//! deliberately independent of the simulated path.

use crate::config::VarPolicy;
use crate::types::{SimulatedPoint, VarResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Simulate a value path with the given random source.
///
/// For day `i` in `1..=horizon`, `value(i) = baseline * (1 + r_i * i / horizon)`
/// with `r_i` drawn uniformly from `[-max_daily_return, max_daily_return)`.
/// The baseline is `portfolio_value`, or `policy.fallback_baseline` when the
/// portfolio has no value. `var95`/`var99` are fractions of
/// `portfolio_value` itself.
pub fn simulate_var<R: Rng + ?Sized>(
    portfolio_value: f64,
    rng: &mut R,
    policy: &VarPolicy,
) -> VarResult {
    let value = if portfolio_value.is_finite() && portfolio_value > 0.0 {
        portfolio_value
    } else {
        0.0
    };
    let baseline = if value > 0.0 {
        value
    } else {
        policy.fallback_baseline
    };

    let horizon = policy.horizon_days.max(1);
    let simulated_path = (1..=horizon)
        .map(|day| {
            let daily_return = (rng.gen::<f64>() - 0.5) * 2.0 * policy.max_daily_return;
            SimulatedPoint {
                day,
                value: baseline * (1.0 + daily_return * day as f64 / horizon as f64),
            }
        })
        .collect();

    VarResult {
        baseline,
        simulated_path,
        var95: value * policy.var95_fraction,
        var99: value * policy.var99_fraction,
        threshold_line: baseline * policy.threshold_fraction,
    }
}

/// Simulate with a seeded generator; the same seed gives the same path.
pub fn simulate_var_seeded(portfolio_value: f64, seed: u64, policy: &VarPolicy) -> VarResult {
    let mut rng = StdRng::seed_from_u64(seed);
    simulate_var(portfolio_value, &mut rng, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_deterministic_seed() {
        let policy = VarPolicy::default();
        let first = simulate_var_seeded(50_000.0, 12345, &policy);
        let second = simulate_var_seeded(50_000.0, 12345, &policy);

        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_differ() {
        let policy = VarPolicy::default();
        let first = simulate_var_seeded(50_000.0, 1, &policy);
        let second = simulate_var_seeded(50_000.0, 2, &policy);

        assert_ne!(first.simulated_path, second.simulated_path);
    }

    #[test]
    fn test_thresholds_are_fixed_fractions() {
        let policy = VarPolicy::default();
        for seed in [0, 7, 42] {
            let result = simulate_var_seeded(80_000.0, seed, &policy);

            assert_eq!(result.var95, 0.025 * 80_000.0);
            assert_eq!(result.var99, 0.15 * 80_000.0);
            assert_eq!(result.threshold_line, 0.95 * 80_000.0);
        }
    }

    #[test]
    fn test_path_shape_and_bounds() {
        let result = simulate_var_seeded(10_000.0, 42, &VarPolicy::default());

        assert_eq!(result.simulated_path.len(), 30);
        for (i, point) in result.simulated_path.iter().enumerate() {
            assert_eq!(point.day, i as u32 + 1);
            // |r| <= 2% scaled by day/30
            let max_move = 10_000.0 * 0.02 * point.day as f64 / 30.0;
            assert!((point.value - 10_000.0).abs() <= max_move + 1e-9);
        }
    }

    #[test]
    fn test_injected_source() {
        // A constant zero source draws r = -max every day
        let mut rng = StepRng::new(0, 0);
        let result = simulate_var(1_000.0, &mut rng, &VarPolicy::default());

        let last = result.simulated_path.last().unwrap();
        assert!((last.value - 980.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_value_uses_fallback_baseline() {
        let result = simulate_var_seeded(0.0, 9, &VarPolicy::default());

        assert_eq!(result.baseline, 10_000.0);
        assert_eq!(result.var95, 0.0);
        assert_eq!(result.var99, 0.0);
        assert!(result.simulated_path.iter().all(|p| p.value > 9_000.0));
    }
}
