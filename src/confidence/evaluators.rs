//! Per-parameter agreement evaluators.
//!
//! Each evaluator takes the values currently available for one parameter at
//! one hour (nulls already filtered out) and returns a `ParameterAgreement`.
//! With fewer than two values there is nothing to disagree about: the
//! result agrees with spread 0 and reports the true count.

use super::rules::{AgreementKind, ParameterRule, ScoringConfig};
use crate::model::{Parameter, ParameterAgreement};

/// Dispatches to the evaluator matching the rule's kind.
pub fn evaluate(rule: &ParameterRule, values: &[f64], config: &ScoringConfig) -> ParameterAgreement {
    match rule.kind {
        AgreementKind::Linear => linear_agreement(rule, values, config),
        AgreementKind::Circular => circular_agreement(rule, values, config),
        AgreementKind::Binary { decision_threshold } => {
            binary_agreement(rule, values, decision_threshold)
        }
    }
}

fn trivial(rule: &ParameterRule, threshold: f64, count: usize) -> ParameterAgreement {
    ParameterAgreement {
        parameter: rule.parameter,
        agrees: true,
        spread: 0.0,
        threshold,
        models_compared: count,
        weight: rule.weight,
    }
}

fn max_minus_min(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// Spread = max − min, agreeing while within the scaled threshold.
pub fn linear_agreement(rule: &ParameterRule, values: &[f64], config: &ScoringConfig) -> ParameterAgreement {
    let threshold = rule.base_threshold * config.scaling_factor(values.len());
    if values.len() < 2 {
        return trivial(rule, threshold, values.len());
    }

    let spread = max_minus_min(values);
    ParameterAgreement {
        parameter: rule.parameter,
        agrees: spread <= threshold,
        spread,
        threshold,
        models_compared: values.len(),
        weight: rule.weight,
    }
}

/// Smallest arc (degrees) containing every compass value.
///
/// Sorts the values, finds the largest empty gap between neighbours
/// (including the wrap from the last value back through 360° to the first)
/// and returns 360 minus that gap, so 350° and 10° are 20° apart.
pub fn circular_spread(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mut sorted: Vec<f64> = values.iter().map(|v| v.rem_euclid(360.0)).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let wrap_gap = 360.0 - sorted[sorted.len() - 1] + sorted[0];
    let largest_gap = sorted
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold(wrap_gap, f64::max);

    360.0 - largest_gap
}

/// Circular spread against the scaled direction threshold.
pub fn circular_agreement(rule: &ParameterRule, values: &[f64], config: &ScoringConfig) -> ParameterAgreement {
    let threshold = rule.base_threshold * config.scaling_factor(values.len());
    if values.len() < 2 {
        return trivial(rule, threshold, values.len());
    }

    let spread = circular_spread(values);
    ParameterAgreement {
        parameter: rule.parameter,
        agrees: spread <= threshold,
        spread,
        threshold,
        models_compared: values.len(),
        weight: rule.weight,
    }
}

/// All values on the same side of `decision_threshold` (≥ means "yes").
///
/// The reported spread is max − min for display only; it never decides the
/// verdict, so 29 and 31 disagree while 2 and 29 agree.
pub fn binary_agreement(rule: &ParameterRule, values: &[f64], decision_threshold: f64) -> ParameterAgreement {
    if values.len() < 2 {
        return trivial(rule, decision_threshold, values.len());
    }

    let expects_yes = |v: &f64| *v >= decision_threshold;
    let agrees = values.iter().all(expects_yes) || !values.iter().any(expects_yes);
    ParameterAgreement {
        parameter: rule.parameter,
        agrees,
        spread: max_minus_min(values),
        threshold: decision_threshold,
        models_compared: values.len(),
        weight: rule.weight,
    }
}

// ---------------------------------------------------------------------------
// Default-table shortcuts
// ---------------------------------------------------------------------------

fn evaluate_default(parameter: Parameter, values: &[f64]) -> ParameterAgreement {
    let config = ScoringConfig::default();
    match config.rule(parameter) {
        Some(rule) => evaluate(rule, values, &config),
        None => ParameterAgreement {
            parameter,
            agrees: true,
            spread: 0.0,
            threshold: 0.0,
            models_compared: values.len(),
            weight: 0.0,
        },
    }
}

/// Wind direction agreement under the default table.
pub fn compute_direction_agreement(values: &[f64]) -> ParameterAgreement {
    evaluate_default(Parameter::WindDirection, values)
}

/// Precipitation probability agreement under the default table.
pub fn compute_precip_agreement(values: &[f64]) -> ParameterAgreement {
    evaluate_default(Parameter::PrecipProbability, values)
}

/// Wind speed agreement under the default table.
pub fn compute_wind_speed_agreement(values: &[f64]) -> ParameterAgreement {
    evaluate_default(Parameter::WindSpeed, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // --- Circular -----------------------------------------------------------

    #[test]
    fn test_direction_across_north_is_short_arc() {
        let result = compute_direction_agreement(&[350.0, 10.0]);
        assert!(close(result.spread, 20.0), "spread was {}", result.spread);
        assert!(result.agrees);
    }

    #[test]
    fn test_direction_agreement_is_rotation_symmetric() {
        let wrapped = compute_direction_agreement(&[350.0, 10.0]);
        let plain = compute_direction_agreement(&[0.0, 20.0]);
        assert!(close(wrapped.spread, plain.spread));
        assert_eq!(wrapped.agrees, plain.agrees);
    }

    #[test]
    fn test_opposite_directions_disagree() {
        let result = compute_direction_agreement(&[90.0, 270.0]);
        assert!(close(result.spread, 180.0));
        assert!(!result.agrees);
        assert_eq!(result.threshold, 30.0);
    }

    #[test]
    fn test_direction_spread_three_values_around_north() {
        // 340, 355, 15 -> smallest arc runs 340..15 = 35 degrees.
        assert!(close(circular_spread(&[15.0, 340.0, 355.0]), 35.0));
        // Three models widen the threshold to 36, so 35 agrees.
        let result = compute_direction_agreement(&[15.0, 340.0, 355.0]);
        assert!(close(result.threshold, 36.0));
        assert!(result.agrees);
    }

    #[test]
    fn test_identical_directions_have_zero_spread() {
        assert_eq!(circular_spread(&[270.0, 270.0, 270.0]), 0.0);
    }

    #[test]
    fn test_direction_360_equals_0() {
        assert!(close(circular_spread(&[360.0, 0.0]), 0.0));
    }

    // --- Binary -------------------------------------------------------------

    #[test]
    fn test_precip_straddling_threshold_disagrees() {
        let result = compute_precip_agreement(&[29.0, 31.0]);
        assert!(!result.agrees, "29% and 31% fall on opposite sides of 30%");
        assert!(close(result.spread, 2.0));
    }

    #[test]
    fn test_precip_all_below_threshold_agrees() {
        let result = compute_precip_agreement(&[5.0, 10.0, 20.0]);
        assert!(result.agrees);
        assert_eq!(result.models_compared, 3);
    }

    #[test]
    fn test_precip_far_apart_on_same_side_agrees() {
        assert!(compute_precip_agreement(&[2.0, 29.0]).agrees);
        assert!(compute_precip_agreement(&[30.0, 100.0]).agrees);
    }

    #[test]
    fn test_precip_threshold_is_not_scaled() {
        let result = compute_precip_agreement(&[10.0, 10.0, 10.0, 10.0]);
        assert_eq!(result.threshold, 30.0);
    }

    // --- Linear -------------------------------------------------------------

    #[test]
    fn test_wind_speed_within_threshold_agrees() {
        let result = compute_wind_speed_agreement(&[10.0, 12.0]);
        assert!(result.agrees);
        assert!(close(result.spread, 2.0));
        assert_eq!(result.threshold, 7.0);
    }

    #[test]
    fn test_wind_speed_beyond_threshold_disagrees() {
        let result = compute_wind_speed_agreement(&[10.0, 25.0]);
        assert!(!result.agrees);
        assert!(close(result.spread, 15.0));
    }

    #[test]
    fn test_spread_equal_to_threshold_agrees() {
        assert!(compute_wind_speed_agreement(&[10.0, 17.0]).agrees);
    }

    #[test]
    fn test_more_models_only_relax_the_verdict() {
        // Spread of 8 mph: too wide for two models, fine for three or four.
        let two = compute_wind_speed_agreement(&[10.0, 18.0]);
        let three = compute_wind_speed_agreement(&[10.0, 14.0, 18.0]);
        let four = compute_wind_speed_agreement(&[10.0, 12.0, 14.0, 18.0]);

        assert!(two.threshold <= three.threshold && three.threshold <= four.threshold);
        assert!(!two.agrees);
        assert!(three.agrees);
        assert!(four.agrees);
    }

    // --- Degenerate ---------------------------------------------------------

    #[test]
    fn test_fewer_than_two_values_trivially_agree() {
        for values in [&[][..], &[42.0][..]] {
            for result in [
                compute_wind_speed_agreement(values),
                compute_direction_agreement(values),
                compute_precip_agreement(values),
            ] {
                assert!(result.agrees);
                assert_eq!(result.spread, 0.0);
                assert_eq!(result.models_compared, values.len());
            }
        }
    }

    #[test]
    fn test_weight_comes_from_rule() {
        assert_eq!(compute_wind_speed_agreement(&[1.0, 2.0]).weight, 0.35);
        assert_eq!(compute_direction_agreement(&[1.0, 2.0]).weight, 0.05);
        assert_eq!(compute_precip_agreement(&[1.0, 2.0]).weight, 0.15);
    }
}
