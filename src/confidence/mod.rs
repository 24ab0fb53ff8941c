/// Confidence scoring: how closely the available models agree, hour by hour.
///
/// For every normalized hour each tracked parameter is judged by its
/// evaluator, then the verdicts are rolled into a 0–100 score. Only
/// parameters with at least two contributing models carry weight; their
/// weights are renormalized so a missing parameter (no wave models inland,
/// say) does not drag the score down.
///
/// Submodules:
/// - `rules`      — the scoring table (weights, thresholds, evaluator kinds).
/// - `evaluators` — linear, circular and binary agreement checks.

pub mod evaluators;
pub mod rules;

use crate::model::{
    ConfidenceLevel, ConfidenceScore, NormalizedTimestamp, Parameter, ParameterAgreement,
};

pub use evaluators::{compute_direction_agreement, compute_precip_agreement};
pub use rules::{AgreementKind, ParameterRule, ScoringConfig};

// ---------------------------------------------------------------------------
// Value extraction
// ---------------------------------------------------------------------------

/// Non-null values for `parameter` across every model present at this hour.
pub fn parameter_values(timestamp: &NormalizedTimestamp, parameter: Parameter) -> Vec<f64> {
    let weather = timestamp.models.iter().map(|(_, readings)| readings);
    match parameter {
        Parameter::WindSpeed => weather
            .filter_map(|r| r.wind.as_ref().map(|w| w.speed_mph))
            .collect(),
        Parameter::WindGusts => weather
            .filter_map(|r| r.wind.as_ref().and_then(|w| w.gusts_mph))
            .collect(),
        Parameter::WindDirection => weather
            .filter_map(|r| r.wind.as_ref().and_then(|w| w.direction_deg))
            .collect(),
        Parameter::PrecipProbability => weather
            .filter_map(|r| r.weather.as_ref().and_then(|w| w.precip_probability))
            .collect(),
        Parameter::WaveHeight => timestamp
            .wave_models
            .iter()
            .map(|(_, wave)| wave.height_ft)
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Scores normalized hours against a fixed scoring table.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceAggregator {
    config: ScoringConfig,
}

impl ConfidenceAggregator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Maps an overall score onto its level.
    pub fn level_for(&self, overall: u8) -> ConfidenceLevel {
        if overall >= self.config.high_cutoff {
            ConfidenceLevel::High
        } else if overall >= self.config.moderate_cutoff {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Scores one hour. Never fails: an hour nobody can be compared on
    /// scores 0 with level `Low`.
    pub fn score(&self, timestamp: &NormalizedTimestamp) -> ConfidenceScore {
        let models_available: Vec<_> = timestamp
            .models
            .iter()
            .filter(|(_, readings)| readings.has_any())
            .map(|(model, _)| model)
            .collect();
        let wave_models_available = timestamp.wave_models.models();

        let breakdown: Vec<ParameterAgreement> = self
            .config
            .rules
            .iter()
            .map(|rule| {
                let values = parameter_values(timestamp, rule.parameter);
                evaluators::evaluate(rule, &values, &self.config)
            })
            .collect();

        let overall = overall_score(&breakdown);
        ConfidenceScore {
            time: timestamp.time,
            overall,
            level: self.level_for(overall),
            breakdown,
            models_available,
            wave_models_available,
        }
    }

    /// Scores every hour, preserving order.
    pub fn score_all(&self, timeline: &[NormalizedTimestamp]) -> Vec<ConfidenceScore> {
        timeline.iter().map(|t| self.score(t)).collect()
    }
}

/// Weighted share of agreeing parameters, 0–100.
///
/// Parameters compared by fewer than two models are left out of both the
/// numerator and the denominator. Returns 0 when nothing is comparable.
pub fn overall_score(breakdown: &[ParameterAgreement]) -> u8 {
    let scored = breakdown.iter().filter(|a| a.models_compared >= 2);
    let (total_weight, agreeing_weight) = scored.fold((0.0, 0.0), |(total, agreeing), a| {
        (total + a.weight, if a.agrees { agreeing + a.weight } else { agreeing })
    });

    if total_weight <= 0.0 {
        return 0;
    }
    (100.0 * agreeing_weight / total_weight).round().clamp(0.0, 100.0) as u8
}

/// Scores one hour with the default table.
pub fn calculate_confidence(timestamp: &NormalizedTimestamp) -> ConfidenceScore {
    ConfidenceAggregator::default().score(timestamp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
