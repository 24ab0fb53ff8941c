//! Scoring table: which parameters are tracked, how each one is judged,
//! its base agreement threshold and its importance weight.
//!
//! The table is an immutable value handed to the aggregator at construction,
//! so alternative policies can be tested side by side.

use crate::model::Parameter;

/// Tolerance used when checking that weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Precipitation probability (%) at or above which a model "expects rain".
pub const PRECIP_DECISION_THRESHOLD: f64 = 30.0;

/// Base threshold for wind direction spread, degrees.
pub const DIRECTION_THRESHOLD_DEG: f64 = 30.0;

/// How agreement is judged for a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgreementKind {
    /// max − min against a count-scaled threshold.
    Linear,
    /// Smallest arc containing every compass value against a count-scaled threshold.
    Circular,
    /// Every model on the same side of a fixed decision threshold.
    Binary { decision_threshold: f64 },
}

/// One row of the scoring table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRule {
    pub parameter: Parameter,
    pub kind: AgreementKind,
    /// Unscaled threshold. Unused by `Binary` rules.
    pub base_threshold: f64,
    pub weight: f64,
}

/// The full scoring policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Rows in breakdown order.
    pub rules: Vec<ParameterRule>,
    /// Extra threshold per contributing model beyond two.
    pub scaling_step: f64,
    /// Minimum overall score for `High`.
    pub high_cutoff: u8,
    /// Minimum overall score for `Moderate`.
    pub moderate_cutoff: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                ParameterRule {
                    parameter: Parameter::WindSpeed,
                    kind: AgreementKind::Linear,
                    base_threshold: 7.0,
                    weight: 0.35,
                },
                ParameterRule {
                    parameter: Parameter::WindGusts,
                    kind: AgreementKind::Linear,
                    base_threshold: 10.0,
                    weight: 0.20,
                },
                ParameterRule {
                    parameter: Parameter::WindDirection,
                    kind: AgreementKind::Circular,
                    base_threshold: DIRECTION_THRESHOLD_DEG,
                    weight: 0.05,
                },
                ParameterRule {
                    parameter: Parameter::PrecipProbability,
                    kind: AgreementKind::Binary {
                        decision_threshold: PRECIP_DECISION_THRESHOLD,
                    },
                    base_threshold: PRECIP_DECISION_THRESHOLD,
                    weight: 0.15,
                },
                ParameterRule {
                    parameter: Parameter::WaveHeight,
                    kind: AgreementKind::Linear,
                    base_threshold: 1.0,
                    weight: 0.25,
                },
            ],
            scaling_step: 0.2,
            high_cutoff: 80,
            moderate_cutoff: 50,
        }
    }
}

impl ScoringConfig {
    pub fn rule(&self, parameter: Parameter) -> Option<&ParameterRule> {
        self.rules.iter().find(|r| r.parameter == parameter)
    }

    pub fn rule_mut(&mut self, parameter: Parameter) -> Option<&mut ParameterRule> {
        self.rules.iter_mut().find(|r| r.parameter == parameter)
    }

    /// Multiplier applied to a base threshold for `count` contributing models:
    /// 1.0 up to two models, then `1 + (count − 2) × step`.
    pub fn scaling_factor(&self, count: usize) -> f64 {
        if count <= 2 {
            1.0
        } else {
            1.0 + (count - 2) as f64 * self.scaling_step
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.rules.iter().map(|r| r.weight).sum()
    }

    /// Checks the table is usable: no duplicate parameters, positive
    /// thresholds, non-negative weights summing to one, ordered cutoffs.
    pub fn validate(&self) -> Result<(), String> {
        for (i, rule) in self.rules.iter().enumerate() {
            if self.rules[..i].iter().any(|r| r.parameter == rule.parameter) {
                return Err(format!("{} appears more than once in the scoring table", rule.parameter));
            }
            if !(rule.weight >= 0.0) {
                return Err(format!("{} weight must be non-negative, got {}", rule.parameter, rule.weight));
            }
            let threshold = match rule.kind {
                AgreementKind::Binary { decision_threshold } => decision_threshold,
                _ => rule.base_threshold,
            };
            if !(threshold > 0.0) {
                return Err(format!("{} threshold must be positive, got {}", rule.parameter, threshold));
            }
        }

        let total = self.total_weight();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!("parameter weights must sum to 1.0, got {:.4}", total));
        }
        if self.scaling_step < 0.0 {
            return Err(format!("scaling step must be non-negative, got {}", self.scaling_step));
        }
        if self.moderate_cutoff > self.high_cutoff || self.high_cutoff > 100 {
            return Err(format!(
                "level cutoffs must satisfy moderate <= high <= 100, got {} / {}",
                self.moderate_cutoff, self.high_cutoff
            ));
        }
        Ok(())
    }
}
