//! Roll-ups over a scored forecast, used for reports.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{ConfidenceLevel, ConfidenceScore, MultiModelForecast};

/// Counts and averages over a run of confidence scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceSummary {
    pub hours: usize,
    /// Mean overall score, `None` for an empty run.
    pub average_score: Option<f64>,
    pub high_hours: usize,
    pub moderate_hours: usize,
    pub low_hours: usize,
    /// First hour whose level is `Low`.
    pub first_low_hour: Option<DateTime<Utc>>,
}

pub fn summarize(scores: &[ConfidenceScore]) -> ConfidenceSummary {
    let count_level = |level: ConfidenceLevel| scores.iter().filter(|s| s.level == level).count();
    let average_score = if scores.is_empty() {
        None
    } else {
        let total: f64 = scores.iter().map(|s| f64::from(s.overall)).sum();
        Some(total / scores.len() as f64)
    };

    ConfidenceSummary {
        hours: scores.len(),
        average_score,
        high_hours: count_level(ConfidenceLevel::High),
        moderate_hours: count_level(ConfidenceLevel::Moderate),
        low_hours: count_level(ConfidenceLevel::Low),
        first_low_hour: scores
            .iter()
            .find(|s| s.level == ConfidenceLevel::Low)
            .map(|s| s.time),
    }
}

/// How far each fetched model reaches, as (display name, last timestamp).
pub fn model_horizons(forecast: &MultiModelForecast) -> Vec<(String, Option<DateTime<Utc>>)> {
    let weather = forecast
        .weather_forecasts
        .iter()
        .map(|f| (f.model.to_string(), f.available_through));
    let waves = forecast
        .wave_forecasts
        .iter()
        .map(|f| (f.model.to_string(), f.available_through));
    weather.chain(waves).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, SingleWaveModelForecast, WaveModel};
    use chrono::TimeZone;

    fn score(hour: u32, overall: u8, level: ConfidenceLevel) -> ConfidenceScore {
        ConfidenceScore {
            time: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            overall,
            level,
            breakdown: Vec::new(),
            models_available: Vec::new(),
            wave_models_available: Vec::new(),
        }
    }

    #[test]
    fn test_summary_counts_levels() {
        let scores = vec![
            score(0, 100, ConfidenceLevel::High),
            score(1, 60, ConfidenceLevel::Moderate),
            score(2, 20, ConfidenceLevel::Low),
            score(3, 0, ConfidenceLevel::Low),
        ];
        let summary = summarize(&scores);
        assert_eq!(summary.hours, 4);
        assert_eq!(summary.high_hours, 1);
        assert_eq!(summary.moderate_hours, 1);
        assert_eq!(summary.low_hours, 2);
        assert_eq!(summary.average_score, Some(45.0));
        assert_eq!(summary.first_low_hour, Some(scores[2].time));
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.hours, 0);
        assert_eq!(summary.average_score, None);
        assert_eq!(summary.first_low_hour, None);
    }

    #[test]
    fn test_model_horizons_lists_wave_models() {
        let through = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();
        let forecast = MultiModelForecast {
            location: Location { name: None, latitude: 0.0, longitude: 0.0 },
            fetched_at: through,
            weather_forecasts: Vec::new(),
            wave_forecasts: vec![SingleWaveModelForecast {
                model: WaveModel::GfsWave,
                fetched_at: through,
                available_through: Some(through),
                waves: Vec::new(),
            }],
            timeline: Vec::new(),
            confidence: Vec::new(),
        };
        assert_eq!(model_horizons(&forecast), vec![("GFS-Wave".to_string(), Some(through))]);
    }
}
