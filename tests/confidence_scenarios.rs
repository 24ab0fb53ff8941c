/// End-to-end scoring scenarios
///
/// These tests drive the public API the way the orchestrator does:
/// per-model forecasts -> normalize_forecasts -> ConfidenceAggregator.
/// They need no network access.
///
/// Run with: cargo test --test confidence_scenarios

use chrono::{DateTime, Duration, TimeZone, Utc};
use model_consensus::model::{
    ConfidenceLevel, Location, Parameter, SingleModelForecast, SingleWaveModelForecast, WaveModel,
    WaveReading, WeatherModel, WeatherReading, WindReading,
};
use model_consensus::{assemble, calculate_confidence, normalize_forecasts, ConfidenceAggregator};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// A model with identical readings for `hours` consecutive hours from `start()`.
fn steady_model(
    model: WeatherModel,
    hours: i64,
    speed: f64,
    gusts: f64,
    direction: f64,
    precip: f64,
) -> SingleModelForecast {
    let times: Vec<_> = (0..hours).map(|h| start() + Duration::hours(h)).collect();
    SingleModelForecast {
        model,
        fetched_at: start(),
        available_through: times.last().copied(),
        wind: times
            .iter()
            .map(|t| WindReading {
                time: *t,
                speed_mph: speed,
                gusts_mph: Some(gusts),
                direction_deg: Some(direction),
            })
            .collect(),
        temperature: Vec::new(),
        weather: times
            .iter()
            .map(|t| WeatherReading {
                time: *t,
                precip_probability: Some(precip),
                precipitation_in: None,
                cloud_cover_pct: None,
            })
            .collect(),
        pressure: Vec::new(),
    }
}

fn wave_model(model: WaveModel, heights: &[f64]) -> SingleWaveModelForecast {
    let waves: Vec<_> = heights
        .iter()
        .enumerate()
        .map(|(h, height)| WaveReading {
            time: start() + Duration::hours(h as i64),
            height_ft: *height,
            direction_deg: Some(280.0),
            period_s: Some(9.0),
        })
        .collect();
    SingleWaveModelForecast {
        model,
        fetched_at: start(),
        available_through: waves.last().map(|w| w.time),
        waves,
    }
}

// ---------------------------------------------------------------------------
// Agreement scenarios
// ---------------------------------------------------------------------------

#[test]
fn two_models_in_close_agreement_score_high() {
    let grid = normalize_forecasts(
        &[
            steady_model(WeatherModel::Gfs, 1, 10.0, 15.0, 180.0, 10.0),
            steady_model(WeatherModel::Ecmwf, 1, 12.0, 17.0, 185.0, 15.0),
        ],
        &[],
    );
    assert_eq!(grid.len(), 1);

    let score = calculate_confidence(&grid[0]);
    assert_eq!(score.overall, 100);
    assert_eq!(score.level, ConfidenceLevel::High);
    assert_eq!(score.breakdown.len(), 5);

    let speed = score.breakdown.iter().find(|a| a.parameter == Parameter::WindSpeed).unwrap();
    assert_eq!(speed.spread, 2.0);
    assert_eq!(speed.threshold, 7.0);
    let gusts = score.breakdown.iter().find(|a| a.parameter == Parameter::WindGusts).unwrap();
    assert_eq!(gusts.threshold, 10.0);
    let direction = score.breakdown.iter().find(|a| a.parameter == Parameter::WindDirection).unwrap();
    assert_eq!(direction.spread, 5.0);
    let waves = score.breakdown.iter().find(|a| a.parameter == Parameter::WaveHeight).unwrap();
    assert_eq!(waves.models_compared, 0);
}

#[test]
fn two_models_disagreeing_on_everything_score_zero() {
    let grid = normalize_forecasts(
        &[
            steady_model(WeatherModel::Gfs, 1, 10.0, 12.0, 90.0, 10.0),
            steady_model(WeatherModel::Nam, 1, 25.0, 35.0, 270.0, 80.0),
        ],
        &[],
    );

    let score = calculate_confidence(&grid[0]);
    assert_eq!(score.overall, 0);
    assert_eq!(score.level, ConfidenceLevel::Low);
    assert!(score.breakdown.iter().filter(|a| a.models_compared >= 2).all(|a| !a.agrees));
}

#[test]
fn lone_model_hours_score_zero_low() {
    // HRRR runs 2 hours past the shared window; those hours have one model.
    let grid = normalize_forecasts(
        &[
            steady_model(WeatherModel::Gfs, 2, 10.0, 15.0, 180.0, 10.0),
            steady_model(WeatherModel::Hrrr, 4, 10.0, 15.0, 180.0, 10.0),
        ],
        &[],
    );
    let scores = ConfidenceAggregator::default().score_all(&grid);

    assert_eq!(scores.len(), 4);
    assert_eq!(scores[0].overall, 100);
    assert_eq!(scores[3].overall, 0);
    assert_eq!(scores[3].level, ConfidenceLevel::Low);
    assert_eq!(scores[3].models_available, vec![WeatherModel::Hrrr]);
    assert_eq!(scores[3].breakdown.len(), 5);
}

#[test]
fn wave_disagreement_pulls_coastal_score_down() {
    // Wind agrees everywhere; waves 2 ft vs 6 ft disagree.
    // Comparable weight 1.0, agreeing 0.75 -> 75, moderate.
    let grid = normalize_forecasts(
        &[
            steady_model(WeatherModel::Gfs, 1, 10.0, 15.0, 180.0, 10.0),
            steady_model(WeatherModel::Ecmwf, 1, 11.0, 16.0, 182.0, 12.0),
        ],
        &[
            wave_model(WaveModel::GfsWave, &[2.0]),
            wave_model(WaveModel::EcmwfWam, &[6.0]),
        ],
    );

    let score = calculate_confidence(&grid[0]);
    assert_eq!(score.overall, 75);
    assert_eq!(score.level, ConfidenceLevel::Moderate);
    assert_eq!(score.wave_models_available, vec![WaveModel::GfsWave, WaveModel::EcmwfWam]);
}

#[test]
fn four_models_get_a_wider_threshold() {
    // Spread 9 mph: too wide for two models (7), inside four-model threshold (9.8).
    let models = [
        steady_model(WeatherModel::Gfs, 1, 10.0, 15.0, 180.0, 10.0),
        steady_model(WeatherModel::Ecmwf, 1, 13.0, 15.0, 180.0, 10.0),
        steady_model(WeatherModel::Hrrr, 1, 16.0, 15.0, 180.0, 10.0),
        steady_model(WeatherModel::Nam, 1, 19.0, 15.0, 180.0, 10.0),
    ];
    let four = calculate_confidence(&normalize_forecasts(&models, &[])[0]);
    let two = calculate_confidence(&normalize_forecasts(&[models[0].clone(), models[3].clone()], &[])[0]);

    let speed = |s: &model_consensus::model::ConfidenceScore| {
        s.breakdown.iter().find(|a| a.parameter == Parameter::WindSpeed).cloned().unwrap()
    };
    assert!(speed(&four).agrees);
    assert!(!speed(&two).agrees);
    assert!(speed(&four).threshold > speed(&two).threshold);
}

#[test]
fn assembled_bundle_keeps_timeline_and_scores_in_step() {
    let bundle = assemble(
        Location { name: Some("Coast".to_string()), latitude: 36.6, longitude: -121.9 },
        vec![
            steady_model(WeatherModel::Gfs, 3, 10.0, 15.0, 180.0, 10.0),
            steady_model(WeatherModel::Ecmwf, 5, 10.0, 15.0, 180.0, 10.0),
        ],
        vec![wave_model(WaveModel::GfsWave, &[3.0, 3.0, 3.0, 3.0, 3.0, 3.0])],
        &ConfidenceAggregator::default(),
        start(),
    );

    assert_eq!(bundle.timeline.len(), 6);
    assert_eq!(bundle.confidence.len(), bundle.timeline.len());
    assert!(bundle.timeline.windows(2).all(|w| w[0].time < w[1].time));
    for (slot, score) in bundle.timeline.iter().zip(&bundle.confidence) {
        assert_eq!(slot.time, score.time);
    }

    let json = serde_json::to_value(&bundle).unwrap();
    assert_eq!(json["confidence"][0]["level"], "high");
    assert!(json["timeline"][0]["models"].get("gfs").is_some());
    assert!(json["timeline"][5]["models"].get("gfs").is_none());
}
