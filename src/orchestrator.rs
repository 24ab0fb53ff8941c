//! Multi-model forecast orchestration.
//!
//! Fetches every configured model in parallel, drops the ones that fail,
//! then runs normalization and confidence scoring over whatever came back.
//! A failed model is logged and left out; it never aborts the run, so the
//! result may cover any subset of models, including none.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::confidence::ConfidenceAggregator;
use crate::logging::{self, Component};
use crate::model::{
    FetchError, Location, MultiModelForecast, SingleModelForecast, SingleWaveModelForecast,
    WaveModel, WeatherModel,
};
use crate::normalize::normalize_forecasts;

// ============================================================================
// Fetcher seams
// ============================================================================

/// Source of one atmospheric model's forecast.
pub trait WeatherFetcher: Send + Sync {
    fn model(&self) -> WeatherModel;
    fn fetch(&self, location: &Location) -> Result<SingleModelForecast, FetchError>;
}

/// Source of one wave model's forecast.
pub trait WaveFetcher: Send + Sync {
    fn model(&self) -> WaveModel;
    fn fetch(&self, location: &Location) -> Result<SingleWaveModelForecast, FetchError>;
}

// ============================================================================
// Parallel fetch
// ============================================================================

/// Runs every weather fetcher concurrently and keeps the successes, in
/// fetcher order.
pub fn fetch_weather_models(
    location: &Location,
    fetchers: &[Box<dyn WeatherFetcher>],
) -> Vec<SingleModelForecast> {
    let results: Vec<_> = fetchers
        .par_iter()
        .map(|fetcher| (fetcher.model(), fetcher.fetch(location)))
        .collect();

    let forecasts: Vec<_> = results
        .into_iter()
        .filter_map(|(model, result)| match result {
            Ok(forecast) => {
                logging::debug(
                    Component::Weather(model),
                    None,
                    &format!("{} wind hours, through {:?}", forecast.wind.len(), forecast.available_through),
                );
                Some(forecast)
            }
            Err(e) => {
                logging::log_fetch_failure(Component::Weather(model), "forecast fetch", &e);
                None
            }
        })
        .collect();

    logging::log_fetch_summary("Weather", fetchers.len(), forecasts.len());
    forecasts
}

/// Runs every wave fetcher concurrently and keeps the successes, in
/// fetcher order.
pub fn fetch_wave_models(
    location: &Location,
    fetchers: &[Box<dyn WaveFetcher>],
) -> Vec<SingleWaveModelForecast> {
    let results: Vec<_> = fetchers
        .par_iter()
        .map(|fetcher| (fetcher.model(), fetcher.fetch(location)))
        .collect();

    let forecasts: Vec<_> = results
        .into_iter()
        .filter_map(|(model, result)| match result {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                logging::log_fetch_failure(Component::Wave(model), "marine fetch", &e);
                None
            }
        })
        .collect();

    if !fetchers.is_empty() {
        logging::log_fetch_summary("Wave", fetchers.len(), forecasts.len());
    }
    forecasts
}

// ============================================================================
// Assembly
// ============================================================================

/// Normalizes and scores already-fetched forecasts. Pure: the same input
/// always yields the same bundle.
pub fn assemble(
    location: Location,
    weather: Vec<SingleModelForecast>,
    waves: Vec<SingleWaveModelForecast>,
    aggregator: &ConfidenceAggregator,
    fetched_at: DateTime<Utc>,
) -> MultiModelForecast {
    let timeline = normalize_forecasts(&weather, &waves);
    let confidence = aggregator.score_all(&timeline);

    MultiModelForecast {
        location,
        fetched_at,
        weather_forecasts: weather,
        wave_forecasts: waves,
        timeline,
        confidence,
    }
}

/// Fetches every model for `location` and returns the scored bundle.
pub fn run(
    location: &Location,
    weather_fetchers: &[Box<dyn WeatherFetcher>],
    wave_fetchers: &[Box<dyn WaveFetcher>],
    aggregator: &ConfidenceAggregator,
) -> MultiModelForecast {
    let fetched_at = Utc::now();

    // Weather and marine endpoints are independent; fetch both sides at once.
    let (weather, waves) = rayon::join(
        || fetch_weather_models(location, weather_fetchers),
        || fetch_wave_models(location, wave_fetchers),
    );

    let bundle = assemble(location.clone(), weather, waves, aggregator, fetched_at);
    logging::info(
        Component::Engine,
        location.name.as_deref(),
        &format!(
            "Scored {} hours from {} weather and {} wave models",
            bundle.timeline.len(),
            bundle.weather_forecasts.len(),
            bundle.wave_forecasts.len()
        ),
    );
    bundle
}

// ============================================================================
// Tests
// ============================================================================
