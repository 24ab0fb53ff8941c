/// Open-Meteo Forecast & Marine API Client
///
/// Retrieves hourly single-model forecasts (GFS, ECMWF, HRRR, NAM) and wave
/// model forecasts (GFS-Wave, ECMWF-WAM) for one point, and converts them
/// into the per-model series the consensus engine consumes: mph, °F, inHg
/// and feet, with JSON nulls mapped to absent readings.
///
/// API Documentation: https://open-meteo.com/en/docs
/// Marine API: https://open-meteo.com/en/docs/marine-weather-api

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::model::{
    FetchError, Location, PressureReading, SingleModelForecast, SingleWaveModelForecast,
    TemperatureReading, WaveModel, WaveReading, WeatherModel, WeatherReading, WindReading,
};
use crate::models::{wave_model_covers, wave_model_info, weather_model_covers, weather_model_info};
use crate::normalize::{last_wave_time, last_weather_time};
use crate::orchestrator::{WaveFetcher, WeatherFetcher};

const FORECAST_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
const MARINE_BASE_URL: &str = "https://marine-api.open-meteo.com/v1/marine";

const FORECAST_HOURLY_FIELDS: &str = "wind_speed_10m,wind_gusts_10m,wind_direction_10m,\
temperature_2m,apparent_temperature,precipitation_probability,precipitation,cloud_cover,pressure_msl";
const MARINE_HOURLY_FIELDS: &str = "wave_height,wave_direction,wave_period";

/// hPa -> inHg
pub const HPA_TO_INHG: f64 = 0.0295299830714;
/// metres -> feet
pub const METERS_TO_FEET: f64 = 3.28084;

// ============================================================================
// API Response Structures
// ============================================================================

/// Forecast API response (single model requested).
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub error: bool,
    pub reason: Option<String>,
    pub hourly: Option<ForecastHourly>,
}

/// Column-oriented hourly block; every column is parallel to `time`.
#[derive(Debug, Deserialize)]
pub struct ForecastHourly {
    pub time: Vec<String>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_gusts_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_direction_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    pub pressure_msl: Vec<Option<f64>>,
}

/// Marine API response.
#[derive(Debug, Deserialize)]
pub struct MarineResponse {
    #[serde(default)]
    pub error: bool,
    pub reason: Option<String>,
    pub hourly: Option<MarineHourly>,
}

#[derive(Debug, Deserialize)]
pub struct MarineHourly {
    pub time: Vec<String>,
    #[serde(default)]
    pub wave_height: Vec<Option<f64>>, // metres
    #[serde(default)]
    pub wave_direction: Vec<Option<f64>>, // degrees
    #[serde(default)]
    pub wave_period: Vec<Option<f64>>, // seconds
}

// ============================================================================
// URL Construction
// ============================================================================

/// Builds a forecast request for one atmospheric model.
pub fn build_forecast_url(model: WeatherModel, location: &Location, forecast_days: u32) -> String {
    let model_id = weather_model_info(model).map(|m| m.open_meteo_id).unwrap_or("best_match");
    format!(
        "{}?latitude={:.4}&longitude={:.4}&hourly={}&models={}&wind_speed_unit=mph&temperature_unit=fahrenheit&precipitation_unit=inch&timezone=GMT&forecast_days={}",
        FORECAST_BASE_URL,
        location.latitude,
        location.longitude,
        FORECAST_HOURLY_FIELDS,
        model_id,
        forecast_days
    )
}

/// Builds a marine request for one wave model.
pub fn build_marine_url(model: WaveModel, location: &Location, forecast_days: u32) -> String {
    let model_id = wave_model_info(model).map(|m| m.open_meteo_id).unwrap_or("best_match");
    format!(
        "{}?latitude={:.4}&longitude={:.4}&hourly={}&models={}&timezone=GMT&forecast_days={}",
        MARINE_BASE_URL,
        location.latitude,
        location.longitude,
        MARINE_HOURLY_FIELDS,
        model_id,
        forecast_days
    )
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses Open-Meteo hourly times ("2024-05-01T12:00", GMT) or full RFC 3339.
fn parse_time(raw: &str) -> Result<DateTime<Utc>, FetchError> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FetchError::ParseError(format!("bad timestamp '{}': {}", raw, e)))
}

/// Value at `i`, treating short columns and nulls alike as absent.
fn column(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

fn api_error(reason: Option<String>) -> FetchError {
    FetchError::ParseError(format!(
        "API returned an error: {}",
        reason.unwrap_or_else(|| "no reason given".to_string())
    ))
}

/// Parses a forecast response body into one model's series.
pub fn parse_forecast_response(
    model: WeatherModel,
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<SingleModelForecast, FetchError> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|e| FetchError::ParseError(e.to_string()))?;
    if response.error {
        return Err(api_error(response.reason));
    }
    let hourly = response
        .hourly
        .ok_or_else(|| FetchError::ParseError("response has no hourly block".to_string()))?;

    let mut forecast = SingleModelForecast {
        model,
        fetched_at,
        available_through: None,
        wind: Vec::new(),
        temperature: Vec::new(),
        weather: Vec::new(),
        pressure: Vec::new(),
    };

    for (i, raw_time) in hourly.time.iter().enumerate() {
        let time = parse_time(raw_time)?;

        if let Some(speed_mph) = column(&hourly.wind_speed_10m, i) {
            forecast.wind.push(WindReading {
                time,
                speed_mph,
                gusts_mph: column(&hourly.wind_gusts_10m, i),
                direction_deg: column(&hourly.wind_direction_10m, i),
            });
        }

        if let Some(temperature_f) = column(&hourly.temperature_2m, i) {
            forecast.temperature.push(TemperatureReading {
                time,
                temperature_f,
                feels_like_f: column(&hourly.apparent_temperature, i),
            });
        }

        let precip_probability = column(&hourly.precipitation_probability, i);
        let precipitation_in = column(&hourly.precipitation, i);
        let cloud_cover_pct = column(&hourly.cloud_cover, i);
        if precip_probability.is_some() || precipitation_in.is_some() || cloud_cover_pct.is_some() {
            forecast.weather.push(WeatherReading {
                time,
                precip_probability,
                precipitation_in,
                cloud_cover_pct,
            });
        }

        if let Some(hpa) = column(&hourly.pressure_msl, i) {
            forecast.pressure.push(PressureReading {
                time,
                pressure_inhg: hpa * HPA_TO_INHG,
            });
        }
    }

    forecast.available_through = last_weather_time(&forecast);
    if forecast.available_through.is_none() {
        return Err(FetchError::NoDataAvailable(format!(
            "{} returned no non-null hourly values",
            model
        )));
    }
    Ok(forecast)
}

/// Parses a marine response body into one wave model's series.
///
/// Heights are converted to feet and null hours dropped. A series whose
/// heights are all zero is the model treating the point as land and is
/// rejected.
pub fn parse_marine_response(
    model: WaveModel,
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<SingleWaveModelForecast, FetchError> {
    let response: MarineResponse =
        serde_json::from_str(body).map_err(|e| FetchError::ParseError(e.to_string()))?;
    if response.error {
        return Err(api_error(response.reason));
    }
    let hourly = response
        .hourly
        .ok_or_else(|| FetchError::ParseError("response has no hourly block".to_string()))?;

    let mut waves = Vec::new();
    for (i, raw_time) in hourly.time.iter().enumerate() {
        let Some(height_m) = column(&hourly.wave_height, i) else {
            continue;
        };
        waves.push(WaveReading {
            time: parse_time(raw_time)?,
            height_ft: height_m * METERS_TO_FEET,
            direction_deg: column(&hourly.wave_direction, i),
            period_s: column(&hourly.wave_period, i),
        });
    }

    if waves.is_empty() {
        return Err(FetchError::NoDataAvailable(format!("{} returned no wave heights", model)));
    }
    if waves.iter().all(|w| w.height_ft == 0.0) {
        return Err(FetchError::NoDataAvailable(format!(
            "{}: all wave heights are zero (land point)",
            model
        )));
    }

    let mut forecast = SingleWaveModelForecast {
        model,
        fetched_at,
        available_through: None,
        waves,
    };
    forecast.available_through = last_wave_time(&forecast);
    Ok(forecast)
}

// ============================================================================
// API Client
// ============================================================================

/// Shared blocking HTTP client with a request timeout.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, FetchError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| FetchError::Request(e.to_string()))
}

fn get_body(client: &reqwest::blocking::Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| FetchError::Request(e.to_string()))?;

    if !response.status().is_success() {
        return Err(FetchError::HttpError(response.status().as_u16()));
    }

    response.text().map_err(|e| FetchError::Request(e.to_string()))
}

/// Fetches one atmospheric model from the forecast API.
pub struct OpenMeteoFetcher {
    client: reqwest::blocking::Client,
    model: WeatherModel,
    forecast_days: u32,
}

impl OpenMeteoFetcher {
    pub fn new(client: reqwest::blocking::Client, model: WeatherModel, forecast_days: u32) -> Self {
        Self { client, model, forecast_days }
    }
}

impl WeatherFetcher for OpenMeteoFetcher {
    fn model(&self) -> WeatherModel {
        self.model
    }

    fn fetch(&self, location: &Location) -> Result<SingleModelForecast, FetchError> {
        if !weather_model_covers(self.model, location.latitude, location.longitude) {
            return Err(FetchError::OutsideCoverage {
                model: self.model.to_string(),
                latitude: location.latitude,
                longitude: location.longitude,
            });
        }

        let url = build_forecast_url(self.model, location, self.forecast_days);
        let body = get_body(&self.client, &url)?;
        parse_forecast_response(self.model, &body, Utc::now())
    }
}

/// Fetches one wave model from the marine API.
pub struct OpenMeteoWaveFetcher {
    client: reqwest::blocking::Client,
    model: WaveModel,
    forecast_days: u32,
}

impl OpenMeteoWaveFetcher {
    pub fn new(client: reqwest::blocking::Client, model: WaveModel, forecast_days: u32) -> Self {
        Self { client, model, forecast_days }
    }
}

impl WaveFetcher for OpenMeteoWaveFetcher {
    fn model(&self) -> WaveModel {
        self.model
    }

    fn fetch(&self, location: &Location) -> Result<SingleWaveModelForecast, FetchError> {
        if !wave_model_covers(self.model, location.latitude, location.longitude) {
            return Err(FetchError::OutsideCoverage {
                model: self.model.to_string(),
                latitude: location.latitude,
                longitude: location.longitude,
            });
        }

        let url = build_marine_url(self.model, location, self.forecast_days);
        let body = get_body(&self.client, &url)?;
        parse_marine_response(self.model, &body, Utc::now())
    }
}

// ============================================================================
// Tests
// ============================================================================
