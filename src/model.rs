/// Core data types for the multi-model forecast consensus engine.
///
/// This module defines the shared domain model imported by all other modules:
/// model identifiers, per-family readings, the per-model forecast series
/// handed over by the fetch layer, and the normalized/scored output types.
/// It contains no I/O — only types and a few small accessors.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

// ---------------------------------------------------------------------------
// Model identifiers
// ---------------------------------------------------------------------------

/// A closed set of model identifiers that can index a fixed-size slot array.
pub trait ModelId: Copy + Eq + fmt::Debug + 'static {
    /// Every identifier, in slot order.
    const ALL: &'static [Self];

    /// Position of this identifier in `ALL`.
    fn index(self) -> usize;

    /// Stable snake_case identifier used in config files and JSON output.
    fn id(self) -> &'static str;
}

/// Atmospheric forecast models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherModel {
    Gfs,
    Ecmwf,
    Hrrr,
    Nam,
}

impl ModelId for WeatherModel {
    const ALL: &'static [Self] = &[
        WeatherModel::Gfs,
        WeatherModel::Ecmwf,
        WeatherModel::Hrrr,
        WeatherModel::Nam,
    ];

    fn index(self) -> usize {
        match self {
            WeatherModel::Gfs => 0,
            WeatherModel::Ecmwf => 1,
            WeatherModel::Hrrr => 2,
            WeatherModel::Nam => 3,
        }
    }

    fn id(self) -> &'static str {
        match self {
            WeatherModel::Gfs => "gfs",
            WeatherModel::Ecmwf => "ecmwf",
            WeatherModel::Hrrr => "hrrr",
            WeatherModel::Nam => "nam",
        }
    }
}

impl fmt::Display for WeatherModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherModel::Gfs => write!(f, "GFS"),
            WeatherModel::Ecmwf => write!(f, "ECMWF"),
            WeatherModel::Hrrr => write!(f, "HRRR"),
            WeatherModel::Nam => write!(f, "NAM"),
        }
    }
}

/// Ocean wave forecast models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveModel {
    GfsWave,
    EcmwfWam,
}

impl ModelId for WaveModel {
    const ALL: &'static [Self] = &[WaveModel::GfsWave, WaveModel::EcmwfWam];

    fn index(self) -> usize {
        match self {
            WaveModel::GfsWave => 0,
            WaveModel::EcmwfWam => 1,
        }
    }

    fn id(self) -> &'static str {
        match self {
            WaveModel::GfsWave => "gfs_wave",
            WaveModel::EcmwfWam => "ecmwf_wam",
        }
    }
}

impl fmt::Display for WaveModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveModel::GfsWave => write!(f, "GFS-Wave"),
            WaveModel::EcmwfWam => write!(f, "ECMWF-WAM"),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-model slots
// ---------------------------------------------------------------------------

/// One optional value per model, indexed by the model identifier.
///
/// An empty slot means the model had nothing at this point; it is never
/// conflated with a zero reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSlots<K: ModelId, T> {
    slots: Vec<Option<T>>,
    _model: PhantomData<K>,
}

impl<K: ModelId, T> ModelSlots<K, T> {
    pub fn new() -> Self {
        Self {
            slots: K::ALL.iter().map(|_| None).collect(),
            _model: PhantomData,
        }
    }

    pub fn get(&self, model: K) -> Option<&T> {
        self.slots[model.index()].as_ref()
    }

    pub fn insert(&mut self, model: K, value: T) {
        self.slots[model.index()] = Some(value);
    }

    pub fn contains(&self, model: K) -> bool {
        self.slots[model.index()].is_some()
    }

    /// Present entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        K::ALL
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(model, slot)| slot.as_ref().map(|value| (*model, value)))
    }

    pub fn models(&self) -> Vec<K> {
        self.iter().map(|(model, _)| model).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: ModelId, T> Default for ModelSlots<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ModelId, T: Serialize> Serialize for ModelSlots<K, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (model, value) in self.iter() {
            map.serialize_entry(model.id(), value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// Anything placed on the forecast timeline.
pub trait Timestamped {
    fn time(&self) -> DateTime<Utc>;
}

/// 10 m wind for one hour. Speeds in mph, direction in compass degrees
/// (the direction the wind blows from).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindReading {
    pub time: DateTime<Utc>,
    pub speed_mph: f64,
    pub gusts_mph: Option<f64>,
    pub direction_deg: Option<f64>,
}

/// 2 m air temperature, °F.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub time: DateTime<Utc>,
    pub temperature_f: f64,
    pub feels_like_f: Option<f64>,
}

/// Precipitation and sky state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReading {
    pub time: DateTime<Utc>,
    /// 0–100 %.
    pub precip_probability: Option<f64>,
    pub precipitation_in: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
}

/// Mean sea level pressure, inHg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PressureReading {
    pub time: DateTime<Utc>,
    pub pressure_inhg: f64,
}

/// Significant wave height (ft), mean direction (degrees) and period (s).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveReading {
    pub time: DateTime<Utc>,
    pub height_ft: f64,
    pub direction_deg: Option<f64>,
    pub period_s: Option<f64>,
}

macro_rules! impl_timestamped {
    ($($ty:ty),*) => {
        $(impl Timestamped for $ty {
            fn time(&self) -> DateTime<Utc> {
                self.time
            }
        })*
    };
}

impl_timestamped!(WindReading, TemperatureReading, WeatherReading, PressureReading, WaveReading);

// ---------------------------------------------------------------------------
// Per-model forecasts (input from the fetch layer)
// ---------------------------------------------------------------------------

/// One weather model's complete output for a location.
///
/// Each series is sparse and independent: a model may report wind at an
/// hour where it has no pressure value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleModelForecast {
    pub model: WeatherModel,
    pub fetched_at: DateTime<Utc>,
    /// Last timestamp with any data, `None` if every series is empty.
    pub available_through: Option<DateTime<Utc>>,
    pub wind: Vec<WindReading>,
    pub temperature: Vec<TemperatureReading>,
    pub weather: Vec<WeatherReading>,
    pub pressure: Vec<PressureReading>,
}

/// One wave model's complete output for a location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleWaveModelForecast {
    pub model: WaveModel,
    pub fetched_at: DateTime<Utc>,
    pub available_through: Option<DateTime<Utc>>,
    pub waves: Vec<WaveReading>,
}

// ---------------------------------------------------------------------------
// Normalized grid
// ---------------------------------------------------------------------------

/// Everything one weather model reported for a single hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelReadings {
    pub wind: Option<WindReading>,
    pub temperature: Option<TemperatureReading>,
    pub weather: Option<WeatherReading>,
    pub pressure: Option<PressureReading>,
}

impl ModelReadings {
    pub fn has_any(&self) -> bool {
        self.wind.is_some()
            || self.temperature.is_some()
            || self.weather.is_some()
            || self.pressure.is_some()
    }
}

/// One hour on the common timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTimestamp {
    pub time: DateTime<Utc>,
    pub models: ModelSlots<WeatherModel, ModelReadings>,
    pub wave_models: ModelSlots<WaveModel, WaveReading>,
}

// ---------------------------------------------------------------------------
// Confidence output
// ---------------------------------------------------------------------------

/// Parameters tracked by the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    WindSpeed,
    WindGusts,
    WindDirection,
    PrecipProbability,
    WaveHeight,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::WindSpeed => write!(f, "wind speed"),
            Parameter::WindGusts => write!(f, "wind gusts"),
            Parameter::WindDirection => write!(f, "wind direction"),
            Parameter::PrecipProbability => write!(f, "precipitation"),
            Parameter::WaveHeight => write!(f, "wave height"),
        }
    }
}

/// Verdict for one parameter at one hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterAgreement {
    pub parameter: Parameter,
    pub agrees: bool,
    pub spread: f64,
    /// Threshold actually applied, after model-count scaling.
    pub threshold: f64,
    /// Models with a non-null value for this parameter at this hour.
    pub models_compared: usize,
    pub weight: f64,
}

/// Coarse confidence bands, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Moderate,
    High,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::Low => write!(f, "low"),
            ConfidenceLevel::Moderate => write!(f, "moderate"),
            ConfidenceLevel::High => write!(f, "high"),
        }
    }
}

/// Per-hour roll-up of every parameter verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceScore {
    pub time: DateTime<Utc>,
    /// 0–100.
    pub overall: u8,
    pub level: ConfidenceLevel,
    pub breakdown: Vec<ParameterAgreement>,
    pub models_available: Vec<WeatherModel>,
    pub wave_models_available: Vec<WaveModel>,
}

// ---------------------------------------------------------------------------
// Location & bundle
// ---------------------------------------------------------------------------

/// A forecast point, WGS84.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything produced for one location: raw forecasts, the normalized
/// timeline and the parallel confidence scores.
///
/// `timeline` and `confidence` always have the same length and hour order.
#[derive(Debug, Clone, Serialize)]
pub struct MultiModelForecast {
    pub location: Location,
    pub fetched_at: DateTime<Utc>,
    pub weather_forecasts: Vec<SingleModelForecast>,
    pub wave_forecasts: Vec<SingleWaveModelForecast>,
    pub timeline: Vec<NormalizedTimestamp>,
    pub confidence: Vec<ConfidenceScore>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or parsing a single model's forecast.
#[derive(Debug, PartialEq)]
pub enum FetchError {
    /// Non-2xx HTTP response from the forecast API.
    HttpError(u16),
    /// The request could not be sent or the body could not be read.
    Request(String),
    /// The response body could not be deserialized.
    ParseError(String),
    /// The model does not cover the requested point.
    OutsideCoverage { model: String, latitude: f64, longitude: f64 },
    /// The response contained no usable values (empty, all null, or a
    /// land-masked wave series).
    NoDataAvailable(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::HttpError(code) => write!(f, "HTTP error: {}", code),
            FetchError::Request(msg) => write!(f, "Request failed: {}", msg),
            FetchError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FetchError::OutsideCoverage { model, latitude, longitude } => write!(
                f,
                "Outside coverage: {} does not cover {:.4},{:.4}",
                model, latitude, longitude
            ),
            FetchError::NoDataAvailable(msg) => write!(f, "No data available: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}
