/// Grid normalization: aligns independent per-model series onto one
/// hourly timeline.
///
/// Models start at different times, end at different horizons and report
/// slightly off the hour. Every timestamp is floored to the top of its hour,
/// the timeline is the union of all wind and wave hours, and each hour carries
/// exactly the models that reported something there. Nothing is interpolated
/// or carried forward.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, DurationRound, Utc};

use crate::model::{
    ModelReadings, ModelSlots, NormalizedTimestamp, PressureReading, SingleModelForecast,
    SingleWaveModelForecast, TemperatureReading, Timestamped, WaveReading, WeatherReading,
    WindReading,
};

// ---------------------------------------------------------------------------
// Hour rounding
// ---------------------------------------------------------------------------

/// Floors a timestamp to the top of its hour (12:03 and 12:58 both map to 12:00).
pub fn floor_to_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    // Truncation only fails on out-of-range timestamps; keep those as-is.
    time.duration_trunc(Duration::hours(1)).unwrap_or(time)
}

/// Builds an hour -> reading table. When a series has two readings in the
/// same hour the first one wins.
fn index_by_hour<T: Timestamped>(series: &[T]) -> HashMap<DateTime<Utc>, &T> {
    let mut table = HashMap::with_capacity(series.len());
    for reading in series {
        table.entry(floor_to_hour(reading.time())).or_insert(reading);
    }
    table
}

/// Independent lookup tables for one weather model.
struct ModelTables<'a> {
    wind: HashMap<DateTime<Utc>, &'a WindReading>,
    temperature: HashMap<DateTime<Utc>, &'a TemperatureReading>,
    weather: HashMap<DateTime<Utc>, &'a WeatherReading>,
    pressure: HashMap<DateTime<Utc>, &'a PressureReading>,
}

impl<'a> ModelTables<'a> {
    fn new(forecast: &'a SingleModelForecast) -> Self {
        Self {
            wind: index_by_hour(&forecast.wind),
            temperature: index_by_hour(&forecast.temperature),
            weather: index_by_hour(&forecast.weather),
            pressure: index_by_hour(&forecast.pressure),
        }
    }

    /// The model's bundle at `hour`, or `None` when no family has a value.
    fn readings_at(&self, hour: &DateTime<Utc>) -> Option<ModelReadings> {
        let readings = ModelReadings {
            wind: self.wind.get(hour).map(|r| (*r).clone()),
            temperature: self.temperature.get(hour).map(|r| (*r).clone()),
            weather: self.weather.get(hour).map(|r| (*r).clone()),
            pressure: self.pressure.get(hour).map(|r| (*r).clone()),
        };
        readings.has_any().then_some(readings)
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Merges weather and wave forecasts onto a sorted, de-duplicated hourly grid.
///
/// The timeline is the union of every weather model's wind hours and every
/// wave model's wave hours. Temperature, weather and pressure are attached
/// where present but never add hours of their own. Empty input yields an
/// empty grid.
pub fn normalize_forecasts(
    weather: &[SingleModelForecast],
    waves: &[SingleWaveModelForecast],
) -> Vec<NormalizedTimestamp> {
    let mut hours = BTreeSet::new();
    for forecast in weather {
        hours.extend(forecast.wind.iter().map(|r| floor_to_hour(r.time)));
    }
    for forecast in waves {
        hours.extend(forecast.waves.iter().map(|r| floor_to_hour(r.time)));
    }

    let weather_tables: Vec<_> = weather
        .iter()
        .map(|forecast| (forecast.model, ModelTables::new(forecast)))
        .collect();
    let wave_tables: Vec<_> = waves
        .iter()
        .map(|forecast| (forecast.model, index_by_hour::<WaveReading>(&forecast.waves)))
        .collect();

    // BTreeSet iteration is already hour-ascending.
    hours
        .into_iter()
        .map(|hour| {
            let mut models = ModelSlots::new();
            for (model, tables) in &weather_tables {
                if let Some(readings) = tables.readings_at(&hour) {
                    models.insert(*model, readings);
                }
            }

            let mut wave_models = ModelSlots::new();
            for (model, table) in &wave_tables {
                if let Some(reading) = table.get(&hour) {
                    wave_models.insert(*model, (*reading).clone());
                }
            }

            NormalizedTimestamp { time: hour, models, wave_models }
        })
        .collect()
}

/// Last timestamp any series of a weather forecast reports, used to fill
/// `available_through`.
pub fn last_weather_time(forecast: &SingleModelForecast) -> Option<DateTime<Utc>> {
    let wind = forecast.wind.iter().map(|r| r.time);
    let temperature = forecast.temperature.iter().map(|r| r.time);
    let weather = forecast.weather.iter().map(|r| r.time);
    let pressure = forecast.pressure.iter().map(|r| r.time);
    wind.chain(temperature).chain(weather).chain(pressure).max()
}

/// Last timestamp of a wave forecast.
pub fn last_wave_time(forecast: &SingleWaveModelForecast) -> Option<DateTime<Utc>> {
    forecast.waves.iter().map(|r| r.time).max()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
