/// Forecast model registry.
///
/// Defines the canonical list of weather and wave models this service can
/// compare, along with their Open-Meteo identifiers, forecast horizons and
/// coverage areas. This is the single source of truth for model metadata —
/// other modules should look models up here rather than hardcoding names.

use crate::model::{WaveModel, WeatherModel};

// ---------------------------------------------------------------------------
// Coverage areas
// ---------------------------------------------------------------------------

/// A latitude/longitude box, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub const GLOBAL: BoundingBox = BoundingBox {
        min_latitude: -90.0,
        max_latitude: 90.0,
        min_longitude: -180.0,
        max_longitude: 180.0,
    };

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }
}

// ---------------------------------------------------------------------------
// Model metadata
// ---------------------------------------------------------------------------

/// Metadata for a single atmospheric model.
pub struct WeatherModelInfo {
    pub model: WeatherModel,
    /// Display name.
    pub name: &'static str,
    /// Value of the Open-Meteo `models` query parameter.
    pub open_meteo_id: &'static str,
    /// How far ahead the model runs, in hours.
    pub horizon_hours: u32,
    /// Native grid spacing, km.
    pub resolution_km: f64,
    pub coverage: BoundingBox,
}

/// Metadata for a single wave model.
pub struct WaveModelInfo {
    pub model: WaveModel,
    pub name: &'static str,
    pub open_meteo_id: &'static str,
    pub horizon_hours: u32,
    pub resolution_km: f64,
    pub coverage: BoundingBox,
}

/// Atmospheric models, global models first.
///
/// Sources:
///   - Model ids: Open-Meteo forecast API documentation (open-meteo.com)
///   - Domains: NOAA NCEP model documentation
pub static WEATHER_MODEL_REGISTRY: &[WeatherModelInfo] = &[
    WeatherModelInfo {
        model: WeatherModel::Gfs,
        name: "NOAA GFS",
        open_meteo_id: "gfs_seamless",
        horizon_hours: 384,
        resolution_km: 25.0,
        coverage: BoundingBox::GLOBAL,
    },
    WeatherModelInfo {
        model: WeatherModel::Ecmwf,
        name: "ECMWF IFS",
        open_meteo_id: "ecmwf_ifs025",
        horizon_hours: 360,
        resolution_km: 25.0,
        coverage: BoundingBox::GLOBAL,
    },
    WeatherModelInfo {
        model: WeatherModel::Hrrr,
        name: "NOAA HRRR",
        open_meteo_id: "gfs_hrrr",
        horizon_hours: 48,
        resolution_km: 3.0,
        // Continental US only.
        coverage: BoundingBox {
            min_latitude: 21.1,
            max_latitude: 52.6,
            min_longitude: -134.1,
            max_longitude: -60.9,
        },
    },
    WeatherModelInfo {
        model: WeatherModel::Nam,
        name: "NOAA NAM",
        open_meteo_id: "ncep_nam_conus",
        horizon_hours: 60,
        resolution_km: 3.0,
        coverage: BoundingBox {
            min_latitude: 21.0,
            max_latitude: 53.0,
            min_longitude: -135.0,
            max_longitude: -60.0,
        },
    },
];

/// Wave models.
pub static WAVE_MODEL_REGISTRY: &[WaveModelInfo] = &[
    WaveModelInfo {
        model: WaveModel::GfsWave,
        name: "NOAA GFS-Wave",
        open_meteo_id: "ncep_gfswave025",
        horizon_hours: 384,
        resolution_km: 25.0,
        coverage: BoundingBox::GLOBAL,
    },
    WaveModelInfo {
        model: WaveModel::EcmwfWam,
        name: "ECMWF WAM",
        open_meteo_id: "ecmwf_wam025",
        horizon_hours: 360,
        resolution_km: 25.0,
        coverage: BoundingBox::GLOBAL,
    },
];

/// Looks up an atmospheric model's metadata.
pub fn weather_model_info(model: WeatherModel) -> Option<&'static WeatherModelInfo> {
    WEATHER_MODEL_REGISTRY.iter().find(|m| m.model == model)
}

/// Looks up a wave model's metadata.
pub fn wave_model_info(model: WaveModel) -> Option<&'static WaveModelInfo> {
    WAVE_MODEL_REGISTRY.iter().find(|m| m.model == model)
}

/// Whether an atmospheric model produces data at this point.
pub fn weather_model_covers(model: WeatherModel, latitude: f64, longitude: f64) -> bool {
    weather_model_info(model)
        .map(|m| m.coverage.contains(latitude, longitude))
        .unwrap_or(false)
}

/// Whether a wave model produces data at this point (land masking is only
/// detectable from the response).
pub fn wave_model_covers(model: WaveModel, latitude: f64, longitude: f64) -> bool {
    wave_model_info(model)
        .map(|m| m.coverage.contains(latitude, longitude))
        .unwrap_or(false)
}

/// Atmospheric models covering this point, in registry order.
pub fn weather_models_covering(latitude: f64, longitude: f64) -> Vec<WeatherModel> {
    WEATHER_MODEL_REGISTRY
        .iter()
        .filter(|m| m.coverage.contains(latitude, longitude))
        .map(|m| m.model)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelId;

    #[test]
    fn test_every_weather_model_is_registered_once() {
        for model in WeatherModel::ALL {
            let count = WEATHER_MODEL_REGISTRY.iter().filter(|m| m.model == *model).count();
            assert_eq!(count, 1, "{} should appear exactly once in the registry", model);
        }
    }

    #[test]
    fn test_every_wave_model_is_registered_once() {
        for model in WaveModel::ALL {
            let count = WAVE_MODEL_REGISTRY.iter().filter(|m| m.model == *model).count();
            assert_eq!(count, 1, "{} should appear exactly once in the registry", model);
        }
    }

    #[test]
    fn test_open_meteo_ids_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        let ids = WEATHER_MODEL_REGISTRY
            .iter()
            .map(|m| m.open_meteo_id)
            .chain(WAVE_MODEL_REGISTRY.iter().map(|m| m.open_meteo_id));
        for id in ids {
            assert!(seen.insert(id), "duplicate Open-Meteo id '{}'", id);
        }
    }

    #[test]
    fn test_coverage_boxes_are_well_formed() {
        let boxes = WEATHER_MODEL_REGISTRY
            .iter()
            .map(|m| (m.name, m.coverage))
            .chain(WAVE_MODEL_REGISTRY.iter().map(|m| (m.name, m.coverage)));
        for (name, bbox) in boxes {
            assert!(bbox.min_latitude < bbox.max_latitude, "latitude range inverted for '{}'", name);
            assert!(bbox.min_longitude < bbox.max_longitude, "longitude range inverted for '{}'", name);
        }
    }

    #[test]
    fn test_short_range_models_have_short_horizons() {
        let hrrr = weather_model_info(WeatherModel::Hrrr).unwrap();
        let gfs = weather_model_info(WeatherModel::Gfs).unwrap();
        assert!(hrrr.horizon_hours < gfs.horizon_hours);
    }

    #[test]
    fn test_hrrr_covers_peoria_but_not_london() {
        assert!(weather_model_covers(WeatherModel::Hrrr, 40.69, -89.59));
        assert!(!weather_model_covers(WeatherModel::Hrrr, 51.5, -0.12));
    }

    #[test]
    fn test_global_models_cover_everywhere() {
        for (lat, lon) in [(0.0, 0.0), (-89.9, 179.9), (64.1, -21.9)] {
            assert!(weather_model_covers(WeatherModel::Gfs, lat, lon));
            assert!(weather_model_covers(WeatherModel::Ecmwf, lat, lon));
            assert!(wave_model_covers(WaveModel::GfsWave, lat, lon));
        }
    }

    #[test]
    fn test_models_covering_filters_regional_models() {
        assert_eq!(weather_models_covering(40.69, -89.59).len(), 4);
        assert_eq!(
            weather_models_covering(-33.86, 151.21),
            vec![WeatherModel::Gfs, WeatherModel::Ecmwf]
        );
    }
}
