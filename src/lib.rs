/// Multi-model forecast consensus.
///
/// Aligns hourly forecasts from several weather and wave models for one
/// point onto a common timeline and scores, hour by hour, how closely the
/// models agree.
///
/// Modules:
/// - `model`        — shared domain types and error enums.
/// - `normalize`    — hourly grid normalization.
/// - `confidence`   — agreement evaluators, scoring table and aggregator.
/// - `orchestrator` — parallel fetch, failure tolerance, assembly.
/// - `ingest`       — Open-Meteo fetch/parse boundary.
/// - `models`       — model registry (ids, horizons, coverage).
/// - `config`       — TOML configuration.
/// - `summary`      — roll-ups for reports.
/// - `logging`      — console/file logger.

pub mod confidence;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod summary;

pub use confidence::{calculate_confidence, ConfidenceAggregator, ScoringConfig};
pub use normalize::normalize_forecasts;
pub use orchestrator::{assemble, run};
