/// Fetch/parse boundary: turns forecast API responses into the per-model
/// series the consensus engine consumes.
///
/// Submodules:
/// - `open_meteo` — forecast and marine API clients for every supported model.

pub mod open_meteo;
