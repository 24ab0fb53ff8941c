//! Command-line front end: fetch every configured model for the configured
//! point and print the hour-by-hour agreement.
//!
//! Usage: model_consensus [config-path] [--json]

use std::error::Error;

use model_consensus::config::{self, EngineConfig};
use model_consensus::ingest::open_meteo::{self, OpenMeteoFetcher, OpenMeteoWaveFetcher};
use model_consensus::logging::{self, Component};
use model_consensus::model::{ConfidenceScore, MultiModelForecast};
use model_consensus::orchestrator::{self, WaveFetcher, WeatherFetcher};
use model_consensus::summary::{model_horizons, summarize};
use model_consensus::ConfidenceAggregator;

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let mut json = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                println!("Usage: model_consensus [config-path] [--json]");
                return Ok(());
            }
            other => path = Some(other.to_string()),
        }
    }
    let path = path.unwrap_or_else(config::config_path_from_env);

    let config = config::load_config(&path)?;
    logging::init_logger(config.log_level, config.log_file.as_deref(), config.console_timestamps);
    logging::info(Component::System, Some(path.as_str()), "Configuration loaded");

    let forecast = fetch(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
    } else {
        print_report(&forecast);
    }
    Ok(())
}

fn fetch(config: &EngineConfig) -> Result<MultiModelForecast, Box<dyn Error>> {
    let client = open_meteo::build_client(config.timeout_secs)?;

    let weather: Vec<Box<dyn WeatherFetcher>> = config
        .weather_models
        .iter()
        .map(|model| {
            Box::new(OpenMeteoFetcher::new(client.clone(), *model, config.forecast_days))
                as Box<dyn WeatherFetcher>
        })
        .collect();
    let waves: Vec<Box<dyn WaveFetcher>> = config
        .wave_models
        .iter()
        .map(|model| {
            Box::new(OpenMeteoWaveFetcher::new(client.clone(), *model, config.forecast_days))
                as Box<dyn WaveFetcher>
        })
        .collect();

    let aggregator = ConfidenceAggregator::new(config.scoring.clone());
    Ok(orchestrator::run(&config.location, &weather, &waves, &aggregator))
}

fn models_cell(score: &ConfidenceScore) -> String {
    let mut names: Vec<String> = score.models_available.iter().map(|m| m.to_string()).collect();
    names.extend(score.wave_models_available.iter().map(|m| m.to_string()));
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

fn print_report(forecast: &MultiModelForecast) {
    let place = forecast.location.name.clone().unwrap_or_else(|| {
        format!("{:.4}, {:.4}", forecast.location.latitude, forecast.location.longitude)
    });

    println!("═══════════════════════════════════════════════════════════");
    println!("MODEL AGREEMENT — {}", place);
    println!("═══════════════════════════════════════════════════════════");

    for (model, through) in model_horizons(forecast) {
        match through {
            Some(t) => println!("  {:<10} through {}", model, t.format("%Y-%m-%d %H:%M UTC")),
            None => println!("  {:<10} no data", model),
        }
    }
    println!();

    println!("{:<18} {:>5}  {:<9} Models", "Hour (UTC)", "Score", "Level");
    for score in &forecast.confidence {
        println!(
            "{:<18} {:>5}  {:<9} {}",
            score.time.format("%Y-%m-%d %H:%M"),
            score.overall,
            score.level,
            models_cell(score)
        );
    }

    let summary = summarize(&forecast.confidence);
    println!();
    match summary.average_score {
        Some(avg) => println!("Average score: {:.1} over {} hours", avg, summary.hours),
        None => println!("No hours to score"),
    }
    println!(
        "High: {}  Moderate: {}  Low: {}",
        summary.high_hours, summary.moderate_hours, summary.low_hours
    );
    if let Some(first_low) = summary.first_low_hour {
        println!("First low-confidence hour: {}", first_low.format("%Y-%m-%d %H:%M UTC"));
    }
}
