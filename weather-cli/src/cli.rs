use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use std::{path::PathBuf, sync::Arc};
use weather_core::{
    Config, ReportSource, SourceId, SqliteStore, TemperatureReport, WeatherError, WeatherRouter,
    validate_coordinates, validate_request,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Daily max/min temperatures with a local cache")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure source URLs, cache location and routing windows.
    Configure,

    /// Show max/min temperature for a date and location.
    Show {
        /// Date as YYYY-MM-DD. Future dates are averaged from cached history.
        #[arg(long)]
        date: String,

        /// Latitude in decimal degrees.
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        /// Longitude in decimal degrees.
        #[arg(long, allow_hyphen_values = true)]
        lon: String,
    },

    /// Fetch and cache archive history for a location.
    Backfill {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        #[arg(long, allow_hyphen_values = true)]
        lon: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            command => execute(command, &config).await,
        }
    }
}

async fn execute(command: Command, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Configure => configure(config.clone()),
        Command::Show { date, lat, lon } => {
            let request = validate_request(&date, &lat, &lon).map_err(user_facing)?;
            let router = open_router(config)?;
            let report = router.lookup(&request).await.map_err(user_facing)?;
            print_report(&report);
            Ok(())
        }
        Command::Backfill { lat, lon } => {
            let coordinates = validate_coordinates(&lat, &lon).map_err(user_facing)?;
            let router = open_router(config)?;
            let written = router.backfill(coordinates).await.map_err(user_facing)?;
            println!("Stored {written} day(s) of history for {}", coordinates.rounded());
            Ok(())
        }
    }
}

fn open_router(config: &Config) -> anyhow::Result<WeatherRouter> {
    let path = config.database_path()?;
    let store = SqliteStore::open(&path)
        .with_context(|| format!("Failed to open cache database: {}", path.display()))?;
    Ok(WeatherRouter::from_config(config, Arc::new(store)))
}

fn user_facing(err: WeatherError) -> anyhow::Error {
    tracing::debug!("lookup failed: {err}");
    anyhow!(err.user_message())
}

fn print_report(report: &TemperatureReport) {
    let label = match report.source {
        ReportSource::HistoricalAverage { .. } => "Average",
        _ => "Observed",
    };
    println!("{} at {} ({})", report.date, report.coordinates, report.source);
    println!("  {label} max: {:.2}°C", report.max_temperature);
    println!("  {label} min: {:.2}°C", report.min_temperature);
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    for id in SourceId::all() {
        let url = Text::new(&format!("Base URL for the {id} source:"))
            .with_default(config.source_base_url(*id))
            .prompt()?;
        if url.trim() != id.default_base_url() || config.is_source_overridden(*id) {
            config.upsert_source_base_url(*id, url.trim().to_string());
        }
    }

    let current_db = config.database_path()?;
    let db = Text::new("Cache database path:")
        .with_default(&current_db.display().to_string())
        .prompt()?;
    config.set_cache_path(PathBuf::from(db.trim()), &Config::default_database_path()?);

    config.routing.forecast_window_days = CustomType::<u32>::new("Days served by the forecast source:")
        .with_default(config.routing.forecast_window_days)
        .prompt()?;
    config.routing.history_years = CustomType::<u32>::new("Years of history to average for future dates:")
        .with_default(config.routing.history_years)
        .prompt()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
