//! location-history-kml - Convert a location-history JSON export to KML
//!
//! Usage:
//!   location-history-kml <input.json> <output.kml> [options]
//!
//! Examples:
//!   location-history-kml history.json out.kml
//!   location-history-kml history.json out.kml --start-date 2024-01-01 --end-date 2024-12-31
//!   location-history-kml history.json out.kml --no-visits --group-by-day

use clap::Parser;
use location_history_kml::{convert_file, parse_date_bound, ConvertConfig, Result, RunStats};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "location-history-kml")]
#[command(about = "Convert location history JSON to KML format", long_about = None)]
struct Cli {
    /// Input location history JSON file
    input_file: PathBuf,

    /// Output KML file
    output_file: PathBuf,

    /// Start date filter (YYYY-MM-DD, optionally with time)
    #[arg(long)]
    start_date: Option<String>,

    /// End date filter (YYYY-MM-DD, optionally with time)
    #[arg(long)]
    end_date: Option<String>,

    /// Minimum accuracy threshold in meters (records carry no accuracy; accepted for compatibility)
    #[arg(long)]
    min_accuracy: Option<f64>,

    /// Exclude activity data (also drops their tracks)
    #[arg(long)]
    no_activities: bool,

    /// Exclude visit data
    #[arg(long)]
    no_visits: bool,

    /// Exclude movement tracks
    #[arg(long)]
    no_tracks: bool,

    /// Organize output into daily folders with activities, visits and tracks subfolders
    #[arg(long)]
    group_by_day: bool,

    /// Also print the run statistics as JSON
    #[arg(long)]
    stats_json: bool,
}

impl Cli {
    fn to_config(&self) -> Result<ConvertConfig> {
        let start_date = self.start_date.as_deref().map(parse_date_bound).transpose()?;
        let end_date = self.end_date.as_deref().map(parse_date_bound).transpose()?;

        let config = ConvertConfig {
            start_date,
            end_date,
            min_accuracy: self.min_accuracy,
            include_activities: !self.no_activities,
            include_visits: !self.no_visits,
            include_tracks: !self.no_tracks,
            group_by_day: self.group_by_day,
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(stats) => {
            println!("Conversion completed successfully!");
            println!("\n{}", stats);
            if cli.stats_json {
                match serde_json::to_string_pretty(&stats) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("Error: cannot encode statistics: {}", e),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunStats> {
    let config = cli.to_config()?;
    convert_file(&cli.input_file, &cli.output_file, &config)
}
