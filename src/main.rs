mod logging;

use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use series_recom::{Config, DiscoveryProfile, FetchOutcome, ProgressEvent, harvest};
use std::path::PathBuf;
use std::process;

/// Cache TMDB details for the series in your Jellyfin library and for newly aired series
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Directory holding the cached detail records
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Only discover series originating from this country
    #[arg(long, value_name = "CODE")]
    origin_country: Option<String>,

    /// Only discover series first aired on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    since: Option<NaiveDate>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Handles progress events and prints formatted output to stdout
fn handle_progress_event(event: ProgressEvent) {
    match event {
        ProgressEvent::LoadingLibrary { server_url } => {
            println!("=== Reading Library ===");
            println!("Logging into {}...", server_url);
        }
        ProgressEvent::SeriesSkipped { item_id, name } => {
            println!("  Skipping '{}' ({}): no TMDB id", name, item_id);
        }
        ProgressEvent::LibraryLoaded { resolved, skipped } => {
            if skipped == 0 {
                println!("Found {} series in the library\n", resolved);
            } else {
                println!(
                    "Found {} series in the library ({} skipped)\n",
                    resolved, skipped
                );
            }
        }
        ProgressEvent::DiscoveringSeries { profile } => {
            println!("=== Discovering Series ===");
            println!(
                "Origin {}, first aired since {}, excluding {} genre(s)...",
                profile.origin_country,
                profile.min_first_air_date,
                profile.excluded_genres.len()
            );
        }
        ProgressEvent::DiscoveryPage { page, total_pages } => {
            println!("  Page {}/{}", page, total_pages);
        }
        ProgressEvent::DiscoveryComplete { count } => {
            println!("Discovered {} series\n", count);
        }
        ProgressEvent::FetchPlanned { total, duplicates } => {
            println!("=== Fetching Details ===");
            if duplicates > 0 {
                println!(
                    "{} series to check ({} duplicate(s) dropped)",
                    total, duplicates
                );
            } else {
                println!("{} series to check", total);
            }
        }
        ProgressEvent::DetailProcessed {
            index,
            total,
            series_id,
            outcome,
        } => match outcome {
            FetchOutcome::CacheHit { .. } => {}
            FetchOutcome::Stored { path } => {
                println!(
                    "[{}/{}] Downloaded and saved details for {} -> {}",
                    index + 1,
                    total,
                    series_id,
                    path.display()
                );
            }
            FetchOutcome::SkippedMalformed { reason } => {
                println!(
                    "[{}/{}] Skipped {}: {}",
                    index + 1,
                    total,
                    series_id,
                    reason
                );
            }
        },
        ProgressEvent::Complete { summary } => {
            println!(
                "\nDone! {} new record(s), {} already cached, {} malformed response(s).",
                summary.stored, summary.cache_hits, summary.malformed
            );
        }
    }
}

fn main() {
    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet);

    let config = match &cli.env_file {
        Some(path) => Config::from_env_file(path),
        None => Config::from_env(),
    };
    let mut config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Some(cache_dir) = cli.cache_dir {
        config.cache_dir = cache_dir;
    }

    let mut profile = DiscoveryProfile::default();
    if let Some(origin_country) = cli.origin_country {
        profile.origin_country = origin_country.to_uppercase();
    }
    if let Some(since) = cli.since {
        profile.min_first_air_date = since;
    }

    let result = if cli.quiet {
        harvest(&config, &profile, |_| {})
    } else {
        harvest(&config, &profile, handle_progress_event)
    };

    if let Err(e) = result {
        eprintln!("\nError during harvest: {}", e);
        process::exit(1);
    }
}
