//! dartdl CLI binary.
//!
//! Interactive downloader for a company's OpenDART disclosure archives.

mod error;
mod integration;

use clap::{ArgAction, Parser};
use dartdl_data::{DartClient, RegistryCache, fetch_disclosures};
use dartdl_output::{DEFAULT_LABEL, RunSummary, SummaryFiles};
use error::AppError;
use integration::archive::{archive_all, progress_bar};
use integration::prompt::{api_key, choose_company, choose_year};
use integration::settings::Settings;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "DARTDL_LOG";

#[derive(Parser)]
#[command(name = "dartdl")]
#[command(about = "dartdl: download a company's OpenDART disclosure archives for one year", long_about = None)]
#[command(version)]
struct Cli {
    /// Folder under which per-company output folders are created
    #[arg(long, value_name = "DIR")]
    output_root: Option<PathBuf>,

    /// Folder holding the cached corporation registry
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Download the corporation registry even if the cache is fresh
    #[arg(long)]
    refresh_registry: bool,

    /// File name stem for the summary files
    #[arg(long, value_name = "NAME", default_value = DEFAULT_LABEL)]
    summary_label: String,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::new(
        cli.output_root,
        cli.cache_dir,
        cli.refresh_registry,
        &cli.summary_label,
    );
    tracing::debug!(?settings, "resolved settings");

    let outcome = tokio::select! {
        result = run(settings) => result,
        _ = tokio::signal::ctrl_c() => Err(AppError::Interrupted),
    };

    match outcome {
        Ok(()) => {}
        Err(AppError::Interrupted) => {
            println!("\nInterrupted.");
            process::exit(AppError::Interrupted.exit_code());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

async fn run(settings: Settings) -> Result<(), AppError> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", "DARTDL: OPENDART DISCLOSURE DOWNLOADER");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let client = DartClient::new(api_key().await?)?;

    let cache = RegistryCache::new(&settings.cache_dir).with_force_refresh(settings.refresh_registry);
    println!("Loading corporation registry ({})...", cache.dir().display());
    let registry = cache.load(&client).await?;
    println!("  {} corporations", registry.len());

    let corp = choose_company(&registry).await?;
    let year = choose_year().await?;

    let out_dir = settings.output_dir(&corp, year);
    std::fs::create_dir_all(&out_dir).map_err(|source| AppError::OutputDir {
        path: out_dir.clone(),
        source,
    })?;
    println!("\nOutput folder: {}", out_dir.display());

    let disclosures = fetch_disclosures(&client, &corp.corp_code, year).await?;
    if disclosures.is_empty() {
        println!("No disclosures found for {} in {year}. Nothing to download.", corp.corp_name);
        return Ok(());
    }
    println!("{} disclosure(s) to process\n", disclosures.len());

    let pb = progress_bar(disclosures.len());
    let summary = archive_all(&client, &corp, &disclosures, &out_dir, Some(&pb)).await;
    pb.finish_and_clear();

    let files = summary.write_all(&out_dir, &settings.summary_label, year);
    print_report(&summary, &files);

    Ok(())
}

fn print_report(summary: &RunSummary, files: &SummaryFiles) {
    let counts = summary.counts();

    println!("\nDone.");
    match &files.xlsx {
        Ok(path) => println!("  Summary (Excel): {}", path.display()),
        Err(e) => println!("  Summary (Excel): not written ({e})"),
    }
    match &files.csv {
        Ok(path) => println!("  Summary (CSV):   {}", path.display()),
        Err(e) => println!("  Summary (CSV):   not written ({e})"),
    }
    println!(
        "  Archives: {} saved, {} already present, {} failed",
        counts.saved, counts.skipped, counts.failed
    );
}
