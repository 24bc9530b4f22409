mod fetcher;
mod model;
mod normalize;
mod query;
mod settings;
mod snapshot;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use fetcher::{harvest, HttpPageSource};
use model::RunResult;
use settings::Settings;

#[derive(Parser)]
#[command(name = "brainport_jobs", about = "Brainport Eindhoven vacancy downloader")]
struct Cli {
    /// Snapshot file (default: jobs.json)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every page and write a fresh snapshot (the default)
    Fetch,
    /// Search the saved snapshot by title, company, location or description
    Search {
        query: String,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Export the saved snapshot (optionally filtered) to CSV
    Export {
        query: Option<String>,
        /// CSV path (default: brainport_jobs_export_<date>.csv)
        #[arg(short, long)]
        csv: Option<PathBuf>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load().context("Invalid BRAINPORT_* settings")?;
    if let Some(output) = cli.output {
        settings.output_path = output;
    }

    let result = match cli.command.unwrap_or(Commands::Fetch) {
        Commands::Fetch => {
            download(&settings);
            Ok(())
        }
        Commands::Search { query, limit } => search(&settings, &query, limit),
        Commands::Export { query, csv } => export(&settings, query.as_deref().unwrap_or(""), csv),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Fetch every page, then write whatever was collected. Failures are
/// logged, never returned.
fn download(settings: &Settings) {
    println!("Starting download...");
    info!(endpoint = %settings.endpoint, output = ?settings.output_path, "fetch run");

    let collected = match HttpPageSource::new(settings) {
        Ok(source) => harvest(&source, settings.delay()),
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            Default::default()
        }
    };

    let total = collected.jobs.len();
    let doc = RunResult::now(collected.jobs);
    match snapshot::write_snapshot(&settings.output_path, &doc) {
        Ok(()) => {
            println!("\nSuccess! Total jobs saved: {}", total);
            println!("File saved as: {}", settings.output_path.display());
        }
        Err(e) => error!(error = %e, "Error saving file"),
    }
}

fn search(settings: &Settings, query: &str, limit: usize) -> anyhow::Result<()> {
    let doc = snapshot::load_snapshot(&settings.output_path)?;
    let hits = query::filter(&doc.jobs, query);
    if hits.is_empty() {
        println!("No jobs match {:?}.", query);
        return Ok(());
    }

    println!(
        "{:>3} | {:<36} | {:<24} | {:<16} | {:<10}",
        "#", "Title", "Company", "Location", "Date"
    );
    println!("{}", "-".repeat(103));

    for (i, job) in hits.iter().take(limit).enumerate() {
        println!(
            "{:>3} | {:<36} | {:<24} | {:<16} | {:<10}",
            i + 1,
            query::truncate(job.title.as_deref().unwrap_or("-"), 33),
            query::truncate(job.company.as_deref().unwrap_or("-"), 21),
            query::truncate(job.location.as_deref().unwrap_or("-"), 13),
            job.date,
        );
    }

    println!("\n{}", query::summary(hits.len(), doc.jobs.len(), &doc.generated_at));
    Ok(())
}

fn export(settings: &Settings, query: &str, csv: Option<PathBuf>) -> anyhow::Result<()> {
    let doc = snapshot::load_snapshot(&settings.output_path)?;
    let hits = query::filter(&doc.jobs, query);
    if hits.is_empty() {
        println!("Nothing to export.");
        return Ok(());
    }

    let path = csv.unwrap_or_else(|| {
        PathBuf::from(query::default_export_name(chrono::Local::now().date_naive()))
    });
    std::fs::write(&path, query::to_csv(&hits))
        .with_context(|| format!("Failed to write {:?}", path))?;

    println!("Exported {} of {} jobs to {}", hits.len(), doc.jobs.len(), path.display());
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──
