//! # CLI Module
//!
//! Command-line interface for the gallery indexer.
//!
//! ## Usage
//! ```bash
//! # Index a photo library
//! gallery-index scan ~/Pictures
//!
//! # Verbose output with per-photo hashes
//! gallery-index scan ~/Pictures --verbose
//!
//! # JSON output
//! gallery-index scan ~/Pictures --output json
//!
//! # Inspect or reset the cache
//! gallery-index cache stats
//! gallery-index cache clear
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use gallery_indexer::core::cache::{KvStore, SqliteStore};
use gallery_indexer::core::catalog::{CatalogConfig, FsCatalog};
use gallery_indexer::core::pipeline::{Pipeline, PipelineOutcome, ResultCode};
use gallery_indexer::error::Result;
use gallery_indexer::events::{
    CatalogEvent, Event, EventChannel, PipelineEvent, ProcessEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

/// Gallery Indexer - hash and thumbnail your photo library
#[derive(Parser, Debug)]
#[command(name = "gallery-index")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a photo library, hashing and thumbnailing every photo
    Scan {
        /// Root of the photo library
        root: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Include hidden files
        #[arg(long)]
        include_hidden: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Cache database path
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Directory generated thumbnails are written to
        #[arg(long)]
        thumbs: Option<PathBuf>,

        /// Camera-output directory for camera-roll detection
        #[arg(long)]
        camera_dir: Option<PathBuf>,
    },

    /// Inspect or reset the hash/thumbnail cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show cache statistics
    Stats {
        /// Cache database path
        #[arg(long)]
        cache: Option<PathBuf>,
    },
    /// Remove all cached hashes and thumbnail references
    Clear {
        /// Cache database path
        #[arg(long)]
        cache: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (hash and path per line)
    Minimal,
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gallery-indexer")
}

fn cache_path_or_default(cache: Option<PathBuf>) -> PathBuf {
    cache.unwrap_or_else(|| default_cache_dir().join("gallery.db"))
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            root,
            output,
            include_hidden,
            verbose,
            cache,
            thumbs,
            camera_dir,
        } => run_scan(root, output, include_hidden, verbose, cache, thumbs, camera_dir),
        Commands::Cache { action } => run_cache(action),
    }
}

fn run_cache(action: CacheAction) -> Result<()> {
    let term = Term::stderr();

    match action {
        CacheAction::Stats { cache } => {
            let store = SqliteStore::open(&cache_path_or_default(cache))?;
            let stats = store.stats()?;
            term.write_line(&format!(
                "{} entries ({} hashes, {} thumbnail references)",
                style(stats.total_entries).cyan(),
                stats.hash_entries,
                stats.thumb_entries
            ))
            .ok();
        }
        CacheAction::Clear { cache } => {
            let store = SqliteStore::open(&cache_path_or_default(cache))?;
            store.clear()?;
            term.write_line(&format!("{} cache cleared", style("✓").green().bold()))
                .ok();
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_scan(
    root: PathBuf,
    output: OutputFormat,
    include_hidden: bool,
    verbose: bool,
    cache_path: Option<PathBuf>,
    thumbs: Option<PathBuf>,
    camera_dir: Option<PathBuf>,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Gallery Indexer").bold().cyan(),
            style("v0.1.0").dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let store = SqliteStore::open(&cache_path_or_default(cache_path))?;
    let thumb_dir = thumbs.unwrap_or_else(|| default_cache_dir().join("thumbs"));

    let mut catalog_config = CatalogConfig::new(&root);
    catalog_config.include_hidden = include_hidden;
    if let Some(camera) = camera_dir {
        catalog_config.camera_dir = Some(camera);
    }

    let pipeline = Pipeline::builder()
        .catalog(Box::new(FsCatalog::new(catalog_config)))
        .store(Arc::new(store))
        .thumb_dir(thumb_dir)
        .build()?;

    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose_clone = verbose;

    // Handle events in a separate thread; the pipeline itself runs on
    // this one. Photos print in completion order, as they arrive.
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(format!("{}", phase));
                    }
                }
                Event::Catalog(CatalogEvent::Completed { total_photos, .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_photos as u64);
                    }
                }
                Event::Process(ProcessEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.completed as u64);
                        pb.set_message(format!("(cache: {})", p.cache_hits));
                    }
                }
                Event::Process(ProcessEvent::PhotoReady { photo }) => {
                    if verbose_clone {
                        if let Some(ref pb) = progress_clone {
                            pb.println(format!(
                                "{}  {}",
                                photo.hash,
                                photo.source.reference()
                            ));
                        }
                    }
                }
                Event::Process(ProcessEvent::PhotoSkipped { id, message }) => {
                    if verbose_clone {
                        if let Some(ref pb) = progress_clone {
                            pb.println(format!("skipped {id}: {message}"));
                        }
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled)
                | Event::Pipeline(PipelineEvent::PermissionDenied) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let outcome = result?;

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &outcome),
        OutputFormat::Json => print_json_results(&outcome),
        OutputFormat::Minimal => print_minimal_results(&outcome),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, outcome: &PipelineOutcome) {
    term.write_line("").ok();

    match outcome.code {
        ResultCode::PermissionDenied => {
            term.write_line(&format!(
                "{} Permission denied reading the photo library. Grant access and rerun.",
                style("✗").red().bold()
            ))
            .ok();
            return;
        }
        ResultCode::Empty => {
            term.write_line(&format!("{} No photos found", style("•").dim()))
                .ok();
            return;
        }
        ResultCode::Success => {}
    }

    let headline = if outcome.cancelled {
        "Scan Cancelled"
    } else {
        "Scan Complete"
    };
    term.write_line(&format!("{} {}", style("✓").green().bold(), headline))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} photos indexed in {:.1}s",
        style(outcome.processed).cyan(),
        outcome.duration_ms as f64 / 1000.0
    ))
    .ok();

    if outcome.skipped > 0 {
        term.write_line(&format!(
            "  {} photos skipped",
            style(outcome.skipped).yellow()
        ))
        .ok();
    }

    if outcome.cache_hits > 0 {
        term.write_line(&format!(
            "  {} cache hits",
            style(outcome.cache_hits).dim()
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!("{}", style("Albums:").bold().underlined()))
        .ok();

    for album in &outcome.albums.albums {
        let marker = if album.bucket_id == outcome.albums.camera_bucket_id {
            " (camera)"
        } else {
            ""
        };
        term.write_line(&format!(
            "  {} {} photos{}",
            style(&album.name).bold(),
            album.photos.len(),
            style(marker).dim()
        ))
        .ok();
    }
}

fn print_json_results(outcome: &PipelineOutcome) {
    match serde_json::to_string_pretty(outcome) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize results: {}", e),
    }
}

fn print_minimal_results(outcome: &PipelineOutcome) {
    if let Some(ref all) = outcome.albums.all_photos {
        for photo in &all.photos {
            if !photo.hash.is_empty() {
                println!("{}  {}", photo.hash, photo.source.reference());
            }
        }
    }
}
