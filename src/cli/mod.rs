//! # CLI Module
//!
//! Command-line interface for the near-duplicate image finder.
//!
//! ## Usage
//! ```bash
//! # Scan a directory for near-duplicates
//! similar-images scan ./assets
//!
//! # Only thumbnails, stricter threshold
//! similar-images scan ./assets --pattern '_thumb\.' --threshold 4
//!
//! # Write side-by-side images for every pair
//! similar-images scan ./assets --compose ./dups
//!
//! # JSON output
//! similar-images scan ./assets --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use similar_images::core::compose::SideBySideComposer;
use similar_images::core::pipeline::{Pipeline, PipelineResult};
use similar_images::error::{Result, SimilarImagesError};
use similar_images::events::{
    Event, EventChannel, FingerprintEvent, MatchEvent, PipelineEvent, ScanEvent,
};
use std::path::PathBuf;
use std::thread;

/// similar-images - find visually near-duplicate images
#[derive(Parser, Debug)]
#[command(name = "similar-images")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan directories for near-duplicate images
    Scan {
        /// Directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Maximum Hamming distance between duplicates (lower = stricter)
        #[arg(short, long, default_value = "8")]
        threshold: u32,

        /// Fingerprint size; a multiple of 4 no larger than 64
        #[arg(short, long, default_value = "8")]
        size: u32,

        /// Only scan files whose name matches this regex
        #[arg(short, long)]
        pattern: Option<String>,

        /// Include hidden files
        #[arg(long)]
        include_hidden: bool,

        /// Write a side-by-side JPEG per duplicate pair into this directory
        #[arg(long)]
        compose: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (one pair per line)
    Minimal,
}

/// Options for one `scan` invocation
struct ScanArgs {
    paths: Vec<PathBuf>,
    threshold: u32,
    size: u32,
    pattern: Option<String>,
    include_hidden: bool,
    compose: Option<PathBuf>,
    output: OutputFormat,
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    similar_images::init_tracing();

    match cli.command {
        Commands::Scan {
            paths,
            threshold,
            size,
            pattern,
            include_hidden,
            compose,
            output,
            verbose,
        } => run_scan(ScanArgs {
            paths,
            threshold,
            size,
            pattern,
            include_hidden,
            compose,
            output,
            verbose,
        }),
    }
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(args.output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("similar-images").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    // Build pipeline
    let mut builder = Pipeline::builder()
        .paths(args.paths)
        .size(args.size)
        .threshold(args.threshold)
        .include_hidden(args.include_hidden);

    if let Some(pattern) = args.pattern {
        builder = builder.name_pattern(pattern);
    }
    if let Some(dir) = args.compose {
        builder = builder.composer(Box::new(SideBySideComposer::new(dir)?));
    }

    let pipeline = builder.build()?;

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    let progress = if pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = args.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_position(0);
                    pb.set_message(format!("{}", phase));
                }
                Event::Scan(ScanEvent::Completed { total_images }) => {
                    pb.set_length(total_images as u64);
                }
                Event::Fingerprint(FingerprintEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(format!(
                            "Fingerprinting {}",
                            p.current_path.file_name().unwrap_or_default().to_string_lossy()
                        ));
                    }
                }
                Event::Match(MatchEvent::Progress(p)) => {
                    pb.set_position(p.images_processed as u64);
                    pb.set_message(format!("Matching ({} pairs)", p.pairs_found));
                }
                Event::Match(MatchEvent::Skipped { path, message }) if verbose => {
                    pb.println(format!(
                        "  {} {}: {}",
                        style("skipped").yellow(),
                        path.display(),
                        message
                    ));
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;

    match args.output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, verbose),
        OutputFormat::Json => print_json_results(&result)?,
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, result: &PipelineResult, verbose: bool) {
    term.write_line("").ok();
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(result.total_images).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} duplicate groups, {} pairs",
        style(result.groups.len()).cyan(),
        style(result.pairs.len()).cyan()
    ))
    .ok();

    if !result.skipped.is_empty() {
        term.write_line(&format!(
            "  {} images skipped",
            style(result.skipped.len()).yellow()
        ))
        .ok();
    }

    if !result.composed.is_empty() {
        term.write_line(&format!(
            "  {} side-by-side images written",
            style(result.composed.len()).cyan()
        ))
        .ok();
    }

    if verbose {
        term.write_line(&format!("  {}", style(&result.index_stats).dim()))
            .ok();
        for error in &result.errors {
            term.write_line(&format!("  {} {}", style("error").red(), error))
                .ok();
        }
    }

    term.write_line("").ok();

    if result.groups.is_empty() {
        term.write_line("  No near-duplicates found.").ok();
        return;
    }

    term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
        .ok();
    term.write_line("").ok();

    for (i, group) in result.groups.iter().enumerate() {
        term.write_line(&format!(
            "  {} {} (distance {}, {} images)",
            style(format!("Group {}:", i + 1)).bold(),
            style(format!("{}", group.match_type)).yellow(),
            group.distance,
            group.duplicate_count() + 1
        ))
        .ok();

        for image in group.images() {
            let marker = if image == &group.representative {
                style("★").green().to_string()
            } else {
                style("○").dim().to_string()
            };
            term.write_line(&format!("    {} {}", marker, image.display()))
                .ok();
        }

        term.write_line("").ok();
    }
}

fn print_json_results(result: &PipelineResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| SimilarImagesError::Output(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn print_minimal_results(result: &PipelineResult) {
    for pair in &result.pairs {
        println!("{}\t{}", pair.first.display(), pair.second.display());
    }
}
