//! Command-line front end for the listing digest.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use listing_aggregation::{order_by_keys, ordering_key_from_label, AggregationEngine};
use listing_core::{Config, RawListing, SizeSummary, StoredFilter};
use listing_report::{
    complex_no_from_path, detail_block, export_file_name, summary_line, total_households,
    ComplexMetadata, ComplexSnapshot, ExportBundle, SignalLegend, UpsertOutcome,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "listing-cli")]
#[command(about = "Per-size sale/lease price digest for apartment listings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a JSON array of raw listings
    Summarize(SummarizeArgs),

    /// Write every saved complex into one export document
    Export {
        /// Bundle file written by `summarize --save`
        #[arg(long)]
        bundle: PathBuf,

        /// Output file (defaults to a timestamped name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove every saved complex from a bundle
    Clear {
        #[arg(long)]
        bundle: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One compact line per size
    Lines,
    /// Multi-line 억-formatted blocks
    Report,
    /// Export records as JSON
    Json,
}

#[derive(clap::Args)]
struct SummarizeArgs {
    /// JSON array of raw listings
    #[arg(short, long)]
    input: PathBuf,

    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Toggle object saved by the page script (JSON)
    #[arg(long)]
    stored_filter: Option<PathBuf>,

    /// Size key prefixes or header labels, in display order
    #[arg(long, value_delimiter = ',')]
    order: Option<Vec<String>>,

    #[arg(short, long, value_enum, default_value = "lines")]
    format: OutputFormat,

    /// Group by address and price, enabling the sale signal
    #[arg(long)]
    group_by_address: bool,

    /// Use the cheapest lease instead of the dearest
    #[arg(long)]
    lowest_lease: bool,

    /// Keep units above the size threshold
    #[arg(long)]
    include_large: bool,

    /// Keep sales that assume an existing loan or deposit
    #[arg(long)]
    include_encumbered: bool,

    /// Signal threshold multiplier (1-3)
    #[arg(long)]
    multiplier: Option<u32>,

    /// Page path of the complex, used for its number
    #[arg(long)]
    page_path: Option<String>,

    /// Complex name for export metadata
    #[arg(long, default_value = "Unknown")]
    complex_name: String,

    /// Complex address for export metadata
    #[arg(long, default_value = "")]
    address: String,

    /// Summary text of the complex page, used for the household count
    #[arg(long)]
    summary_text: Option<String>,

    /// Save the snapshot into this bundle file
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,listing_aggregation=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Summarize(args) => summarize(args),
        Commands::Export { bundle, output } => export(&bundle, output),
        Commands::Clear { bundle } => clear(&bundle),
    }
}

fn load_config(args: &SummarizeArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            Config::from_json(&json).context("Failed to parse config")?
        }
        None => Config::default(),
    };

    if let Some(path) = &args.stored_filter {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read stored filter {}", path.display()))?;
        let stored = StoredFilter::from_json(&json).context("Failed to parse stored filter")?;
        config
            .apply_stored_filter(&stored)
            .context("Invalid stored filter")?;
    }

    config.filter.include_large_units |= args.include_large;
    config.filter.include_encumbered |= args.include_encumbered;
    config.aggregation.lowest_lease_mode |= args.lowest_lease;
    config.aggregation.group_by_address |= args.group_by_address;
    if let Some(multiplier) = args.multiplier {
        config.signal.multiplier = multiplier;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn summarize(args: SummarizeArgs) -> Result<()> {
    let config = load_config(&args)?;

    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read listings {}", args.input.display()))?;
    let raws: Vec<RawListing> =
        serde_json::from_str(&json).context("Failed to parse listings")?;

    let engine = AggregationEngine::new(config);
    let output = engine.run(&raws);
    tracing::info!(
        listings = output.stats.total,
        accepted = output.stats.accepted,
        sizes = output.summaries.len(),
        "Aggregated listings"
    );

    let summaries: Vec<SizeSummary> = match &args.order {
        Some(labels) => {
            let keys: Vec<String> = labels.iter().map(|l| ordering_key_from_label(l)).collect();
            order_by_keys(output.summaries, &keys)
        }
        None => output.summaries,
    };

    let config = engine.config();
    let snapshot = ComplexSnapshot::new(snapshot_metadata(&args), &summaries);

    match args.format {
        OutputFormat::Lines => {
            if config.aggregation.group_by_address {
                println!("{}", SignalLegend::new(&config.signal));
            }
            for summary in &summaries {
                println!("{}", summary_line(summary, config));
            }
        }
        OutputFormat::Report => {
            for summary in &summaries {
                println!("{}\n", detail_block(summary));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    if let Some(path) = &args.save {
        save_snapshot(path, snapshot)?;
    }

    Ok(())
}

fn snapshot_metadata(args: &SummarizeArgs) -> ComplexMetadata {
    let complex_no = args
        .page_path
        .as_deref()
        .map_or_else(|| "unknown".to_string(), complex_no_from_path);

    let mut metadata = ComplexMetadata::new(complex_no, args.complex_name.as_str(), Utc::now());
    metadata.address = args.address.clone();
    metadata.total_households = args.summary_text.as_deref().map_or(0, total_households);
    metadata
}

fn load_bundle(path: &Path) -> Result<ExportBundle> {
    if !path.exists() {
        return Ok(ExportBundle::new());
    }
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bundle {}", path.display()))?;
    ExportBundle::from_json(&json).context("Failed to parse bundle")
}

fn store_bundle(path: &Path, bundle: &ExportBundle) -> Result<()> {
    fs::write(path, bundle.to_json()?)
        .with_context(|| format!("Failed to write bundle {}", path.display()))
}

fn save_snapshot(path: &Path, snapshot: ComplexSnapshot) -> Result<()> {
    let name = snapshot.metadata.complex_name.clone();
    let mut bundle = load_bundle(path)?;
    let outcome = bundle.upsert(snapshot);
    store_bundle(path, &bundle)?;

    match outcome {
        UpsertOutcome::Replaced => tracing::info!(complex = %name, saved = bundle.len(), "Updated complex"),
        UpsertOutcome::Inserted => tracing::info!(complex = %name, saved = bundle.len(), "Saved complex"),
    }
    Ok(())
}

fn export(bundle_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let bundle = load_bundle(bundle_path)?;
    let now = Utc::now();
    let document = bundle
        .to_document(now)
        .context("Nothing to export; save a complex with `summarize --save` first")?;

    let output = output.unwrap_or_else(|| PathBuf::from(export_file_name(now)));
    fs::write(&output, serde_json::to_string_pretty(&document)?)
        .with_context(|| format!("Failed to write export {}", output.display()))?;

    tracing::info!(
        complexes = document.metadata.total_complexes,
        path = %output.display(),
        "Exported complexes"
    );
    Ok(())
}

fn clear(bundle_path: &Path) -> Result<()> {
    let mut bundle = load_bundle(bundle_path)?;
    bundle.remove_all();
    store_bundle(bundle_path, &bundle)
}
