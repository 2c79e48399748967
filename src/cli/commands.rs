//! CLI command definitions for geobias.
//!
//! Each subcommand is a thin layer over the library: load files, call into
//! `diversity`, `stats` or `prompts`, and report the result.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SelectionConfig;
use crate::dataset::{
    read_candidates, read_column, read_completions, read_predictions, read_prompt_templates,
    write_jsonl, write_predictions, write_records, GROUNDTRUTH_COLUMN,
};
use crate::diversity::{LoggingObserver, SpreadMetrics};
use crate::prompts::{build_finetune_records, collect_predictions, instantiate};
use crate::stats::{bias_score, normalized_fractional_ranking, spearman, BiasReport};

/// Geospatial bias probing for large language models.
#[derive(Parser)]
#[command(name = "geobias")]
#[command(about = "Select diverse coordinates and score LLM geographic bias")]
#[command(version)]
#[command(
    long_about = "geobias selects spread-out, population-weighted coordinates for prompting, and compares model ratings with ground truth using rank statistics.\n\nExample usage:\n  geobias select candidates.csv selected.csv -n 2000 --region Africa --seed 42\n  geobias predictions prompts.jsonl completions.jsonl predictions.csv\n  geobias bias predictions.csv groundtruth.csv 2000"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Select a spread-out, population-weighted subset of candidate rows.
    Select(SelectArgs),

    /// Collect located ratings from prompts and model completions.
    Predictions(PredictionsArgs),

    /// Spearman correlation between predictions and ground truth.
    #[command(alias = "corr")]
    Correlate(CorrelateArgs),

    /// Bias score of predictions against an anchoring distribution.
    Bias(BiasArgs),

    /// Build chat-format fine-tuning data from prompts and ground truth.
    Finetune(FinetuneArgs),

    /// Print normalized fractional ranks of a numeric column.
    Rank(RankArgs),
}

/// Arguments for `geobias select`.
#[derive(Parser, Debug)]
pub struct SelectArgs {
    /// CSV with Latitude, Longitude and Weight columns.
    pub input: PathBuf,

    /// Output CSV receiving the selected rows in shuffled order.
    pub output: PathBuf,

    /// Number of rows to select.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Keep only rows mentioning this region (repeatable).
    #[arg(short = 'r', long = "region")]
    pub regions: Vec<String>,

    /// Candidates scored per iteration.
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// RNG seed for reproducible selections.
    #[arg(long)]
    pub seed: Option<u64>,

    /// YAML configuration file (overridden by GEOBIAS_* env vars and flags).
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Output JSON summary.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `geobias predictions`.
#[derive(Parser, Debug)]
pub struct PredictionsArgs {
    /// JSONL prompts ({"text": ...} per line) holding a Coordinates block.
    pub prompts: PathBuf,

    /// JSONL completions, line-aligned with the prompts.
    pub completions: PathBuf,

    /// Output CSV with Latitude, Longitude and Predictions columns.
    pub output: PathBuf,

    /// Output JSON summary.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `geobias correlate`.
#[derive(Parser, Debug)]
pub struct CorrelateArgs {
    /// CSV with Latitude, Longitude and Predictions columns.
    pub predictions: PathBuf,

    /// CSV holding ground truth, row-aligned with the predictions.
    pub groundtruth: PathBuf,

    /// Ground-truth column name.
    #[arg(long, default_value = GROUNDTRUTH_COLUMN)]
    pub column: String,

    /// Output JSON.
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Also write the JSON report to this file.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `geobias bias`.
#[derive(Parser, Debug)]
pub struct BiasArgs {
    /// CSV with Latitude, Longitude and Predictions columns.
    pub predictions: PathBuf,

    /// CSV holding the anchoring distribution, row-aligned with the predictions.
    pub groundtruth: PathBuf,

    /// Number of prompts that were used to generate the predictions.
    pub num_prompts: usize,

    /// Ground-truth column name.
    #[arg(long, default_value = GROUNDTRUTH_COLUMN)]
    pub column: String,

    /// Output JSON.
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Also write the JSON report to this file.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `geobias finetune`.
#[derive(Parser, Debug)]
pub struct FinetuneArgs {
    /// Rating topic substituted for the task placeholder.
    pub task: String,

    /// CSV with a Groundtruth column, row-aligned with the prompts.
    pub groundtruth: PathBuf,

    /// JSONL prompt templates ({"text": ...} per line).
    pub prompts: PathBuf,

    /// Output JSONL of chat-format training records.
    pub output: PathBuf,

    /// Ground-truth column name.
    #[arg(long, default_value = GROUNDTRUTH_COLUMN)]
    pub column: String,
}

/// Arguments for `geobias rank`.
#[derive(Parser, Debug)]
pub struct RankArgs {
    /// Input CSV.
    pub input: PathBuf,

    /// Numeric column to rank.
    #[arg(long)]
    pub column: String,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli())
}

/// Run the CLI with the parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Select(args) => run_select_command(args),
        Commands::Predictions(args) => run_predictions_command(args),
        Commands::Correlate(args) => run_correlate_command(args),
        Commands::Bias(args) => run_bias_command(args),
        Commands::Finetune(args) => run_finetune_command(args),
        Commands::Rank(args) => run_rank_command(args),
    }
}

// ============================================================================
// Select
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct SelectOutput {
    input: String,
    output: String,
    candidates: usize,
    selected: usize,
    seed: Option<u64>,
    metrics: SpreadMetrics,
}

/// Resolves the selection config: YAML file, then env vars, then flags.
fn resolve_select_config(args: &SelectArgs) -> anyhow::Result<SelectionConfig> {
    let base = match &args.config {
        Some(path) => SelectionConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SelectionConfig::default(),
    };
    let mut config = base.merge_env()?;

    if let Some(count) = args.count {
        config.target_count = count;
    }
    if let Some(sample_size) = args.sample_size {
        config.sample_size = sample_size;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if !args.regions.is_empty() {
        config.regions = args.regions.clone();
    }

    config.validate()?;
    Ok(config)
}

fn run_select_command(args: SelectArgs) -> anyhow::Result<()> {
    let config = resolve_select_config(&args)?;

    let mut table = read_candidates(&args.input)
        .with_context(|| format!("Failed to read candidates from {}", args.input.display()))?;
    let loaded = table.len();
    table.retain_regions(&config.regions);
    if table.is_empty() {
        anyhow::bail!(
            "No candidates left in {} after filtering by regions {:?}",
            args.input.display(),
            config.regions
        );
    }
    info!(loaded, kept = table.len(), regions = ?config.regions, "Loaded candidates");

    let points = table.points();
    let weights = table.weights();
    let mut observer = LoggingObserver::new(config.progress_every);
    let indices = config.sampler().select_with_observer(
        &points,
        &weights,
        config.target_count,
        &mut observer,
    )?;

    if indices.len() < config.target_count {
        warn!(
            requested = config.target_count,
            available = indices.len(),
            "Fewer candidates than requested; keeping all of them"
        );
    }

    let metrics = SpreadMetrics::calculate(&points, &indices);

    let mut rows: Vec<_> = indices.iter().map(|&i| &table.rows[i].record).collect();
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    };
    rows.shuffle(&mut rng);

    write_records(&args.output, &table.headers, rows)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let output = SelectOutput {
        input: args.input.display().to_string(),
        output: args.output.display().to_string(),
        candidates: table.len(),
        selected: indices.len(),
        seed: config.seed,
        metrics,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Selected {} of {} candidates -> {}",
            output.selected, output.candidates, output.output
        );
        println!(
            "Closest pair: {:.4}, mean nearest neighbour: {:.4}",
            output.metrics.min_pairwise_distance, output.metrics.mean_nearest_neighbor_distance
        );
    }
    Ok(())
}

// ============================================================================
// Predictions
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct PredictionsOutput {
    output: String,
    prompts: usize,
    predictions: usize,
    skipped: usize,
}

fn run_predictions_command(args: PredictionsArgs) -> anyhow::Result<()> {
    let prompts = read_prompt_templates(&args.prompts)
        .with_context(|| format!("Failed to read prompts from {}", args.prompts.display()))?;
    let completions = read_completions(&args.completions).with_context(|| {
        format!("Failed to read completions from {}", args.completions.display())
    })?;

    let collected = collect_predictions(&prompts, &completions)?;
    write_predictions(&args.output, &collected.records)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if collected.skipped > 0 {
        warn!(
            skipped = collected.skipped,
            prompts = collected.prompts(),
            "Some completions held no rating"
        );
    }

    let output = PredictionsOutput {
        output: args.output.display().to_string(),
        prompts: collected.prompts(),
        predictions: collected.records.len(),
        skipped: collected.skipped,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Collected {} predictions from {} prompts ({} skipped) -> {}",
            output.predictions, output.prompts, output.skipped, output.output
        );
    }
    Ok(())
}

// ============================================================================
// Correlate / Bias
// ============================================================================

/// Writes `report` as pretty JSON when an output path is given.
fn write_report<T: Serialize>(report: &T, output: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = output {
        fs::write(path, serde_json::to_string_pretty(report)?)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }
    Ok(())
}

/// Loads predictions and the aligned ground-truth column.
fn load_prediction_pairs(
    predictions: &Path,
    groundtruth: &Path,
    column: &str,
) -> anyhow::Result<(Vec<f64>, Vec<f64>)> {
    let records = read_predictions(predictions)
        .with_context(|| format!("Failed to read predictions from {}", predictions.display()))?;
    let truth = read_column(groundtruth, column)
        .with_context(|| format!("Failed to read ground truth from {}", groundtruth.display()))?;

    if records.len() != truth.len() {
        anyhow::bail!(
            "{} predictions but {} ground-truth values; files must be row-aligned",
            records.len(),
            truth.len()
        );
    }

    let values = records.iter().map(|r| r.prediction).collect();
    Ok((values, truth))
}

#[derive(Debug, Clone, Serialize)]
struct CorrelateOutput {
    samples: usize,
    spearman: Option<f64>,
}

fn run_correlate_command(args: CorrelateArgs) -> anyhow::Result<()> {
    let (predictions, truth) =
        load_prediction_pairs(&args.predictions, &args.groundtruth, &args.column)?;
    let correlation = spearman(&predictions, &truth)?;
    let output = CorrelateOutput {
        samples: predictions.len(),
        spearman: correlation,
    };
    write_report(&output, args.output.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match correlation {
        Some(rho) => println!("Spearman correlation: {:.2}", rho),
        None => println!("Spearman correlation: undefined (constant ranking)"),
    }
    Ok(())
}

fn run_bias_command(args: BiasArgs) -> anyhow::Result<()> {
    let (predictions, truth) =
        load_prediction_pairs(&args.predictions, &args.groundtruth, &args.column)?;
    let report: BiasReport = bias_score(&predictions, &truth, args.num_prompts)?;
    write_report(&report, args.output.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Bias Score: {:.2}", report.score);
    println!(
        "  correlation {:.3}, mean absolute deviation {:.3}, answer rate {:.3}",
        report.correlation, report.mean_absolute_deviation, report.answer_rate
    );
    Ok(())
}

// ============================================================================
// Finetune / Rank
// ============================================================================

fn run_finetune_command(args: FinetuneArgs) -> anyhow::Result<()> {
    let truth = read_column(&args.groundtruth, &args.column)
        .with_context(|| format!("Failed to read ground truth from {}", args.groundtruth.display()))?;
    let prompts: Vec<String> = read_prompt_templates(&args.prompts)
        .with_context(|| format!("Failed to read prompts from {}", args.prompts.display()))?
        .iter()
        .map(|template| instantiate(template, &args.task))
        .collect();

    let records = build_finetune_records(&prompts, &truth)?;
    write_jsonl(&args.output, &records)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(task = %args.task, records = records.len(), output = %args.output.display(), "Wrote fine-tuning data");
    Ok(())
}

fn run_rank_command(args: RankArgs) -> anyhow::Result<()> {
    let values = read_column(&args.input, &args.column)?;
    for rank in normalized_fractional_ranking(&values)? {
        println!("{:.6}", rank);
    }
    Ok(())
}
