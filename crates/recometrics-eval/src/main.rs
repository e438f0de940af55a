//! Recometrics Evaluation Tool
//!
//! Scores a recommender's predictions against held-out ground truth and
//! reports rating-error, top-k ranking and (optionally) binary
//! classification metrics.
//!
//! # Usage
//!
//! ```bash
//! # Rating and ranking metrics at k=10
//! cargo run -p recometrics-eval --release -- \
//!     --truth data/test.jsonl --predictions data/preds.jsonl
//!
//! # Relevance by rating threshold, JSON output
//! cargo run -p recometrics-eval --release -- \
//!     --truth test.tsv --predictions preds.tsv \
//!     --relevancy by-rating --threshold 4 --json
//!
//! # Only ranking metrics, on a 4-thread pool
//! RECOMETRICS_THREADS=4 cargo run -p recometrics-eval --release -- \
//!     --truth test.json --predictions preds.json --metrics ranking
//! ```

mod datasets;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use datasets::{load_records, DataFormat};
use recometrics_core::config::{
    EvalConfig, RelevancyMethod, DEFAULT_ITEM_COL, DEFAULT_K, DEFAULT_PREDICTION_COL,
    DEFAULT_RATING_COL, DEFAULT_USER_COL,
};
use recometrics_core::data::{bind_records, has_column, ColumnMap, InteractionSet, RawRecord};
use recometrics_core::error::EvaluationError;
use recometrics_core::evaluation::{
    evaluate_classification, ranking_metrics, rating_metrics, Executor, MetricResult,
    RayonExecutor, Sequential,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// =============================================================================
// CLI
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MetricGroup {
    Rating,
    Ranking,
    Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Relevancy {
    TopK,
    ByRating,
    ByTimestamp,
}

impl From<Relevancy> for RelevancyMethod {
    fn from(r: Relevancy) -> Self {
        match r {
            Relevancy::TopK => RelevancyMethod::TopK,
            Relevancy::ByRating => RelevancyMethod::ByRating,
            Relevancy::ByTimestamp => RelevancyMethod::ByTimestamp,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "recometrics-eval", version)]
#[command(about = "Evaluate recommender predictions against ground truth")]
struct Args {
    /// Ground-truth interactions
    #[arg(long)]
    truth: PathBuf,

    /// Predicted interactions
    #[arg(long)]
    predictions: PathBuf,

    /// Input format (default: inferred from the file extension)
    #[arg(long, value_enum)]
    format: Option<DataFormat>,

    /// User id column
    #[arg(long, default_value = DEFAULT_USER_COL)]
    user_col: String,

    /// Item id column
    #[arg(long, default_value = DEFAULT_ITEM_COL)]
    item_col: String,

    /// Ground-truth score column
    #[arg(long, default_value = DEFAULT_RATING_COL)]
    rating_col: String,

    /// Prediction score column
    #[arg(long, default_value = DEFAULT_PREDICTION_COL)]
    prediction_col: String,

    /// Ground-truth timestamp column (implied by --relevancy by-timestamp)
    #[arg(long)]
    timestamp_col: Option<String>,

    /// Ranking cutoff
    #[arg(long, default_value_t = DEFAULT_K)]
    k: usize,

    /// Which ground-truth items count as relevant
    #[arg(long, value_enum, default_value = "top-k")]
    relevancy: Relevancy,

    /// Minimum ground-truth score counted as relevant (required by by-rating)
    #[arg(long, required_if_eq("relevancy", "by-rating"))]
    threshold: Option<f64>,

    /// Metric groups to compute (comma-separated)
    #[arg(long, value_enum, value_delimiter = ',', default_values = ["rating", "ranking"])]
    metrics: Vec<MetricGroup>,

    /// Worker threads; 1 runs sequentially (default: rayon global pool)
    #[arg(long, env = "RECOMETRICS_THREADS")]
    threads: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn eval_config(&self) -> EvalConfig {
        let config = EvalConfig::new(self.k, RelevancyMethod::from(self.relevancy));
        match self.threshold {
            Some(t) => config.with_threshold(t),
            None => config,
        }
    }

    fn truth_columns(&self) -> ColumnMap {
        let columns = ColumnMap::ground_truth()
            .with_user(&self.user_col)
            .with_item(&self.item_col)
            .with_score(&self.rating_col);
        match (&self.timestamp_col, self.relevancy) {
            (Some(col), _) => columns.with_timestamp(col),
            (None, Relevancy::ByTimestamp) => columns.with_default_timestamp(),
            (None, _) => columns,
        }
    }

    fn prediction_columns(&self) -> ColumnMap {
        ColumnMap::predictions()
            .with_user(&self.user_col)
            .with_item(&self.item_col)
            .with_score(&self.prediction_col)
    }

    fn wants(&self, group: MetricGroup) -> bool {
        self.metrics.contains(&group)
    }
}

// =============================================================================
// Output Types
// =============================================================================

#[derive(Debug, Serialize)]
struct EvalReport {
    truth: DatasetInfo,
    predictions: DatasetInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating_pairs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ranking: Option<RankingInfo>,
    metrics: MetricResult,
}

#[derive(Debug, Serialize)]
struct DatasetInfo {
    path: String,
    num_interactions: usize,
    num_users: usize,
}

impl DatasetInfo {
    fn new(path: &Path, set: &InteractionSet) -> Self {
        Self {
            path: path.display().to_string(),
            num_interactions: set.len(),
            num_users: set.users().len(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RankingInfo {
    #[serde(flatten)]
    config: EvalConfig,
    num_users: usize,
}

// =============================================================================
// Evaluation
// =============================================================================

fn read_rows(path: &Path, format: Option<DataFormat>) -> Result<Vec<RawRecord>> {
    load_records(path, format).with_context(|| format!("Failed to load {}", path.display()))
}

fn bind(path: &Path, rows: &[RawRecord], columns: &ColumnMap) -> Result<InteractionSet> {
    bind_records(rows, columns).with_context(|| format!("Invalid data in {}", path.display()))
}

/// Loads the ground truth, rejecting by-timestamp relevancy up front when no
/// row carries the timestamp column.
fn load_truth(args: &Args) -> Result<InteractionSet> {
    let rows = read_rows(&args.truth, args.format)?;
    let columns = args.truth_columns();

    if args.relevancy == Relevancy::ByTimestamp {
        if let Some(column) = &columns.timestamp {
            if !rows.is_empty() && !has_column(&rows, column) {
                return Err(EvaluationError::InvalidConfiguration(format!(
                    "by_timestamp relevancy needs a '{}' column, but {} has none",
                    column,
                    args.truth.display()
                ))
                .into());
            }
        }
    }

    bind(&args.truth, &rows, &columns)
}

fn run<E: Executor>(
    args: &Args,
    truth: &InteractionSet,
    predictions: &InteractionSet,
    executor: &E,
) -> Result<EvalReport> {
    let mut metrics = MetricResult::default();
    let mut rating_pairs = None;
    let mut ranking = None;

    if args.wants(MetricGroup::Rating) {
        let m = rating_metrics(truth, predictions, executor).context("Rating evaluation failed")?;
        rating_pairs = Some(m.pairs);
        metrics = metrics.merged(m.into());
    }

    if args.wants(MetricGroup::Ranking) {
        let config = args.eval_config();
        let m = ranking_metrics(truth, predictions, &config, executor)
            .context("Ranking evaluation failed")?;
        ranking = Some(RankingInfo {
            config,
            num_users: m.users,
        });
        metrics = metrics.merged(m.into());
    }

    if args.wants(MetricGroup::Classification) {
        let m = evaluate_classification(truth, predictions)
            .context("Classification evaluation failed")?;
        metrics = metrics.merged(m);
    }

    Ok(EvalReport {
        truth: DatasetInfo::new(&args.truth, truth),
        predictions: DatasetInfo::new(&args.predictions, predictions),
        rating_pairs,
        ranking,
        metrics,
    })
}

fn evaluate(args: &Args) -> Result<EvalReport> {
    let truth = load_truth(args)?;
    let rows = read_rows(&args.predictions, args.format)?;
    let predictions = bind(&args.predictions, &rows, &args.prediction_columns())?;

    match args.threads {
        Some(1) => run(args, &truth, &predictions, &Sequential),
        Some(n) => {
            let executor = RayonExecutor::with_threads(n).context("Invalid --threads")?;
            tracing::info!(threads = executor.num_threads(), "using dedicated worker pool");
            run(args, &truth, &predictions, &executor)
        }
        None => run(args, &truth, &predictions, &RayonExecutor::new()),
    }
}

// =============================================================================
// Output
// =============================================================================

fn print_report(report: &EvalReport) {
    println!("\n{}", "=".repeat(80));
    println!("RECOMMENDER EVALUATION");
    println!("{}", "=".repeat(80));

    for (label, info) in [("Truth", &report.truth), ("Predictions", &report.predictions)] {
        println!(
            "{:<12} {} ({} interactions, {} users)",
            label, info.path, info.num_interactions, info.num_users
        );
    }

    if let Some(pairs) = report.rating_pairs {
        println!("Joined pairs: {}", pairs);
    }
    if let Some(ranking) = &report.ranking {
        let threshold = ranking
            .config
            .threshold
            .map(|t| format!(", threshold={}", t))
            .unwrap_or_default();
        println!(
            "Ranking: k={}, relevancy={}{} over {} users",
            ranking.config.k, ranking.config.relevancy, threshold, ranking.num_users
        );
    }

    println!("\n{}", "-".repeat(70));
    println!("{:<20} {:>12}", "Metric", "Value");
    for (name, value) in report.metrics.iter() {
        println!("{:<20} {:>12.6}", name, value);
    }

    println!("{}\n", "=".repeat(80));
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let report = evaluate(&args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}
