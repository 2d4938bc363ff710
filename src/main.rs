use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use cyclewarp_dtw::{ReferenceBuilder, StandardizedCurve, user_average};
use cyclewarp_features::{RawCycle, UserId, extract_batch, sample_cycles_per_user};
use cyclewarp_io::{
    EvaluationReport, FeatureTableReader, FeatureTableWriter, LabelsReader, PipelineConfig,
    ReadingsReader, ReferenceDocument, ReferenceStore, ResultWriter, UserAveragedCurve,
    join_labels,
};
use cyclewarp_learn::{CrossValidation, LogisticRegression};

#[derive(Parser)]
#[command(name = "cyclewarp")]
#[command(about = "Basal body temperature cycle alignment, landmark features and PCOS classification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON pipeline configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// RNG seed for reproducibility (overrides the configuration)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the reference cycle curve from the readings of model users
    BuildReference {
        /// Path to the readings CSV file
        #[arg(long)]
        readings: PathBuf,

        /// Output JSON path (defaults to the configured model_cycle_path)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Identifier stored in the reference document
        #[arg(long, default_value = "model_cycle")]
        id: String,
    },

    /// Align cycles to the reference and write the feature table
    Extract {
        /// Path to the readings CSV file
        #[arg(long)]
        readings: PathBuf,

        /// Reference JSON path (defaults to the configured model_cycle_path)
        #[arg(long)]
        model_cycle: Option<PathBuf>,

        /// Feature CSV path (defaults to the configured input_features_path)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Cycles sampled per user (defaults to the configured cycles_per_user)
        #[arg(long)]
        cycles_per_user: Option<usize>,
    },

    /// Cross-validate a classifier on the feature table and user labels
    Evaluate {
        /// Feature CSV path (defaults to the configured input_features_path)
        #[arg(long)]
        features: Option<PathBuf>,

        /// Path to the `user,label` CSV file
        #[arg(long)]
        labels: PathBuf,

        /// Number of cross-validation folds (defaults to the configured k_fold_count)
        #[arg(long)]
        k_folds: Option<usize>,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct BuildReferenceOutput<'a> {
    id: &'a str,
    output: String,
    curve_length: usize,
    n_users: usize,
    n_cycles: usize,
    n_excluded: usize,
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    match &cli.command {
        Command::Extract {
            cycles_per_user: Some(n),
            ..
        } => config.cycles_per_user = *n,
        Command::Evaluate {
            k_folds: Some(k), ..
        } => config.k_fold_count = *k,
        _ => {}
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn build_reference(
    config: &PipelineConfig,
    readings: PathBuf,
    output: Option<PathBuf>,
    id: &str,
) -> Result<()> {
    let preprocessor = config.preprocessor()?;
    let cycles = ReadingsReader::new(&readings)
        .read()
        .context("failed to read readings CSV")?;

    let processed: Vec<(&RawCycle, Option<StandardizedCurve>)> = cycles
        .par_iter()
        .map(|c| match preprocessor.process(&c.readings, c.cycle_length) {
            Ok(pre) => (c, Some(pre.curve)),
            Err(e) => {
                warn!(user = %c.key.user, cycle = c.key.cycle, error = %e, "excluding cycle from reference");
                (c, None)
            }
        })
        .collect();

    let mut by_user: BTreeMap<&UserId, Vec<StandardizedCurve>> = BTreeMap::new();
    let mut n_excluded = 0;
    for (cycle, curve) in processed {
        match curve {
            Some(curve) => by_user.entry(&cycle.key.user).or_default().push(curve),
            None => n_excluded += 1,
        }
    }

    let mut averaged = Vec::with_capacity(by_user.len());
    let mut stored = Vec::with_capacity(by_user.len());
    for (user, curves) in &by_user {
        let avg = user_average(curves);
        stored.push(UserAveragedCurve::new(user, &avg));
        averaged.push(avg);
    }

    let reference = ReferenceBuilder::new(config.curve_length)?
        .build(&averaged)
        .context("failed to build reference curve")?;

    let output = output.unwrap_or_else(|| config.model_cycle_path.clone());
    ReferenceStore::new(&output)
        .save(&ReferenceDocument::new(id, &reference, stored))
        .context("failed to save reference curve")?;

    let summary = BuildReferenceOutput {
        id,
        output: output.display().to_string(),
        curve_length: reference.len(),
        n_users: by_user.len(),
        n_cycles: cycles.len() - n_excluded,
        n_excluded,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn extract(
    config: &PipelineConfig,
    readings: PathBuf,
    model_cycle: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let model_cycle = model_cycle.unwrap_or_else(|| config.model_cycle_path.clone());
    let (doc, reference) = ReferenceStore::new(&model_cycle)
        .load()
        .context("failed to load reference curve")?;

    let cycles = ReadingsReader::new(&readings)
        .read()
        .context("failed to read readings CSV")?;

    let model_users: HashSet<UserId> = doc.model_users();
    let n_total = cycles.len();
    let cycles: Vec<RawCycle> = cycles
        .into_iter()
        .filter(|c| !model_users.contains(&c.key.user))
        .collect();
    let model_users_skipped = n_total - cycles.len();
    if model_users_skipped > 0 {
        info!(model_users_skipped, "skipped cycles of reference users");
    }

    let (records, summary) = extract_batch(&cycles, &reference, config.preprocessor()?);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let sampled = sample_cycles_per_user(records, config.cycles_per_user, &mut rng);
    info!(
        sampled = sampled.records.len(),
        dropped_users = sampled.dropped_users.len(),
        "cycles sampled per user"
    );

    let output = output.unwrap_or_else(|| config.input_features_path.clone());
    FeatureTableWriter::new(&output)
        .write(&sampled.records)
        .context("failed to write feature table")?;

    let writer = ResultWriter::new(&config.output_results_path)?;
    let json = writer.write_extraction(
        &summary,
        model_users_skipped,
        sampled.records.len(),
        &sampled.dropped_users,
    )?;
    println!("{json}");
    Ok(())
}

fn evaluate(config: &PipelineConfig, features: Option<PathBuf>, labels: PathBuf) -> Result<()> {
    let features = features.unwrap_or_else(|| config.input_features_path.clone());
    let rows = FeatureTableReader::new(&features)
        .read()
        .context("failed to read feature table")?;
    let labels = LabelsReader::new(&labels)
        .read()
        .context("failed to read labels CSV")?;
    let data = join_labels(&rows, &labels);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let result = CrossValidation::new(config.k_fold_count)?
        .evaluate(LogisticRegression::new, data.features(), data.labels(), &mut rng)
        .context("cross-validation failed")?;

    let report = EvaluationReport {
        model: result.model,
        seed: config.seed,
        n_samples: result.n_samples,
        n_positive: data.n_positive(),
        feature_names: data.feature_names(),
        fold_accuracies: &result.fold_accuracies,
        fold_aucs: &result.fold_aucs,
        accuracy: (result.mean_accuracy, result.std_accuracy),
        auc: (result.mean_auc, result.std_auc),
    };
    let writer = ResultWriter::new(&config.output_results_path)?;
    let json = writer.write_evaluation(&report)?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let config = load_config(&cli)?;

    match cli.command {
        Command::BuildReference {
            readings,
            output,
            id,
        } => build_reference(&config, readings, output, &id),
        Command::Extract {
            readings,
            model_cycle,
            output,
            ..
        } => extract(&config, readings, model_cycle, output),
        Command::Evaluate {
            features, labels, ..
        } => evaluate(&config, features, labels),
    }
}
