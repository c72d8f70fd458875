use clap::Parser;
use csv::ReaderBuilder;
use nalgebra::{DMatrix, DVector};
use rusty_trees::bagging::{bag_learner::BagLearner, params::BagParams};
use rusty_trees::data::dataset::Dataset;
use rusty_trees::metrics::{confusion::ClassificationMetrics, errors::RegressionMetrics};
use rusty_trees::trees::decision_tree::{CorrelationTree, RandomTree};
use rusty_trees::trees::params::{Aggregation, TreeParams};
use rusty_trees::Learner;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "evaluate-learners")]
#[command(about = "Train trees and bagged trees on a CSV file and report their fit")]
#[command(version)]
struct Cli {
    /// CSV file with feature columns followed by one label column
    path: PathBuf,

    /// Skip the first line of the file
    #[arg(long)]
    header: bool,

    /// Treat labels as classes: vote with the mode and report accuracy
    #[arg(long)]
    classify: bool,

    /// Maximum number of rows aggregated into one leaf
    #[arg(long, default_value_t = 1)]
    leaf_size: usize,

    /// Number of trees in the bag
    #[arg(long, default_value_t = 20)]
    bags: usize,

    /// RNG seed for reproducible splits and resamples
    #[arg(long)]
    seed: Option<u64>,
}

/// Reads rows of numeric features followed by one label column.
fn read_file(file_path: &Path, header: bool) -> Result<Dataset, Box<dyn Error>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(header)
        .from_path(file_path)?;
    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut dimension = None;

    for result in reader.records() {
        let record = result?;
        let mut row = record
            .iter()
            .map(|value| value.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()?;
        let label = row.pop().ok_or("Empty record")?;

        match dimension {
            Some(dimension) if dimension != row.len() => {
                return Err(format!("Expected {} features, got {}", dimension, row.len()).into())
            }
            None => dimension = Some(row.len()),
            _ => {}
        }
        features.extend(row);
        labels.push(label);
    }

    let x = DMatrix::from_row_slice(labels.len(), dimension.unwrap_or(0), &features);
    Ok(Dataset::try_new(x, DVector::from_vec(labels))?)
}

fn report<L: Learner + RegressionMetrics + ClassificationMetrics>(
    name: &str,
    learner: &mut L,
    train: &Dataset,
    test: &Dataset,
    classify: bool,
) -> Result<(), Box<dyn Error>> {
    learner.fit(train)?;
    for (sample, dataset) in [("in-sample", train), ("out-of-sample", test)] {
        if dataset.nrows() == 0 {
            continue;
        }
        let predictions = learner.predict(&dataset.x)?;
        if classify {
            let accuracy = learner.accuracy(&dataset.y, &predictions)?;
            info!(learner = name, sample, accuracy, "evaluated");
        } else {
            let rmse = learner.rmse(&dataset.y, &predictions)?;
            let correlation = learner.correlation(&dataset.y, &predictions)?;
            info!(learner = name, sample, rmse, correlation, "evaluated");
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let dataset = read_file(&cli.path, cli.header)?;
    info!(
        rows = dataset.nrows(),
        features = dataset.ncols(),
        "loaded dataset"
    );
    let (train, test) = dataset.train_test_split(0.6, cli.seed)?;

    let aggregation = if cli.classify {
        Aggregation::Mode
    } else {
        Aggregation::Mean
    };
    let tree_params = TreeParams::with_params(cli.leaf_size, aggregation)?;
    let bag_params = BagParams::with_params(cli.bags, aggregation, cli.seed)?;

    let mut correlation_tree = CorrelationTree::new(tree_params.clone());
    report("correlation tree", &mut correlation_tree, &train, &test, cli.classify)?;

    let mut random_tree = RandomTree::new(tree_params.clone(), cli.seed);
    report("random tree", &mut random_tree, &train, &test, cli.classify)?;

    let mut bag = BagLearner::random_trees(bag_params, tree_params)?;
    report("bagged random trees", &mut bag, &train, &test, cli.classify)?;

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        error!("{}", err);
        std::process::exit(1);
    }
}
