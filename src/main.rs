use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use autovalue_io::{
    search_makes, CsvSource, ExperimentName, Listing, ListingFilter, ListingTable, MarketSummary,
    ResultWriter, TableCache, VehicleCategory,
};
use autovalue_price::{
    find_comparables, ComparableWindow, PredictionInputs, PredictionResult, PriceEstimator,
    PriceModelConfig, TrainingReport,
};

#[derive(Parser)]
#[command(name = "autovalue")]
#[command(about = "Used-vehicle price estimation from classified-ad listings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

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

/// Which listings to load.
#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Vehicle category: "car" or "motorcycle"
    #[arg(long)]
    category: String,

    /// Path to the listing CSV file
    #[arg(long)]
    data: PathBuf,
}

/// Listing filters applied before training.
#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Minimum asking price (inclusive)
    #[arg(long)]
    min_price: Option<f64>,

    /// Maximum asking price (inclusive)
    #[arg(long)]
    max_price: Option<f64>,

    /// Earliest manufacturing year (inclusive)
    #[arg(long)]
    min_year: Option<i32>,

    /// Latest manufacturing year (inclusive)
    #[arg(long)]
    max_year: Option<i32>,

    /// Restrict to this make; repeat for several
    #[arg(long = "brand")]
    brands: Vec<String>,
}

/// Random Forest settings.
#[derive(Args, Debug, Clone)]
struct ForestArgs {
    /// Number of trees in the Random Forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum depth of each tree (unlimited when omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Fewest training rows a leaf may hold
    #[arg(long, default_value_t = 1)]
    min_samples_leaf: usize,
}

impl ForestArgs {
    fn config(&self, seed: u64) -> Result<PriceModelConfig> {
        Ok(PriceModelConfig::new(self.n_trees)?
            .with_seed(seed)
            .with_max_depth(self.max_depth)
            .with_min_samples_leaf(self.min_samples_leaf))
    }
}

/// The vehicle to value.
#[derive(Args, Debug, Clone)]
struct VehicleArgs {
    /// Manufacturer, e.g. "Honda"
    #[arg(long)]
    make: String,

    /// Model, e.g. "Civic"
    #[arg(long)]
    model: String,

    /// Manufacturing year
    #[arg(long)]
    year: i32,

    /// Average mileage in km (cars)
    #[arg(long)]
    mileage: Option<f64>,

    /// Transmission, e.g. "Automatic" (cars)
    #[arg(long)]
    transmission: Option<String>,

    /// Fuel type, e.g. "petrol" (cars)
    #[arg(long)]
    fuel_type: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Train a price model and report its fit and feature importances
    Train {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        forest: ForestArgs,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: Option<String>,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Train on the filtered listings, then value one vehicle
    Predict {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        vehicle: VehicleArgs,

        #[command(flatten)]
        forest: ForestArgs,

        /// Maximum number of comparable listings to return
        #[arg(long, default_value_t = 5)]
        comparables: usize,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: Option<String>,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// List the makes matching a case-insensitive search
    Makes {
        #[command(flatten)]
        source: SourceArgs,

        /// Substring to look for; empty lists every make
        #[arg(long, default_value = "")]
        query: String,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    #[serde(flatten)]
    report: TrainingReport,
    summary: MarketSummary,
}

#[derive(Serialize)]
struct PredictOutput<'a> {
    category: VehicleCategory,
    inputs: &'a PredictionInputs,
    prediction: PredictionResult,
    comparables: Vec<&'a Listing>,
    train_score: f64,
    test_score: f64,
    summary: MarketSummary,
}

#[derive(Serialize)]
struct MakesOutput {
    category: VehicleCategory,
    query: String,
    makes: Vec<String>,
}

fn build_filter(args: &FilterArgs) -> ListingFilter {
    let mut filter = ListingFilter::new().with_makes(args.brands.iter().cloned());
    if let Some(v) = args.min_price {
        filter = filter.with_min_price(v);
    }
    if let Some(v) = args.max_price {
        filter = filter.with_max_price(v);
    }
    if let Some(v) = args.min_year {
        filter = filter.with_min_year(v);
    }
    if let Some(v) = args.max_year {
        filter = filter.with_max_year(v);
    }
    filter
}

fn build_inputs(category: VehicleCategory, vehicle: &VehicleArgs) -> PredictionInputs {
    let mut inputs = PredictionInputs::vehicle(&*vehicle.make, &*vehicle.model, vehicle.year);
    if category == VehicleCategory::Car {
        if let Some(mileage) = vehicle.mileage {
            inputs = inputs.with_mileage(mileage);
        }
        if let Some(transmission) = &vehicle.transmission {
            inputs = inputs.with_transmission(transmission.as_str());
        }
        if let Some(fuel_type) = &vehicle.fuel_type {
            inputs = inputs.with_fuel_type(fuel_type);
        }
    }
    inputs
}

/// Load the source table through the cache and apply the filters.
fn load_table(source: &SourceArgs, filters: &FilterArgs) -> Result<(VehicleCategory, ListingTable)> {
    let category: VehicleCategory = source.category.parse()?;
    let cache = TableCache::new(CsvSource::new().with_path(category, &source.data));
    let table = cache
        .get_or_load(category)
        .context("failed to read listing CSV")?;

    let filter = build_filter(filters);
    let filtered = filter.apply(&table);
    info!(
        %category,
        n_loaded = table.len(),
        n_filtered = filtered.len(),
        "listings ready"
    );
    Ok((category, filtered))
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

    match cli.command {
        Command::Train {
            source,
            filters,
            forest,
            experiment,
            output_dir,
        } => {
            let experiment_name = experiment.map(ExperimentName::new).transpose()?;
            let (category, table) = load_table(&source, &filters)?;

            let config = forest.config(cli.seed)?;
            let mut estimator = PriceEstimator::new(category, config);
            let outcome = estimator
                .train(&table)
                .context("price model training failed")?;

            let output = TrainOutput {
                report: outcome.report(),
                summary: MarketSummary::from_table(&table),
            };

            if let Some(name) = experiment_name {
                let writer = ResultWriter::new(&output_dir, name)?;
                writer.write_training(&output)?;
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            source,
            filters,
            vehicle,
            forest,
            comparables,
            experiment,
            output_dir,
        } => {
            let experiment_name = experiment.map(ExperimentName::new).transpose()?;
            let (category, table) = load_table(&source, &filters)?;

            // 1. Train on the filtered listings
            let config = forest.config(cli.seed)?;
            let mut estimator = PriceEstimator::new(category, config);
            let outcome = estimator
                .train(&table)
                .context("price model training failed")?;
            let (train_score, test_score) = (outcome.train_score, outcome.test_score);

            // 2. Predict
            let inputs = build_inputs(category, &vehicle);
            let prediction = estimator.predict(&inputs).context("prediction failed")?;
            info!(
                point_estimate = prediction.point_estimate,
                "vehicle valued"
            );

            // 3. Comparable listings
            let window = ComparableWindow::default().with_limit(comparables);
            let found = find_comparables(&table, category, &inputs, &window)
                .context("comparable search failed")?;

            let output = PredictOutput {
                category,
                inputs: &inputs,
                prediction,
                comparables: found,
                train_score,
                test_score,
                summary: MarketSummary::from_table(&table),
            };

            // 4. Write JSON artifact
            if let Some(name) = experiment_name {
                let writer = ResultWriter::new(&output_dir, name)?;
                writer.write_valuation(&output)?;
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Makes { source, query } => {
            let (category, table) = load_table(&source, &FilterArgs::default())?;
            let output = MakesOutput {
                category,
                makes: search_makes(&table, &query),
                query,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
