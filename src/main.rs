//! price-optimizer - Retail Pricing Toolkit
//!
//! Exploratory analysis, price elasticity regression and bounded price
//! optimization over a retail sales CSV.
//!
//! # Usage
//!
//! ```bash
//! # Print the exploratory report for the configured dataset
//! price-optimizer explore
//!
//! # Fit the elasticity model and write its coefficient table
//! price-optimizer fit --data data/raw/retail_price.csv
//!
//! # Optimize prices from a saved coefficient table, ±5%
//! price-optimizer optimize --coefficients data/processed/coefficients.csv --range 0.05
//!
//! # Full pipeline: explore, fit, optimize
//! price-optimizer run
//! ```
//!
//! # Environment Variables
//!
//! - `PRICING_CONFIG`: Path to a TOML config file (default: ./pricing.toml)
//! - `RUST_LOG`: Logging level (default: info)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use price_optimizer::config::{OutputFormat, PricingConfig};
use price_optimizer::dataset::{build_catalog, load_csv, SalesFrame};
use price_optimizer::exploratory::{
    category_summary, correlation_matrix, data_overview, numeric_distribution,
    summary_statistics, time_based_analysis, weekday_weekend_analysis,
};
use price_optimizer::modeling::price_elasticity_model;
use price_optimizer::optimizer::{PriceChangeRange, PriceOptimizer};
use price_optimizer::solver::SimplexSolver;
use price_optimizer::report::{
    read_coefficients, write_coefficients, write_results, ResultsTable,
};
use price_optimizer::types::{CatalogMode, CoefficientTable, OptimizedPrice};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "price-optimizer")]
#[command(about = "Retail price elasticity analysis and price optimization")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides PRICING_CONFIG and ./pricing.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

/// Dataset override shared by every data-reading subcommand.
#[derive(clap::Args, Debug)]
struct DataArgs {
    /// Sales CSV (default: `[data] path` from the config)
    #[arg(long, value_name = "CSV")]
    data: Option<PathBuf>,
}

/// Optimizer overrides shared by `optimize` and `run`.
#[derive(clap::Args, Debug)]
struct OptimizeArgs {
    /// Allowed fractional price change, in (0, 1]
    #[arg(long)]
    range: Option<f64>,

    /// Result file (default: `[output] results_path`)
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Result file format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// One catalog entry per product (mean price and quantity) instead of one per sales row
    #[arg(long)]
    per_product: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Csv => Self::Csv,
            FormatArg::Json => Self::Json,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Print the exploratory data analysis report
    Explore {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Fit the price elasticity model and write the coefficient table
    Fit {
        #[command(flatten)]
        data: DataArgs,

        /// Coefficient CSV to write (default: `[output] coefficients_path`)
        #[arg(long, value_name = "PATH")]
        coefficients_out: Option<PathBuf>,
    },

    /// Optimize prices for the product catalog
    Optimize {
        #[command(flatten)]
        data: DataArgs,

        /// Read the elasticity from this coefficient CSV instead of fitting
        #[arg(long, value_name = "CSV")]
        coefficients: Option<PathBuf>,

        #[command(flatten)]
        opt: OptimizeArgs,
    },

    /// Explore, fit and optimize in one pass
    Run {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        opt: OptimizeArgs,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to this file
        #[arg(long, value_name = "PATH")]
        write: Option<PathBuf>,
    },
}

// ============================================================================
// Setup
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<PricingConfig> {
    match path {
        Some(p) => {
            let config = PricingConfig::load_from_file(p)
                .with_context(|| format!("Failed to load config {}", p.display()))?;
            info!(path = %p.display(), "Loaded pricing config");
            Ok(config)
        }
        None => Ok(PricingConfig::load()),
    }
}

fn load_frame(config: &PricingConfig, data: &DataArgs) -> Result<SalesFrame> {
    let path = data.data.as_deref().unwrap_or(&config.data.path);
    load_csv(path).with_context(|| format!("Failed to load dataset {}", path.display()))
}

// ============================================================================
// Subcommands
// ============================================================================

fn explore(config: &PricingConfig, frame: &SalesFrame) {
    let settings = &config.exploration;
    let columns = &config.columns;

    println!("{}", data_overview(frame, settings.head_rows));
    println!("{}", summary_statistics(frame));
    for histogram in numeric_distribution(frame, settings.histogram_bins, settings.histogram_width) {
        println!("{histogram}");
    }
    println!("{}", correlation_matrix(frame));

    // The remaining reports need specific columns; a dataset without them
    // still gets the generic sections above.
    match category_summary(frame, &columns.category) {
        Ok(report) => println!("{report}"),
        Err(e) => warn!(error = %e, "Skipping category analysis"),
    }
    match time_based_analysis(frame, columns) {
        Ok(report) => println!("{report}"),
        Err(e) => warn!(error = %e, "Skipping time-based analysis"),
    }
    match weekday_weekend_analysis(frame, columns) {
        Ok(report) => println!("{report}"),
        Err(e) => warn!(error = %e, "Skipping weekday/weekend analysis"),
    }
}

fn fit(config: &PricingConfig, frame: &SalesFrame, out: Option<&Path>) -> Result<CoefficientTable> {
    let model = price_elasticity_model(frame, &config.columns)
        .context("Failed to fit price elasticity model")?;
    println!("{}", model.results.summary());

    let table = model.coefficients();
    println!();
    println!("{table}");

    let path = out.unwrap_or(&config.output.coefficients_path);
    write_coefficients(path, &table)
        .with_context(|| format!("Failed to write coefficients to {}", path.display()))?;
    Ok(table)
}

fn optimize(
    config: &PricingConfig,
    frame: &SalesFrame,
    coefficients: &CoefficientTable,
    opt: &OptimizeArgs,
) -> Result<Vec<OptimizedPrice>> {
    let mode = if opt.per_product {
        CatalogMode::PerProduct
    } else {
        config.optimizer.catalog
    };
    let catalog = build_catalog(frame, &config.columns, mode)
        .context("Failed to build product catalog")?;

    let range = PriceChangeRange::new(opt.range.unwrap_or(config.optimizer.price_change_range))?;
    let results = PriceOptimizer::new(SimplexSolver::default()).optimize_with_coefficients(
        &catalog,
        coefficients,
        config.elasticity_key(),
        range,
    )?;

    println!("{}", ResultsTable(&results));

    let path = opt.output.as_deref().unwrap_or(&config.output.results_path);
    let format = opt.format.map_or(config.output.format, OutputFormat::from);
    write_results(path, &results, format)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    Ok(results)
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        SubCommand::Explore { data } => {
            let frame = load_frame(&config, &data)?;
            explore(&config, &frame);
        }
        SubCommand::Fit {
            data,
            coefficients_out,
        } => {
            let frame = load_frame(&config, &data)?;
            fit(&config, &frame, coefficients_out.as_deref())?;
        }
        SubCommand::Optimize {
            data,
            coefficients,
            opt,
        } => {
            let frame = load_frame(&config, &data)?;
            let table = match coefficients {
                Some(path) => read_coefficients(&path)
                    .with_context(|| format!("Failed to read coefficients {}", path.display()))?,
                None => fit(&config, &frame, None)?,
            };
            let results = optimize(&config, &frame, &table, &opt)?;
            info!(products = results.len(), "Optimization complete");
        }
        SubCommand::Run { data, opt } => {
            let frame = load_frame(&config, &data)?;
            explore(&config, &frame);
            let table = fit(&config, &frame, None)?;
            let results = optimize(&config, &frame, &table, &opt)?;
            info!(products = results.len(), "Pipeline complete");
        }
        SubCommand::Config { write } => {
            print!("{}", config.to_toml()?);
            if let Some(path) = write {
                config
                    .save_to_file(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }
    }

    Ok(())
}
