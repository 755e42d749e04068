//! Price Optimizer: Retail Pricing Toolkit
//!
//! Exploratory statistics, price elasticity regression and bounded LP price
//! optimization over a retail sales dataset.
//!
//! ## Architecture
//!
//! - **Dataset**: CSV loading into a typed column frame, product catalog extraction
//! - **Exploratory**: overview, summary statistics, distributions, correlations, trends
//! - **Modeling**: OLS price elasticity model and its coefficient table
//! - **Solver**: dense two-phase simplex behind the `LpSolver` trait
//! - **Optimizer**: per-product price box, LP solve, demand estimate
//! - **Report**: result / coefficient files and console tables

pub mod config;
pub mod types;
pub mod dataset;
pub mod exploratory;
pub mod modeling;
pub mod solver;
pub mod optimizer;
pub mod report;

// Re-export configuration
pub use config::{ColumnMapping, ConfigError, OutputFormat, PricingConfig};

// Re-export commonly used types
pub use types::{
    CatalogMode, Coefficient, CoefficientTable, OptimizedPrice, PriceBound, ProductRecord,
};

// Re-export the pipeline stages
pub use dataset::{build_catalog, load_csv, DatasetError, SalesFrame};
pub use modeling::{extract_coefficients, price_elasticity_model, ElasticityModel, ModelError};
pub use optimizer::{
    optimize, optimize_with_coefficients, PriceChangeRange, PriceOptimizer, PricingError,
};
pub use report::ReportError;
pub use solver::{LinProgResult, LinProgStatus, LinearProgram, LpSolver, SimplexSolver};
