//! Pricing Configuration Module
//!
//! Column mappings, optimizer range, exploration settings and output paths,
//! loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. Explicit `--config <path>` on the command line
//! 2. `PRICING_CONFIG` environment variable (path to TOML file)
//! 3. `pricing.toml` in the current working directory
//! 4. Built-in defaults
//!
//! The loaded config is passed down explicitly; nothing is stored globally.

mod pricing_config;
pub mod validation;

pub use pricing_config::*;
