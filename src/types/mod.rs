//! Shared data structures for the price optimization toolkit
//!
//! - `ProductRecord`: one catalog entry fed to the optimizer
//! - `CoefficientTable`: regression output keyed by regressor name
//! - `OptimizedPrice` / `PriceBound`: optimizer output and per-product box

mod product;
mod coefficient;
mod optimization;

pub use product::*;
pub use coefficient::*;
pub use optimization::*;
