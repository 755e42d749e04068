//! Price Optimizer
//!
//! Computes new unit prices inside a symmetric percentage box around each
//! product's current price, then estimates demand at the new prices from a
//! single price elasticity coefficient.
//!
//! ## Known modeling simplification
//!
//! The linear program solved here is a degenerate proxy:
//!
//! - objective coefficients are the negated historical quantities,
//! - the "demand constraint" is a diagonal matrix with the elasticity on the
//!   diagonal and a zero right-hand side (`elasticity * p_i <= 0`).
//!
//! This is not a demand-change law. Elasticity only enters the economics
//! through the quantity estimate applied after the solve. Do not "fix" the
//! constraint without product sign-off.

mod price_optimizer;

pub use price_optimizer::{
    optimize, optimize_with_coefficients, PriceChangeRange, PriceOptimizer, PricingError,
    DEFAULT_ELASTICITY_KEY, DEFAULT_PRICE_CHANGE_RANGE,
};
