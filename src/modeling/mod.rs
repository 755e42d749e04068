//! Price Elasticity Modeling
//!
//! Ordinary least squares regression of quantity on price, a price x category
//! interaction and the label-encoded category. The fitted parameters become
//! the coefficient table the optimizer reads its elasticity from.
//!
//! ## Modules
//! - `encoding`: label encoder (sorted unique labels mapped to 0..k)
//! - `ols`: normal-equation OLS with t / F tests (statrs), pseudo-inverse
//!   fallback for collinear regressors
//! - `elasticity`: builds the design matrix from a `SalesFrame` and fits it

mod elasticity;
mod encoding;
mod ols;

pub use elasticity::{
    extract_coefficients, price_elasticity_model, ElasticityModel, CATEGORY_ENCODED_TERM,
    INTERACTION_TERM,
};
pub use encoding::LabelEncoder;
pub use ols::{Ols, OlsResults, CONSTANT_TERM};

use thiserror::Error;

use crate::dataset::DatasetError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Need more than {regressors} observations to fit {regressors} regressors, got {observations}")]
    TooFewObservations {
        observations: usize,
        regressors: usize,
    },

    #[error("Regressor '{name}' has {got} values, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Non-finite value in '{0}'")]
    NonFinite(String),

    #[error("Unknown label '{0}'")]
    UnknownLabel(String),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}
