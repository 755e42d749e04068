//! Product catalog records

use serde::{Deserialize, Serialize};

/// A single product as seen by the optimizer.
///
/// Immutable input: the optimizer never modifies a record, it only reads
/// `unit_price` and `qty` to build bounds and estimate demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product identifier (e.g. "bed1")
    pub product_id: String,
    /// Current unit price (must be > 0)
    pub unit_price: f64,
    /// Historical quantity sold (must be >= 0)
    pub qty: f64,
}

impl ProductRecord {
    pub fn new(product_id: impl Into<String>, unit_price: f64, qty: f64) -> Self {
        Self {
            product_id: product_id.into(),
            unit_price,
            qty,
        }
    }
}

/// How sales rows are turned into catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogMode {
    /// One catalog entry per dataset row (product ids may repeat).
    #[default]
    Rows,
    /// One entry per product id: mean unit price and mean quantity.
    PerProduct,
}

impl std::fmt::Display for CatalogMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rows => write!(f, "rows"),
            Self::PerProduct => write!(f, "per_product"),
        }
    }
}
