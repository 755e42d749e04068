//! Price optimization output types

use serde::{Deserialize, Serialize};

/// Closed price interval `[lower, upper]` for one product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBound {
    pub lower: f64,
    pub upper: f64,
}

impl PriceBound {
    /// Symmetric bound around `price` with fractional half-width `range`.
    pub fn around(price: f64, range: f64) -> Self {
        Self {
            lower: price * (1.0 - range),
            upper: price * (1.0 + range),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl std::fmt::Display for PriceBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.4}, {:.4}]", self.lower, self.upper)
    }
}

/// One row of the optimizer result table.
///
/// Serializes with the column names of the result file:
/// `product_id,optimized_price,estimated_quantity_sold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedPrice {
    pub product_id: String,
    pub optimized_price: f64,
    #[serde(rename = "estimated_quantity_sold")]
    pub estimated_qty: f64,
}
