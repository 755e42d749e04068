//! Bounded LP price optimization

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::solver::{LinProgStatus, LinearProgram, LpSolver, SimplexSolver, SolverError};
use crate::types::{CoefficientTable, OptimizedPrice, PriceBound, ProductRecord};

/// Allowed fractional price change when none is configured (±10%).
pub const DEFAULT_PRICE_CHANGE_RANGE: f64 = 0.10;

/// Coefficient-table key holding the price elasticity.
pub const DEFAULT_ELASTICITY_KEY: &str = "unit_price";

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Missing coefficient: expected key '{key}' in coefficient table")]
    MissingCoefficient { key: String },

    #[error("Invalid input: product catalog is empty")]
    EmptyCatalog,

    #[error("Invalid input for product '{product_id}': {reason}")]
    InvalidInput { product_id: String, reason: String },

    #[error("Invalid input: elasticity must be finite (got {0})")]
    NonFiniteElasticity(f64),

    #[error("Invalid price change range {0}: must be in (0, 1]")]
    InvalidRange(f64),

    #[error(
        "Optimization failed ({status}) for products '{first_product}'..'{last_product}': {message}{}",
        describe_blocking(.blocking)
    )]
    OptimizationFailed {
        status: LinProgStatus,
        first_product: String,
        last_product: String,
        message: String,
        /// Products whose constraint cannot hold anywhere inside their box
        blocking: Vec<(String, PriceBound)>,
    },

    #[error("Malformed linear program: {0}")]
    Solver(#[from] SolverError),
}

fn describe_blocking(blocking: &[(String, PriceBound)]) -> String {
    if blocking.is_empty() {
        return String::new();
    }
    let listed: Vec<String> = blocking
        .iter()
        .take(5)
        .map(|(id, bound)| format!("{id} {bound}"))
        .collect();
    let more = blocking.len().saturating_sub(listed.len());
    if more > 0 {
        format!(" (unsatisfiable bounds: {}, and {more} more)", listed.join(", "))
    } else {
        format!(" (unsatisfiable bounds: {})", listed.join(", "))
    }
}

/// Fractional price change allowed around each base price, in `(0, 1]`.
///
/// A range of 1 or more would allow non-positive lower bounds; ranges above
/// 1 are rejected, exactly 1 is accepted (lower bound of zero).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChangeRange(f64);

impl PriceChangeRange {
    pub fn new(range: f64) -> Result<Self, PricingError> {
        if range.is_finite() && range > 0.0 && range <= 1.0 {
            Ok(Self(range))
        } else {
            Err(PricingError::InvalidRange(range))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for PriceChangeRange {
    fn default() -> Self {
        Self(DEFAULT_PRICE_CHANGE_RANGE)
    }
}

/// Price optimizer over a pluggable LP solver.
///
/// Stateless: every call builds and solves a fresh problem, so one instance
/// can be reused across unrelated catalogs.
#[derive(Debug, Clone, Default)]
pub struct PriceOptimizer<S = SimplexSolver> {
    solver: S,
}

impl<S: LpSolver> PriceOptimizer<S> {
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    /// Optimize prices for `products` given a global `elasticity`.
    ///
    /// Returns one result per product, in input order. All input checks run
    /// before the solver, so a rejected call produces no partial output.
    pub fn optimize(
        &self,
        products: &[ProductRecord],
        elasticity: f64,
        range: PriceChangeRange,
    ) -> Result<Vec<OptimizedPrice>, PricingError> {
        validate_products(products)?;
        if !elasticity.is_finite() {
            return Err(PricingError::NonFiniteElasticity(elasticity));
        }

        let bounds: Vec<PriceBound> = products
            .iter()
            .map(|p| PriceBound::around(p.unit_price, range.value()))
            .collect();

        let problem = build_problem(products, elasticity, &bounds);

        info!(
            products = products.len(),
            elasticity,
            range = range.value(),
            "Solving price optimization LP"
        );

        let result = self.solver.solve(&problem)?;
        debug!(nit = result.nit, fun = result.fun, status = %result.status, "LP solve finished");

        if !result.success() {
            let blocking = blocking_products(products, elasticity, &bounds);
            warn!(
                status = %result.status,
                blocking = blocking.len(),
                "Price optimization LP did not reach an optimum"
            );
            return Err(PricingError::OptimizationFailed {
                status: result.status,
                first_product: products[0].product_id.clone(),
                last_product: products[products.len() - 1].product_id.clone(),
                message: result.message,
                blocking,
            });
        }

        let optimized = products
            .iter()
            .zip(&result.x)
            .zip(&bounds)
            .map(|((product, &price), bound)| {
                // Clamp solver round-off back into the box
                let price = price.clamp(bound.lower, bound.upper);
                OptimizedPrice {
                    product_id: product.product_id.clone(),
                    optimized_price: price,
                    estimated_qty: estimate_quantity(product, elasticity, price),
                }
            })
            .collect();

        Ok(optimized)
    }

    /// Optimize using the elasticity stored under `key` in `coefficients`.
    pub fn optimize_with_coefficients(
        &self,
        products: &[ProductRecord],
        coefficients: &CoefficientTable,
        key: &str,
        range: PriceChangeRange,
    ) -> Result<Vec<OptimizedPrice>, PricingError> {
        let elasticity = coefficients
            .get(key)
            .ok_or_else(|| PricingError::MissingCoefficient {
                key: key.to_string(),
            })?;
        self.optimize(products, elasticity, range)
    }
}

/// Optimize with the bundled simplex solver.
///
/// `range` is validated here; see [`PriceChangeRange`].
pub fn optimize(
    products: &[ProductRecord],
    elasticity: f64,
    range: f64,
) -> Result<Vec<OptimizedPrice>, PricingError> {
    let range = PriceChangeRange::new(range)?;
    PriceOptimizer::<SimplexSolver>::default().optimize(products, elasticity, range)
}

/// Optimize with the bundled simplex solver, reading the elasticity from a
/// coefficient table.
pub fn optimize_with_coefficients(
    products: &[ProductRecord],
    coefficients: &CoefficientTable,
    key: &str,
    range: f64,
) -> Result<Vec<OptimizedPrice>, PricingError> {
    let range = PriceChangeRange::new(range)?;
    PriceOptimizer::<SimplexSolver>::default()
        .optimize_with_coefficients(products, coefficients, key, range)
}

fn validate_products(products: &[ProductRecord]) -> Result<(), PricingError> {
    if products.is_empty() {
        return Err(PricingError::EmptyCatalog);
    }
    for p in products {
        if !p.unit_price.is_finite() || p.unit_price <= 0.0 {
            return Err(PricingError::InvalidInput {
                product_id: p.product_id.clone(),
                reason: format!("base price must be > 0 (got {})", p.unit_price),
            });
        }
        if !p.qty.is_finite() || p.qty < 0.0 {
            return Err(PricingError::InvalidInput {
                product_id: p.product_id.clone(),
                reason: format!("base quantity must be >= 0 (got {})", p.qty),
            });
        }
    }
    Ok(())
}

/// Objective `-qty_i`, diagonal `elasticity` rows with zero RHS, box bounds.
fn build_problem(products: &[ProductRecord], elasticity: f64, bounds: &[PriceBound]) -> LinearProgram {
    let n = products.len();
    let c = products.iter().map(|p| -p.qty).collect();
    let a_ub = (0..n).map(|i| vec![(i, elasticity)]).collect();
    LinearProgram {
        c,
        a_ub,
        b_ub: vec![0.0; n],
        bounds: bounds.iter().map(|b| (b.lower, b.upper)).collect(),
    }
}

/// Products for which `elasticity * p <= 0` fails at every point of the box.
fn blocking_products(
    products: &[ProductRecord],
    elasticity: f64,
    bounds: &[PriceBound],
) -> Vec<(String, PriceBound)> {
    products
        .iter()
        .zip(bounds)
        .filter(|(_, b)| (elasticity * b.lower).min(elasticity * b.upper) > 0.0)
        .map(|(p, b)| (p.product_id.clone(), *b))
        .collect()
}

/// `qty * (1 + elasticity * (new_price - base_price) / base_price)`
pub(crate) fn estimate_quantity(product: &ProductRecord, elasticity: f64, new_price: f64) -> f64 {
    product.qty * (1.0 + elasticity * (new_price - product.unit_price) / product.unit_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::LinProgResult;
    use std::cell::Cell;

    /// Returns a fixed point and counts calls.
    struct FixedSolver {
        x: Vec<f64>,
        calls: Cell<usize>,
    }

    impl LpSolver for FixedSolver {
        fn solve(&self, problem: &LinearProgram) -> Result<LinProgResult, SolverError> {
            self.calls.set(self.calls.get() + 1);
            problem.validate()?;
            Ok(LinProgResult {
                x: self.x.clone(),
                fun: 0.0,
                status: LinProgStatus::Optimal,
                nit: 0,
                message: String::new(),
                slack: vec![0.0; problem.num_constraints()],
            })
        }
    }

    fn fixed(x: Vec<f64>) -> PriceOptimizer<FixedSolver> {
        PriceOptimizer::new(FixedSolver {
            x,
            calls: Cell::new(0),
        })
    }

    #[test]
    fn test_estimate_at_lower_bound() {
        // 50 * (1 + (-2) * (90 - 100) / 100) = 60
        let opt = fixed(vec![90.0]);
        let products = vec![ProductRecord::new("1", 100.0, 50.0)];
        let res = opt
            .optimize(&products, -2.0, PriceChangeRange::new(0.1).unwrap())
            .unwrap();
        assert_eq!(res.len(), 1);
        assert!((res[0].optimized_price - 90.0).abs() < 1e-9);
        assert!((res[0].estimated_qty - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_problem_shape_is_diagonal() {
        let products = vec![
            ProductRecord::new("a", 10.0, 5.0),
            ProductRecord::new("b", 20.0, 0.0),
        ];
        let bounds: Vec<PriceBound> = products
            .iter()
            .map(|p| PriceBound::around(p.unit_price, 0.1))
            .collect();
        let lp = build_problem(&products, -1.5, &bounds);
        assert_eq!(lp.c, vec![-5.0, -0.0]);
        assert_eq!(lp.a_ub, vec![vec![(0, -1.5)], vec![(1, -1.5)]]);
        assert_eq!(lp.b_ub, vec![0.0, 0.0]);
        assert!((lp.bounds[1].0 - 18.0).abs() < 1e-9);
        assert!((lp.bounds[1].1 - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_input_never_reaches_solver() {
        let opt = fixed(vec![1.0, 1.0]);
        let products = vec![
            ProductRecord::new("ok", 10.0, 1.0),
            ProductRecord::new("zero", 0.0, 1.0),
        ];
        let err = opt
            .optimize(&products, -1.0, PriceChangeRange::default())
            .unwrap_err();
        match err {
            PricingError::InvalidInput { product_id, .. } => assert_eq!(product_id, "zero"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(opt.solver.calls.get(), 0);
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let err = optimize(&[ProductRecord::new("neg", 5.0, -1.0)], -1.0, 0.1).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput { .. }));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(
            optimize(&[], -1.0, 0.1),
            Err(PricingError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_range_validation() {
        assert!(PriceChangeRange::new(1.5).is_err());
        assert!(PriceChangeRange::new(0.0).is_err());
        assert!(PriceChangeRange::new(-0.1).is_err());
        assert!(PriceChangeRange::new(f64::NAN).is_err());
        assert!(PriceChangeRange::new(1.0).is_ok());
        assert!((PriceChangeRange::default().value() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_finite_elasticity_rejected() {
        let err = optimize(&[ProductRecord::new("a", 5.0, 1.0)], f64::NAN, 0.1).unwrap_err();
        assert!(matches!(err, PricingError::NonFiniteElasticity(_)));
    }

    #[test]
    fn test_positive_elasticity_is_infeasible() {
        let products = vec![
            ProductRecord::new("first", 10.0, 3.0),
            ProductRecord::new("last", 20.0, 4.0),
        ];
        let err = optimize(&products, 0.5, 0.1).unwrap_err();
        match &err {
            PricingError::OptimizationFailed {
                status,
                first_product,
                last_product,
                blocking,
                ..
            } => {
                assert_eq!(*status, LinProgStatus::Infeasible);
                assert_eq!(first_product, "first");
                assert_eq!(last_product, "last");
                assert_eq!(blocking.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("infeasible"), "{msg}");
        assert!(msg.contains("first [9.0000, 11.0000]"), "{msg}");
    }

    #[test]
    fn test_missing_coefficient_names_key() {
        let mut table = CoefficientTable::new();
        table.push("const", 1.0);
        let err = optimize_with_coefficients(
            &[ProductRecord::new("a", 5.0, 1.0)],
            &table,
            DEFAULT_ELASTICITY_KEY,
            0.1,
        )
        .unwrap_err();
        assert!(err.to_string().contains("'unit_price'"));
    }

    #[test]
    fn test_describe_blocking_truncates() {
        let bound = PriceBound::around(10.0, 0.1);
        let blocking: Vec<(String, PriceBound)> =
            (0..7).map(|i| (format!("p{i}"), bound)).collect();
        let text = describe_blocking(&blocking);
        assert!(text.contains("p4"));
        assert!(!text.contains("p5 "));
        assert!(text.ends_with("and 2 more)"));
    }
}
