//! Linear Programming Solver
//!
//! General-purpose LP interface used by the price optimizer:
//!
//! ```text
//! minimize    c · x
//! subject to  A_ub · x <= b_ub
//!             lower_i <= x_i <= upper_i
//! ```
//!
//! The `LpSolver` trait is the seam between the optimizer and a concrete
//! algorithm. `SimplexSolver` is the bundled implementation: a two-phase
//! primal simplex with Bland's rule, run separately on each group of
//! variables linked by a constraint row. Results are fully deterministic for
//! a fixed problem instance.
//!
//! Constraint rows are stored sparse, as `(column, coefficient)` pairs, so a
//! problem with one row per variable stays linear in size.

mod simplex;

pub use simplex::{SimplexSolver, DEFAULT_MAX_ITERATIONS};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed LP input (caught before any pivoting).
#[derive(Debug, Error, PartialEq)]
pub enum SolverError {
    #[error("Dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid bound for variable {index}: [{lower}, {upper}]")]
    InvalidBound { index: usize, lower: f64, upper: f64 },

    #[error("Constraint row {row} references column {column}, problem has {vars} variables")]
    ColumnOutOfRange { row: usize, column: usize, vars: usize },

    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
}

/// One sparse constraint row: `(column, coefficient)` pairs.
///
/// Repeated columns are summed.
pub type SparseRow = Vec<(usize, f64)>;

/// A linear program in inequality form with per-variable bounds.
///
/// Lower bounds must be finite; upper bounds may be `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearProgram {
    /// Objective coefficients (minimized)
    pub c: Vec<f64>,
    /// Inequality constraint matrix, one sparse row per constraint
    pub a_ub: Vec<SparseRow>,
    /// Inequality right-hand sides
    pub b_ub: Vec<f64>,
    /// Per-variable (lower, upper) bounds
    pub bounds: Vec<(f64, f64)>,
}

impl LinearProgram {
    pub fn num_vars(&self) -> usize {
        self.c.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.a_ub.len()
    }

    /// `A_ub[row] · x`
    pub fn row_activity(&self, row: usize, x: &[f64]) -> f64 {
        self.a_ub[row].iter().map(|&(col, a)| a * x[col]).sum()
    }

    /// Check dimensions, finiteness and bound ordering.
    pub fn validate(&self) -> Result<(), SolverError> {
        let n = self.num_vars();

        if self.b_ub.len() != self.a_ub.len() {
            return Err(SolverError::DimensionMismatch {
                what: "b_ub",
                expected: self.a_ub.len(),
                got: self.b_ub.len(),
            });
        }
        if self.bounds.len() != n {
            return Err(SolverError::DimensionMismatch {
                what: "bounds",
                expected: n,
                got: self.bounds.len(),
            });
        }
        for (row, entries) in self.a_ub.iter().enumerate() {
            if let Some(&(column, _)) = entries.iter().find(|(col, _)| *col >= n) {
                return Err(SolverError::ColumnOutOfRange {
                    row,
                    column,
                    vars: n,
                });
            }
            if entries.iter().any(|(_, v)| !v.is_finite()) {
                return Err(SolverError::NonFinite("a_ub"));
            }
        }
        if self.c.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::NonFinite("c"));
        }
        if self.b_ub.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::NonFinite("b_ub"));
        }
        for (index, &(lower, upper)) in self.bounds.iter().enumerate() {
            // NaN fails both comparisons, so it lands here too
            if !lower.is_finite() || upper.is_nan() || upper < lower {
                return Err(SolverError::InvalidBound {
                    index,
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }
}

/// Terminal state of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinProgStatus {
    Optimal,
    Infeasible,
    Unbounded,
    IterationLimit,
}

impl std::fmt::Display for LinProgStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "optimal"),
            Self::Infeasible => write!(f, "infeasible"),
            Self::Unbounded => write!(f, "unbounded"),
            Self::IterationLimit => write!(f, "iteration limit reached"),
        }
    }
}

/// Result of a linear program solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LinProgResult {
    /// Solution vector (empty unless status is `Optimal`)
    pub x: Vec<f64>,
    /// Objective value at `x` (NaN unless status is `Optimal`)
    pub fun: f64,
    pub status: LinProgStatus,
    /// Number of pivots performed across both phases and all blocks
    pub nit: usize,
    pub message: String,
    /// `b_ub - A_ub · x` for each inequality row
    pub slack: Vec<f64>,
}

impl LinProgResult {
    pub fn success(&self) -> bool {
        self.status == LinProgStatus::Optimal
    }

    pub(crate) fn failed(status: LinProgStatus, nit: usize) -> Self {
        let message = match status {
            LinProgStatus::Optimal => "Optimization terminated successfully.",
            LinProgStatus::Infeasible => "The problem is infeasible.",
            LinProgStatus::Unbounded => "The problem is unbounded.",
            LinProgStatus::IterationLimit => "Iteration limit reached.",
        };
        Self {
            x: Vec::new(),
            fun: f64::NAN,
            status,
            nit,
            message: message.to_string(),
            slack: Vec::new(),
        }
    }
}

/// A solver for `LinearProgram` instances.
pub trait LpSolver {
    /// Solve the problem. Malformed input is an `Err`; infeasible or
    /// unbounded problems are reported through `LinProgResult::status`.
    fn solve(&self, problem: &LinearProgram) -> Result<LinProgResult, SolverError>;
}
