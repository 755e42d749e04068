//! Two-phase primal simplex over independent blocks
//!
//! Variables linked through a shared constraint row form a block, and each
//! block is solved on its own dense tableau. A problem with one row per
//! variable therefore costs linear time and memory in the number of
//! variables.
//!
//! Within a block, variables are shifted to `y = x - lower` so every column
//! is non-negative. Finite upper bounds become extra `y_i <= upper_i -
//! lower_i` rows. Rows with a negative right-hand side are negated and given
//! an artificial variable; phase 1 drives the artificials to zero, phase 2
//! minimizes the real objective over the remaining columns.

use tracing::debug;

use super::{LinProgResult, LinProgStatus, LinearProgram, LpSolver, SolverError};

/// Pivot / reduced-cost tolerance.
const EPS: f64 = 1e-9;

/// Relative tolerance for declaring phase 1 infeasible.
const FEASIBILITY_TOL: f64 = 1e-7;

/// Pivot budget per block when none is configured.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Two-phase simplex using Bland's rule for both entering and leaving
/// variables (no cycling, deterministic tie-breaks).
#[derive(Debug, Clone)]
pub struct SimplexSolver {
    /// Pivot budget for each independent block, both phases together
    pub max_iterations: usize,
}

impl Default for SimplexSolver {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

// ============================================================================
// Block Decomposition
// ============================================================================

/// Variables and constraint rows that only interact with each other.
#[derive(Debug, Default, PartialEq)]
struct Block {
    vars: Vec<usize>,
    rows: Vec<usize>,
}

fn find_root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Split the problem into blocks, ordered by their smallest variable.
///
/// Also returns the rows with no non-zero coefficient; they read `0 <= b`
/// and belong to no block.
fn partition(problem: &LinearProgram) -> (Vec<Block>, Vec<usize>) {
    let n = problem.num_vars();
    let mut parent: Vec<usize> = (0..n).collect();

    for row in &problem.a_ub {
        let mut cols = row.iter().filter(|(_, a)| *a != 0.0).map(|(c, _)| *c);
        if let Some(first) = cols.next() {
            let root = find_root(&mut parent, first);
            for col in cols {
                let other = find_root(&mut parent, col);
                if other != root {
                    parent[other] = root;
                }
            }
        }
    }

    let mut block_of: Vec<Option<usize>> = vec![None; n];
    let mut blocks: Vec<Block> = Vec::new();
    for var in 0..n {
        let root = find_root(&mut parent, var);
        let index = *block_of[root].get_or_insert_with(|| {
            blocks.push(Block::default());
            blocks.len() - 1
        });
        blocks[index].vars.push(var);
    }

    let mut empty = Vec::new();
    for (j, row) in problem.a_ub.iter().enumerate() {
        match row.iter().find(|(_, a)| *a != 0.0) {
            Some(&(col, _)) => {
                let root = find_root(&mut parent, col);
                if let Some(index) = block_of[root] {
                    blocks[index].rows.push(j);
                }
            }
            None => empty.push(j),
        }
    }

    (blocks, empty)
}

// ============================================================================
// Dense Tableau
// ============================================================================

enum Phase {
    Optimal,
    Unbounded,
    IterationLimit,
}

struct Tableau {
    rows: Vec<Vec<f64>>,
    basis: Vec<usize>,
    rhs: usize,
}

impl Tableau {
    fn reduced_cost(&self, cost: &[f64], col: usize) -> f64 {
        let basic: f64 = self
            .rows
            .iter()
            .zip(&self.basis)
            .map(|(row, &b)| cost[b] * row[col])
            .sum();
        cost[col] - basic
    }

    fn pivot(&mut self, pivot_row: usize, col: usize) {
        let p = self.rows[pivot_row][col];
        for v in &mut self.rows[pivot_row] {
            *v /= p;
        }
        let pivot = self.rows[pivot_row].clone();
        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == pivot_row {
                continue;
            }
            let factor = row[col];
            if factor != 0.0 {
                for (v, pv) in row.iter_mut().zip(&pivot) {
                    *v -= factor * pv;
                }
            }
        }
        self.basis[pivot_row] = col;
    }

    /// Run simplex iterations over columns `0..allowed`.
    fn iterate(
        &mut self,
        cost: &[f64],
        allowed: usize,
        max_iterations: usize,
        nit: &mut usize,
    ) -> Phase {
        loop {
            if *nit >= max_iterations {
                return Phase::IterationLimit;
            }

            let Some(col) = (0..allowed)
                .find(|&c| !self.basis.contains(&c) && self.reduced_cost(cost, c) < -EPS)
            else {
                return Phase::Optimal;
            };

            let mut leaving: Option<(usize, f64)> = None;
            for (j, row) in self.rows.iter().enumerate() {
                let a = row[col];
                if a <= EPS {
                    continue;
                }
                let ratio = row[self.rhs] / a;
                leaving = match leaving {
                    None => Some((j, ratio)),
                    Some((lj, lr)) => {
                        if ratio < lr - EPS || (ratio <= lr + EPS && self.basis[j] < self.basis[lj]) {
                            Some((j, ratio))
                        } else {
                            Some((lj, lr))
                        }
                    }
                };
            }

            let Some((row, _)) = leaving else {
                return Phase::Unbounded;
            };
            self.pivot(row, col);
            *nit += 1;
        }
    }
}

/// One block in local coordinates.
struct DenseBlock {
    c: Vec<f64>,
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    bounds: Vec<(f64, f64)>,
}

impl DenseBlock {
    fn gather(problem: &LinearProgram, block: &Block, local: &mut [usize]) -> Self {
        for (pos, &var) in block.vars.iter().enumerate() {
            local[var] = pos;
        }
        let k = block.vars.len();
        let a = block
            .rows
            .iter()
            .map(|&j| {
                let mut dense = vec![0.0; k];
                // Zero entries may name variables of other blocks
                for &(col, coeff) in problem.a_ub[j].iter().filter(|(_, a)| *a != 0.0) {
                    dense[local[col]] += coeff;
                }
                dense
            })
            .collect();
        Self {
            c: block.vars.iter().map(|&v| problem.c[v]).collect(),
            a,
            b: block.rows.iter().map(|&j| problem.b_ub[j]).collect(),
            bounds: block.vars.iter().map(|&v| problem.bounds[v]).collect(),
        }
    }

    /// Solve in local coordinates; `Ok(x)` on optimum.
    fn solve(&self, max_iterations: usize, nit: &mut usize) -> Result<Vec<f64>, LinProgStatus> {
        let n = self.c.len();
        let lower: Vec<f64> = self.bounds.iter().map(|b| b.0).collect();

        // Constraint rows in shifted space: A y <= b - A l
        let mut rows: Vec<(Vec<f64>, f64)> = self
            .a
            .iter()
            .zip(&self.b)
            .map(|(a, b)| {
                let shift: f64 = a.iter().zip(&lower).map(|(a, l)| a * l).sum();
                (a.clone(), b - shift)
            })
            .collect();
        for (i, &(l, u)) in self.bounds.iter().enumerate() {
            if u.is_finite() {
                let mut a = vec![0.0; n];
                a[i] = 1.0;
                rows.push((a, u - l));
            }
        }

        let m = rows.len();
        let n_art = rows.iter().filter(|(_, r)| *r < 0.0).count();
        let width = n + m + n_art + 1;
        let rhs = width - 1;

        let mut tableau = Tableau {
            rows: vec![vec![0.0; width]; m],
            basis: vec![0; m],
            rhs,
        };
        let mut next_art = n + m;
        for (j, (a, r)) in rows.iter().enumerate() {
            let sign = if *r < 0.0 { -1.0 } else { 1.0 };
            let row = &mut tableau.rows[j];
            for (k, v) in a.iter().enumerate() {
                row[k] = sign * v;
            }
            row[n + j] = sign;
            row[rhs] = sign * r;
            if *r < 0.0 {
                row[next_art] = 1.0;
                tableau.basis[j] = next_art;
                next_art += 1;
            } else {
                tableau.basis[j] = n + j;
            }
        }

        // Phase 1: minimize the sum of artificials
        if n_art > 0 {
            let mut cost = vec![0.0; width - 1];
            for c in cost.iter_mut().skip(n + m) {
                *c = 1.0;
            }
            match tableau.iterate(&cost, width - 1, max_iterations, nit) {
                Phase::Optimal => {}
                Phase::IterationLimit => return Err(LinProgStatus::IterationLimit),
                // Phase 1 objective is bounded below by zero
                Phase::Unbounded => return Err(LinProgStatus::Infeasible),
            }

            let scale = 1.0 + rows.iter().map(|(_, r)| r.abs()).fold(0.0, f64::max);
            let residual: f64 = tableau
                .rows
                .iter()
                .zip(&tableau.basis)
                .filter(|(_, b)| **b >= n + m)
                .map(|(row, _)| row[rhs])
                .sum();
            if residual > FEASIBILITY_TOL * scale {
                debug!(residual, "Phase 1 left artificials in basis");
                return Err(LinProgStatus::Infeasible);
            }

            // Drive zero-valued artificials out of the basis where possible
            for j in 0..m {
                if tableau.basis[j] >= n + m {
                    if let Some(col) = (0..n + m).find(|&c| tableau.rows[j][c].abs() > EPS) {
                        tableau.pivot(j, col);
                    }
                }
            }
        }

        // Phase 2: real objective, artificial columns excluded
        let mut cost = vec![0.0; width - 1];
        cost[..n].copy_from_slice(&self.c);
        match tableau.iterate(&cost, n + m, max_iterations, nit) {
            Phase::Optimal => {}
            Phase::Unbounded => return Err(LinProgStatus::Unbounded),
            Phase::IterationLimit => return Err(LinProgStatus::IterationLimit),
        }

        let mut x = lower;
        for (row, &b) in tableau.rows.iter().zip(&tableau.basis) {
            if b < n {
                x[b] += row[rhs];
            }
        }
        Ok(x)
    }
}

// ============================================================================
// Solver
// ============================================================================

impl LpSolver for SimplexSolver {
    fn solve(&self, problem: &LinearProgram) -> Result<LinProgResult, SolverError> {
        problem.validate()?;

        let (blocks, empty) = partition(problem);
        if empty.iter().any(|&j| problem.b_ub[j] < -FEASIBILITY_TOL) {
            debug!(rows = empty.len(), "Constraint row without coefficients is violated");
            return Ok(LinProgResult::failed(LinProgStatus::Infeasible, 0));
        }

        debug!(
            vars = problem.num_vars(),
            rows = problem.num_constraints(),
            blocks = blocks.len(),
            largest = blocks.iter().map(|b| b.vars.len()).max().unwrap_or(0),
            "Simplex blocks built"
        );

        let mut x = vec![0.0; problem.num_vars()];
        let mut local = vec![0; problem.num_vars()];
        let mut nit = 0;
        for block in &blocks {
            let dense = DenseBlock::gather(problem, block, &mut local);
            let mut block_nit = 0;
            let solved = dense.solve(self.max_iterations, &mut block_nit);
            nit += block_nit;
            match solved {
                Ok(local_x) => {
                    for (&var, value) in block.vars.iter().zip(local_x) {
                        x[var] = value;
                    }
                }
                Err(status) => {
                    debug!(%status, first_var = block.vars[0], "Simplex block failed");
                    return Ok(LinProgResult::failed(status, nit));
                }
            }
        }

        let fun = problem.c.iter().zip(&x).map(|(c, x)| c * x).sum();
        let slack = (0..problem.num_constraints())
            .map(|j| problem.b_ub[j] - problem.row_activity(j, &x))
            .collect();

        debug!(nit, fun, "Simplex converged");

        Ok(LinProgResult {
            x,
            fun,
            status: LinProgStatus::Optimal,
            nit,
            message: "Optimization terminated successfully.".to_string(),
            slack,
        })
    }
}
