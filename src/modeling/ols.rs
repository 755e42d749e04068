//! Ordinary least squares
//!
//! Solves the normal equations `(X'X) b = X'y` by Gauss-Jordan inversion with
//! partial pivoting. The inverse also gives the parameter covariance
//! `s^2 (X'X)^-1` used for standard errors.
//!
//! When regressors are collinear `X'X` has no inverse. The fit then falls
//! back to the Moore-Penrose pseudo-inverse from a Jacobi eigendecomposition,
//! which yields the minimum-norm least-squares parameters. Degrees of freedom
//! follow the numerical rank of the design matrix.
//!
//! Inference uses the statrs crate:
//! - t statistics against Student's t with `n - k` degrees of freedom
//! - the regression F statistic against Fisher-Snedecor(`k - 1`, `n - k`)

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use tracing::warn;

use super::ModelError;

/// Name given to the intercept column added by `add_constant`.
pub const CONSTANT_TERM: &str = "const";

/// Relative pivot size below which `X'X` is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Eigenvalues below this fraction of the largest count as zero in the
/// pseudo-inverse.
const PINV_RCOND: f64 = 1e-12;

/// Sweep cap for the Jacobi eigenvalue iteration.
const JACOBI_MAX_SWEEPS: usize = 100;

/// Least-squares estimator entry point.
pub struct Ols;

#[derive(Debug, Clone)]
pub struct OlsResults {
    pub names: Vec<String>,
    pub params: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub t_values: Vec<f64>,
    pub p_values: Vec<f64>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub observations: usize,
    pub df_model: usize,
    pub df_resid: usize,
    /// Numerical rank of the design matrix
    pub rank: usize,
    /// Sum of squared residuals
    pub ssr: f64,
    pub has_constant: bool,
}

impl Ols {
    /// Fit `y` on the given regressor columns.
    ///
    /// `names` and `x_columns` pair up one-to-one. With `add_constant` an
    /// intercept named `const` is prepended.
    pub fn fit<S: AsRef<str>>(
        names: &[S],
        x_columns: &[Vec<f64>],
        y: &[f64],
        add_constant: bool,
    ) -> Result<OlsResults, ModelError> {
        let n = y.len();
        if names.len() != x_columns.len() {
            return Err(ModelError::LengthMismatch {
                name: "regressor names".to_string(),
                expected: x_columns.len(),
                got: names.len(),
            });
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("dependent variable".to_string()));
        }

        let mut labels = Vec::with_capacity(names.len() + 1);
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(x_columns.len() + 1);
        if add_constant {
            labels.push(CONSTANT_TERM.to_string());
            columns.push(vec![1.0; n]);
        }
        for (name, column) in names.iter().zip(x_columns) {
            let name = name.as_ref();
            if column.len() != n {
                return Err(ModelError::LengthMismatch {
                    name: name.to_string(),
                    expected: n,
                    got: column.len(),
                });
            }
            if column.iter().any(|v| !v.is_finite()) {
                return Err(ModelError::NonFinite(name.to_string()));
            }
            labels.push(name.to_string());
            columns.push(column.clone());
        }

        let k = columns.len();
        if n <= k {
            return Err(ModelError::TooFewObservations {
                observations: n,
                regressors: k,
            });
        }

        // X'X and X'y
        let mut xtx = vec![vec![0.0; k]; k];
        let mut xty = vec![0.0; k];
        for i in 0..k {
            for j in i..k {
                let dot: f64 = columns[i].iter().zip(&columns[j]).map(|(a, b)| a * b).sum();
                xtx[i][j] = dot;
                xtx[j][i] = dot;
            }
            xty[i] = columns[i].iter().zip(y).map(|(a, b)| a * b).sum();
        }

        let (inverse, rank) = match invert(&xtx) {
            Ok(inverse) => (inverse, k),
            Err(bad) => {
                let collinear: Vec<&str> = bad.iter().map(|&i| labels[i].as_str()).collect();
                let (pinv, rank) = pseudo_inverse(&xtx);
                warn!(
                    collinear = ?collinear,
                    rank,
                    regressors = k,
                    "Design matrix is singular, using minimum-norm least squares"
                );
                (pinv, rank)
            }
        };

        let params: Vec<f64> = inverse
            .iter()
            .map(|row| row.iter().zip(&xty).map(|(a, b)| a * b).sum())
            .collect();

        let ssr: f64 = (0..n)
            .map(|r| {
                let fitted: f64 = columns.iter().zip(&params).map(|(c, b)| c[r] * b).sum();
                (y[r] - fitted).powi(2)
            })
            .sum();

        let mean_y = y.iter().sum::<f64>() / n as f64;
        let tss: f64 = if add_constant {
            y.iter().map(|v| (v - mean_y).powi(2)).sum()
        } else {
            y.iter().map(|v| v * v).sum()
        };

        let df_resid = n - rank;
        let df_model = if add_constant { rank.saturating_sub(1) } else { rank };
        let sigma2 = ssr / df_resid as f64;

        let std_errors: Vec<f64> = (0..k).map(|i| (sigma2 * inverse[i][i]).max(0.0).sqrt()).collect();
        let t_values: Vec<f64> = params
            .iter()
            .zip(&std_errors)
            .map(|(b, se)| {
                if *se > 0.0 {
                    b / se
                } else if *b == 0.0 {
                    f64::NAN
                } else {
                    f64::INFINITY.copysign(*b)
                }
            })
            .collect();
        let p_values = t_values.iter().map(|t| t_test_p_value(*t, df_resid)).collect();

        let r_squared = if tss > 0.0 { 1.0 - ssr / tss } else { f64::NAN };
        let centering = if add_constant { 1.0 } else { 0.0 };
        let adj_r_squared =
            1.0 - (n as f64 - centering) / df_resid as f64 * (1.0 - r_squared);

        let (f_statistic, f_p_value) = if df_model == 0 {
            (f64::NAN, f64::NAN)
        } else {
            let f = (r_squared / df_model as f64) / ((1.0 - r_squared) / df_resid as f64);
            (f, f_test_p_value(f, df_model, df_resid))
        };

        Ok(OlsResults {
            names: labels,
            params,
            std_errors,
            t_values,
            p_values,
            r_squared,
            adj_r_squared,
            f_statistic,
            f_p_value,
            observations: n,
            df_model,
            df_resid,
            rank,
            ssr,
            has_constant: add_constant,
        })
    }
}

/// Gauss-Jordan inversion with partial pivoting.
///
/// On failure returns the indices of the columns that had no usable pivot.
fn invert(matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, Vec<usize>> {
    let k = matrix.len();
    let scale = matrix
        .iter()
        .enumerate()
        .map(|(i, row)| row[i].abs())
        .fold(0.0_f64, f64::max)
        .max(f64::MIN_POSITIVE);

    // [A | I]
    let mut aug: Vec<Vec<f64>> = matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = row.clone();
            r.extend((0..k).map(|j| if i == j { 1.0 } else { 0.0 }));
            r
        })
        .collect();

    let mut bad = Vec::new();
    for col in 0..k {
        let pivot_row = (col..k)
            .max_by(|&a, &b| aug[a][col].abs().total_cmp(&aug[b][col].abs()))
            .unwrap_or(col);
        if aug[pivot_row][col].abs() <= SINGULAR_TOLERANCE * scale {
            bad.push(col);
            continue;
        }
        aug.swap(col, pivot_row);

        let pivot = aug[col][col];
        for v in aug[col].iter_mut() {
            *v /= pivot;
        }
        let pivot_values = aug[col].clone();
        for (r, row) in aug.iter_mut().enumerate() {
            if r == col {
                continue;
            }
            let factor = row[col];
            if factor != 0.0 {
                for (v, p) in row.iter_mut().zip(&pivot_values) {
                    *v -= factor * p;
                }
            }
        }
    }

    if !bad.is_empty() {
        return Err(bad);
    }
    Ok(aug.into_iter().map(|row| row[k..].to_vec()).collect())
}

/// Eigenvalues and eigenvectors (as columns) of a symmetric matrix by cyclic
/// Jacobi rotations.
fn symmetric_eigen(matrix: &[Vec<f64>]) -> (Vec<f64>, Vec<Vec<f64>>) {
    let k = matrix.len();
    let mut a = matrix.to_vec();
    let mut v: Vec<Vec<f64>> = (0..k)
        .map(|i| (0..k).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    // Frobenius norm is invariant under the rotations
    let norm = a.iter().flatten().map(|x| x * x).sum::<f64>().sqrt();

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..k)
            .flat_map(|i| (0..k).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| a[i][j] * a[i][j])
            .sum();
        if off.sqrt() <= f64::EPSILON * norm {
            break;
        }

        for p in 0..k {
            for q in p + 1..k {
                if a[p][q] == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + theta.hypot(1.0));
                let c = 1.0 / t.hypot(1.0);
                let s = t * c;

                for row in a.iter_mut() {
                    let (rp, rq) = (row[p], row[q]);
                    row[p] = c * rp - s * rq;
                    row[q] = s * rp + c * rq;
                }
                for col in 0..k {
                    let (pr, qr) = (a[p][col], a[q][col]);
                    a[p][col] = c * pr - s * qr;
                    a[q][col] = s * pr + c * qr;
                }
                for row in v.iter_mut() {
                    let (rp, rq) = (row[p], row[q]);
                    row[p] = c * rp - s * rq;
                    row[q] = s * rp + c * rq;
                }
            }
        }
    }

    ((0..k).map(|i| a[i][i]).collect(), v)
}

/// Moore-Penrose pseudo-inverse of a symmetric positive semi-definite
/// matrix, together with its numerical rank.
fn pseudo_inverse(matrix: &[Vec<f64>]) -> (Vec<Vec<f64>>, usize) {
    let k = matrix.len();
    let (values, vectors) = symmetric_eigen(matrix);
    let largest = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let kept: Vec<usize> = (0..k)
        .filter(|&l| values[l] > PINV_RCOND * largest)
        .collect();

    let pinv: Vec<Vec<f64>> = (0..k)
        .map(|i| {
            (0..k)
                .map(|j| {
                    kept.iter()
                        .map(|&l| vectors[i][l] * vectors[j][l] / values[l])
                        .sum::<f64>()
                })
                .collect()
        })
        .collect();
    (pinv, kept.len())
}

/// Two-sided p-value of a t statistic.
fn t_test_p_value(t: f64, df: usize) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df as f64) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => f64::NAN,
    }
}

/// Upper-tail p-value of an F statistic.
fn f_test_p_value(f: f64, df_model: usize, df_resid: usize) -> f64 {
    if f.is_nan() {
        return f64::NAN;
    }
    if f.is_infinite() {
        return 0.0;
    }
    match FisherSnedecor::new(df_model as f64, df_resid as f64) {
        Ok(dist) => 1.0 - dist.cdf(f),
        Err(_) => f64::NAN,
    }
}

impl OlsResults {
    /// Estimated parameter for a regressor name.
    pub fn param(&self, name: &str) -> Option<f64> {
        self.names.iter().position(|n| n == name).map(|i| self.params[i])
    }

    /// Regression table in the usual OLS summary layout.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for OlsResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rule = "=".repeat(78);
        let thin = "-".repeat(78);
        writeln!(f, "{:^78}", "OLS Regression Results")?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<22}{:>16}    {:<22}{:>14.4}",
            "No. Observations:", self.observations, "R-squared:", self.r_squared
        )?;
        writeln!(
            f,
            "{:<22}{:>16}    {:<22}{:>14.4}",
            "Df Residuals:", self.df_resid, "Adj. R-squared:", self.adj_r_squared
        )?;
        writeln!(
            f,
            "{:<22}{:>16}    {:<22}{:>14.4}",
            "Df Model:", self.df_model, "F-statistic:", self.f_statistic
        )?;
        writeln!(
            f,
            "{:<22}{:>16}    {:<22}{:>14.4e}",
            "Covariance Type:", "nonrobust", "Prob (F-statistic):", self.f_p_value
        )?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<24}{:>14}{:>14}{:>12}{:>12}",
            "", "coef", "std err", "t", "P>|t|"
        )?;
        writeln!(f, "{thin}")?;
        for i in 0..self.names.len() {
            writeln!(
                f,
                "{:<24.24}{:>14.4}{:>14.4}{:>12.3}{:>12.3}",
                self.names[i], self.params[i], self.std_errors[i], self.t_values[i], self.p_values[i]
            )?;
        }
        write!(f, "{rule}")
    }
}
