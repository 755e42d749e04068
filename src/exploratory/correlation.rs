//! Pearson correlation matrix over numeric columns
//!
//! Each pair uses only the rows where both columns have a value. P-values for
//! the strongest pairs come from Student's t-distribution (statrs).

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::dataset::SalesFrame;

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationPair {
    pub x: String,
    pub y: String,
    pub r: f64,
    pub samples: usize,
    pub p_value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// Row-major `names.len()` x `names.len()` matrix, NaN where undefined
    pub values: Vec<Vec<f64>>,
    /// Complete-pair sample count behind each entry
    pub samples: Vec<Vec<usize>>,
}

/// Pearson correlation coefficient; NaN when either side has no variance.
pub(crate) fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|a| a * a).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x.powi(2)) * (n * sum_y2 - sum_y.powi(2))).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        f64::NAN
    } else {
        (numerator / denominator).clamp(-1.0, 1.0)
    }
}

/// Two-tailed p-value for `r` over `n` samples (t with n - 2 df).
pub(crate) fn p_value_for_r(r: f64, n: usize) -> f64 {
    if n < 3 || r.is_nan() {
        return 1.0;
    }
    if r.abs() >= 0.9999 {
        return 0.0;
    }

    let df = (n - 2) as f64;
    let t_stat = r * df.sqrt() / (1.0 - r * r).sqrt();

    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => 2.0 * (1.0 - t_dist.cdf(t_stat.abs())),
        Err(_) => 1.0,
    }
}

pub fn correlation_matrix(frame: &SalesFrame) -> CorrelationMatrix {
    let columns: Vec<(String, &[Option<f64>])> = frame
        .numeric_columns()
        .filter_map(|c| frame.numeric(&c.name).ok().map(|v| (c.name.clone(), v)))
        .collect();

    let k = columns.len();
    let mut values = vec![vec![f64::NAN; k]; k];
    let mut samples = vec![vec![0usize; k]; k];

    for i in 0..k {
        for j in i..k {
            let (x, y): (Vec<f64>, Vec<f64>) = columns[i]
                .1
                .iter()
                .zip(columns[j].1)
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .unzip();
            let r = if x.len() < 2 { f64::NAN } else { pearson(&x, &y) };
            values[i][j] = r;
            values[j][i] = r;
            samples[i][j] = x.len();
            samples[j][i] = x.len();
        }
    }

    CorrelationMatrix {
        names: columns.into_iter().map(|(n, _)| n).collect(),
        values,
        samples,
    }
}

impl CorrelationMatrix {
    pub fn get(&self, x: &str, y: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == x)?;
        let j = self.names.iter().position(|n| n == y)?;
        Some(self.values[i][j])
    }

    /// Off-diagonal pairs ordered by |r| (strongest first), NaN excluded.
    pub fn strongest_pairs(&self, limit: usize) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for i in 0..self.names.len() {
            for j in (i + 1)..self.names.len() {
                let r = self.values[i][j];
                if r.is_nan() {
                    continue;
                }
                let n = self.samples[i][j];
                pairs.push(CorrelationPair {
                    x: self.names[i].clone(),
                    y: self.names[j].clone(),
                    r,
                    samples: n,
                    p_value: p_value_for_r(r, n),
                });
            }
        }
        pairs.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));
        pairs.truncate(limit);
        pairs
    }
}

impl std::fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Correlation Matrix:")?;
        write!(f, "  {:<20}", "")?;
        for name in &self.names {
            write!(f, " {:>8.8}", name)?;
        }
        writeln!(f)?;
        for (name, row) in self.names.iter().zip(&self.values) {
            write!(f, "  {:<20.20}", name)?;
            for v in row {
                write!(f, " {:>8.2}", v)?;
            }
            writeln!(f)?;
        }

        let top = self.strongest_pairs(10);
        if !top.is_empty() {
            writeln!(f)?;
            writeln!(f, "Strongest pairs:")?;
            for p in top {
                writeln!(
                    f,
                    "  {:<20} ~ {:<20} r = {:>6.3}  p = {:.4}  (n = {})",
                    p.x, p.y, p.r, p.p_value, p.samples
                )?;
            }
        }
        Ok(())
    }
}
