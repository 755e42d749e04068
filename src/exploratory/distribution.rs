//! Value distributions as equal-width histograms

use crate::dataset::SalesFrame;

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub min: f64,
    pub max: f64,
    pub counts: Vec<usize>,
    /// Bar width used by `Display`
    pub bar_width: usize,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width buckets over `[min, max]`.
    ///
    /// The last bucket is closed on the right. A constant column puts every
    /// value in the first bucket.
    pub fn from_values(column: impl Into<String>, values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = if span > 0.0 {
                (((v - min) / span) * bins as f64).floor() as usize
            } else {
                0
            };
            counts[idx.min(bins - 1)] += 1;
        }

        Some(Self {
            column: column.into(),
            min,
            max,
            counts,
            bar_width: 40,
        })
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Histogram for every numeric column with at least one value.
pub fn numeric_distribution(frame: &SalesFrame, bins: usize, bar_width: usize) -> Vec<Histogram> {
    frame
        .numeric_columns()
        .filter_map(|c| {
            let values: Vec<f64> = frame.numeric(&c.name).ok()?.iter().flatten().copied().collect();
            Histogram::from_values(c.name.clone(), &values, bins).map(|mut h| {
                h.bar_width = bar_width;
                h
            })
        })
        .collect()
}

impl std::fmt::Display for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Distribution of {}", self.column)?;
        let peak = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let width = self.bin_width();
        for (i, &count) in self.counts.iter().enumerate() {
            let lo = self.min + width * i as f64;
            let hi = lo + width;
            let bar = "#".repeat(count * self.bar_width / peak);
            writeln!(f, "  [{lo:>12.3}, {hi:>12.3}) {bar:<w$} {count}", w = self.bar_width)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [0.0, 0.5, 1.0, 1.5, 2.0, 10.0];
        let h = Histogram::from_values("x", &values, 5).unwrap();
        assert_eq!(h.total(), values.len());
        // bucket width 2.0: [0, 2) holds four values, 2.0 opens the next one
        assert_eq!(h.counts[0], 4);
        assert_eq!(h.counts[1], 1);
        // max lands in the closed last bucket
        assert_eq!(h.counts[4], 1);
    }

    #[test]
    fn test_constant_column_single_bucket() {
        let h = Histogram::from_values("x", &[3.0, 3.0], 4).unwrap();
        assert_eq!(h.counts, vec![2, 0, 0, 0]);
        assert!(h.to_string().starts_with("Distribution of x"));
    }

    #[test]
    fn test_empty_values_yield_none() {
        assert!(Histogram::from_values("x", &[], 10).is_none());
        assert!(Histogram::from_values("x", &[1.0], 0).is_none());
    }
}
