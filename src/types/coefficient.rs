//! Regression coefficient table

use serde::{Deserialize, Serialize};

/// One row of a coefficient table.
///
/// Field names serialize as `Coefficient` / `Value` so tables written by the
/// `fit` command can be fed back into `optimize --coefficients`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    #[serde(rename = "Coefficient")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// Ordered name -> value mapping produced by the regression step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTable {
    pub rows: Vec<Coefficient>,
}

impl CoefficientTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.rows.push(Coefficient {
            name: name.into(),
            value,
        });
    }

    /// Value of the first coefficient with the given name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.rows.iter().find(|c| c.name == name).map(|c| c.value)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coefficient> {
        self.rows.iter()
    }
}

impl FromIterator<(String, f64)> for CoefficientTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            rows: iter
                .into_iter()
                .map(|(name, value)| Coefficient { name, value })
                .collect(),
        }
    }
}

impl std::fmt::Display for CoefficientTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<24} {:>16}", "Coefficient", "Value")?;
        for c in &self.rows {
            writeln!(f, "{:<24} {:>16.6}", c.name, c.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_first_match() {
        let mut table = CoefficientTable::new();
        table.push("const", 12.5);
        table.push("unit_price", -0.3);
        assert_eq!(table.get("unit_price"), Some(-0.3));
        assert_eq!(table.get("missing"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_collect_preserves_order() {
        let table: CoefficientTable = vec![
            ("b".to_string(), 2.0),
            ("a".to_string(), 1.0),
        ]
        .into_iter()
        .collect();
        let names: Vec<&str> = table.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
