//! Label encoding for categorical columns

use super::ModelError;

/// Maps each distinct label to its index in the sorted list of labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(label)).ok()
    }

    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>, ModelError> {
        labels
            .iter()
            .map(|l| {
                let l = l.as_ref();
                self.encode(l).ok_or_else(|| ModelError::UnknownLabel(l.to_string()))
            })
            .collect()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_sorted_labels() {
        let enc = LabelEncoder::fit(["garden_tools", "bed_bath_table", "garden_tools", "toys"]);
        assert_eq!(enc.classes(), &["bed_bath_table", "garden_tools", "toys"]);
        assert_eq!(enc.transform(&["toys", "bed_bath_table"]).unwrap(), vec![2, 0]);
        assert_eq!(enc.decode(1), Some("garden_tools"));
    }

    #[test]
    fn test_unknown_label_rejected() {
        let enc = LabelEncoder::fit(["a"]);
        assert!(matches!(enc.transform(&["b"]), Err(ModelError::UnknownLabel(l)) if l == "b"));
    }
}
