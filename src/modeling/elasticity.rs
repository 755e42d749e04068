//! Price elasticity regression over the sales frame

use tracing::{info, warn};

use super::{LabelEncoder, ModelError, Ols, OlsResults};
use crate::config::ColumnMapping;
use crate::dataset::SalesFrame;
use crate::types::CoefficientTable;

pub const INTERACTION_TERM: &str = "interaction";
pub const CATEGORY_ENCODED_TERM: &str = "category_encoded";

/// Fitted elasticity regression together with the category encoding it used.
#[derive(Debug, Clone)]
pub struct ElasticityModel {
    pub encoder: LabelEncoder,
    pub results: OlsResults,
    /// Regressor name carrying the price coefficient
    pub price_term: String,
    /// Rows dropped for a missing category, price or quantity
    pub dropped_rows: usize,
}

impl ElasticityModel {
    /// Coefficient on the price regressor.
    pub fn price_coefficient(&self) -> Option<f64> {
        self.results.param(&self.price_term)
    }

    pub fn coefficients(&self) -> CoefficientTable {
        extract_coefficients(&self.results)
    }
}

/// Regress quantity on `[const, price, price * category_encoded, category_encoded]`.
///
/// The category is label encoded over the rows that take part in the fit.
pub fn price_elasticity_model(
    frame: &SalesFrame,
    columns: &ColumnMapping,
) -> Result<ElasticityModel, ModelError> {
    let categories = frame.keys(&columns.category)?;
    let prices = frame.numeric(&columns.price)?;
    let quantities = frame.numeric(&columns.quantity)?;

    let mut labels = Vec::with_capacity(frame.len());
    let mut price = Vec::with_capacity(frame.len());
    let mut qty = Vec::with_capacity(frame.len());
    for ((c, p), q) in categories.into_iter().zip(prices).zip(quantities) {
        if let (Some(c), Some(p), Some(q)) = (c, p, q) {
            labels.push(c);
            price.push(*p);
            qty.push(*q);
        }
    }

    let dropped_rows = frame.len() - labels.len();
    if dropped_rows > 0 {
        warn!(dropped_rows, "Rows with missing category, price or quantity left out of the fit");
    }

    let encoder = LabelEncoder::fit(&labels);
    let encoded: Vec<f64> = encoder
        .transform(&labels)?
        .into_iter()
        .map(|code| code as f64)
        .collect();
    let interaction: Vec<f64> = price.iter().zip(&encoded).map(|(p, e)| p * e).collect();

    let names = [columns.price.as_str(), INTERACTION_TERM, CATEGORY_ENCODED_TERM];
    let results = Ols::fit(&names, &[price, interaction, encoded], &qty, true)?;

    info!(
        observations = results.observations,
        categories = encoder.len(),
        r_squared = results.r_squared,
        "Price elasticity model fitted"
    );

    Ok(ElasticityModel {
        encoder,
        results,
        price_term: columns.price.clone(),
        dropped_rows,
    })
}

/// Coefficient table (`Coefficient`, `Value`) from fitted parameters.
pub fn extract_coefficients(results: &OlsResults) -> CoefficientTable {
    results
        .names
        .iter()
        .cloned()
        .zip(results.params.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::read_csv;

    /// qty = 100 - 2 * price + 0.5 * price * cat - 3 * cat, with cat in {0, 1, 2}
    fn synthetic_csv() -> String {
        let mut csv = String::from("product_category_name,unit_price,qty\n");
        let cats = ["bed", "garden", "toys"];
        for (code, cat) in cats.iter().enumerate() {
            for step in 0..6 {
                let price = 10.0 + step as f64 * 3.0 + code as f64;
                let c = code as f64;
                let qty = 100.0 - 2.0 * price + 0.5 * price * c - 3.0 * c;
                csv.push_str(&format!("{cat},{price},{qty}\n"));
            }
        }
        csv.push_str("toys,,5\n");
        csv
    }

    #[test]
    fn test_recovers_known_coefficients() {
        let frame = read_csv(synthetic_csv().as_bytes()).unwrap();
        let model = price_elasticity_model(&frame, &ColumnMapping::default()).unwrap();

        assert_eq!(model.dropped_rows, 1);
        assert_eq!(model.results.observations, 18);
        assert_eq!(model.encoder.classes(), &["bed", "garden", "toys"]);
        assert_eq!(
            model.results.names,
            vec!["const", "unit_price", "interaction", "category_encoded"]
        );
        assert!((model.price_coefficient().unwrap() + 2.0).abs() < 1e-6);
        assert!((model.results.param("interaction").unwrap() - 0.5).abs() < 1e-6);
        assert!((model.results.param("category_encoded").unwrap() + 3.0).abs() < 1e-6);
        assert!((model.results.param("const").unwrap() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_coefficient_table_keeps_term_order() {
        let frame = read_csv(synthetic_csv().as_bytes()).unwrap();
        let table = price_elasticity_model(&frame, &ColumnMapping::default())
            .unwrap()
            .coefficients();
        let names: Vec<&str> = table.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["const", "unit_price", "interaction", "category_encoded"]);
        assert!((table.get("unit_price").unwrap() + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_column_surfaces_as_dataset_error() {
        let frame = read_csv("unit_price,qty\n1,2\n".as_bytes()).unwrap();
        assert!(matches!(
            price_elasticity_model(&frame, &ColumnMapping::default()),
            Err(ModelError::Dataset(_))
        ));
    }

    #[test]
    fn test_single_category_still_yields_price_coefficient() {
        let mut csv = String::from("product_category_name,unit_price,qty\n");
        for step in 0..20 {
            let price = 30.0 + step as f64 * 1.5;
            csv.push_str(&format!("garden_tools,{price},{}\n", 150.0 - 2.0 * price));
        }
        let frame = read_csv(csv.as_bytes()).unwrap();
        let model = price_elasticity_model(&frame, &ColumnMapping::default()).unwrap();

        assert_eq!(model.encoder.len(), 1);
        assert_eq!(model.results.rank, 2);
        assert!((model.price_coefficient().unwrap() + 2.0).abs() < 1e-6);
        assert!((model.results.param("const").unwrap() - 150.0).abs() < 1e-6);
        assert_eq!(model.results.param(INTERACTION_TERM), Some(0.0));
        assert_eq!(model.results.param(CATEGORY_ENCODED_TERM), Some(0.0));
    }
}
