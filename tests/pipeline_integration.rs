//! Pipeline Integration Tests
//!
//! End-to-end runs over a small retail CSV written to a temp directory:
//! load -> explore -> fit elasticity -> build catalog -> optimize -> write
//! results and coefficients -> read them back.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use price_optimizer::config::{OutputFormat, PricingConfig};
use price_optimizer::dataset::{build_catalog, load_csv, DatasetError};
use price_optimizer::exploratory::{
    category_summary, correlation_matrix, data_overview, numeric_distribution,
    summary_statistics, time_based_analysis, weekday_weekend_analysis, Aggregation,
};
use price_optimizer::modeling::{extract_coefficients, price_elasticity_model};
use price_optimizer::optimizer::optimize_with_coefficients;
use price_optimizer::report::{read_coefficients, write_coefficients, write_results};
use price_optimizer::types::{CatalogMode, OptimizedPrice};

const PRODUCTS: &[(&str, &str, f64)] = &[
    ("bed1", "bed_bath_table", 45.0),
    ("bed2", "bed_bath_table", 80.0),
    ("garden1", "garden_tools", 30.0),
    ("garden2", "garden_tools", 60.0),
];

/// Months of 2017 with (weekday, weekend) counts.
const MONTHS: &[(u32, u32, u32)] = &[(1, 22, 9), (2, 20, 8), (3, 23, 8), (4, 20, 10)];

/// Demand is exactly `200 - 1.5 * price` for every category, so the fitted
/// price coefficient is -1.5 and the category terms vanish.
fn write_dataset(dir: &Path) -> PathBuf {
    let mut csv = String::from(
        "product_id,product_category_name,month_year,qty,total_price,freight_price,unit_price,product_score,weekday,weekend\n",
    );
    for (id, category, base) in PRODUCTS {
        for (i, (month, weekday, weekend)) in MONTHS.iter().enumerate() {
            let price = base + i as f64 * 2.0;
            let qty = 200.0 - 1.5 * price;
            writeln!(
                csv,
                "{id},{category},01-{month:02}-2017,{qty},{total},12.5,{price},4.1,{weekday},{weekend}",
                total = qty * price
            )
            .unwrap();
        }
    }
    let path = dir.join("retail_price.csv");
    std::fs::write(&path, csv).unwrap();
    path
}

#[test]
fn full_pipeline_produces_bounded_prices_and_readable_files() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let mut config = PricingConfig::default();
    config.data.path = data.clone();
    config.output.results_path = dir.path().join("out/optimized_prices.csv");
    config.output.coefficients_path = dir.path().join("out/coefficients.csv");

    let frame = load_csv(&config.data.path).unwrap();
    assert_eq!(frame.len(), PRODUCTS.len() * MONTHS.len());

    // Fit
    let model = price_elasticity_model(&frame, &config.columns).unwrap();
    let elasticity = model.price_coefficient().unwrap();
    assert!((elasticity + 1.5).abs() < 1e-6, "elasticity = {elasticity}");
    let table = extract_coefficients(&model.results);
    write_coefficients(&config.output.coefficients_path, &table).unwrap();

    // Optimize from the coefficients read back from disk
    let coefficients = read_coefficients(&config.output.coefficients_path).unwrap();
    assert_eq!(coefficients.len(), 4);
    let catalog = build_catalog(&frame, &config.columns, CatalogMode::PerProduct).unwrap();
    assert_eq!(catalog.len(), PRODUCTS.len());
    assert!(catalog.iter().all(|p| p.qty >= 0.0));

    let range = config.optimizer.price_change_range;
    let results =
        optimize_with_coefficients(&catalog, &coefficients, config.elasticity_key(), range)
            .unwrap();
    for (product, result) in catalog.iter().zip(&results) {
        assert!(result.optimized_price <= product.unit_price * (1.0 + range) + 1e-9);
        assert!(result.optimized_price >= product.unit_price * (1.0 - range) - 1e-9);
    }

    write_results(&config.output.results_path, &results, OutputFormat::Csv).unwrap();
    let mut rdr = csv::Reader::from_path(&config.output.results_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["product_id", "optimized_price", "estimated_quantity_sold"]
    );
    let written: Vec<OptimizedPrice> = rdr.deserialize().map(Result::unwrap).collect();
    assert_eq!(written, results);
}

#[test]
fn rows_catalog_mode_keeps_one_entry_per_row() {
    let dir = tempfile::tempdir().unwrap();
    let frame = load_csv(&write_dataset(dir.path())).unwrap();
    let config = PricingConfig::default();

    // Sales rows feed the optimizer as given unless per-product is chosen
    assert_eq!(config.optimizer.catalog, CatalogMode::Rows);
    let catalog = build_catalog(&frame, &config.columns, config.optimizer.catalog).unwrap();
    assert_eq!(catalog.len(), frame.len());
    assert_eq!(catalog.iter().filter(|p| p.product_id == "bed1").count(), MONTHS.len());

    let per_product = build_catalog(&frame, &config.columns, CatalogMode::PerProduct).unwrap();
    // bed1 prices are 45, 47, 49, 51
    assert_eq!(per_product[0].product_id, "bed1");
    assert!((per_product[0].unit_price - 48.0).abs() < 1e-9);
}

#[test]
fn json_results_written_to_nested_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a/b/prices.json");
    let results = vec![OptimizedPrice {
        product_id: "bed1".to_string(),
        optimized_price: 49.5,
        estimated_qty: 40.0,
    }];

    write_results(&path, &results, OutputFormat::Json).unwrap();
    let parsed: Vec<OptimizedPrice> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, results);
}

#[test]
fn exploratory_reports_cover_the_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let frame = load_csv(&write_dataset(dir.path())).unwrap();
    let config = PricingConfig::default();

    let overview = data_overview(&frame, config.exploration.head_rows);
    assert_eq!(overview.head.len(), 5);
    assert_eq!(overview.total_missing(), 0);

    let stats = summary_statistics(&frame);
    assert_eq!(stats.get("qty").unwrap().count, frame.len());

    let histograms = numeric_distribution(&frame, 10, 20);
    assert!(histograms.iter().all(|h| h.total() == frame.len()));

    // qty is an exact linear function of price
    let corr = correlation_matrix(&frame);
    assert!((corr.get("qty", "unit_price").unwrap() + 1.0).abs() < 1e-9);

    let categories = category_summary(&frame, &config.columns.category).unwrap();
    assert_eq!(categories.rows.len(), 2);
    assert!(categories
        .get("garden_tools", "freight_price", Aggregation::Sum)
        .is_some_and(|v| (v - 100.0).abs() < 1e-9));

    let trend = time_based_analysis(&frame, &config.columns).unwrap();
    assert_eq!(trend.months.len(), MONTHS.len());
    assert!(trend.months.iter().all(|m| m.rows == PRODUCTS.len()));

    let days = weekday_weekend_analysis(&frame, &config.columns).unwrap();
    assert_eq!(days.by_weekday.len(), 3);
    assert_eq!(days.by_weekend.len(), 3);
}

#[test]
fn missing_dataset_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_csv(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, DatasetError::Io { .. }));
}
