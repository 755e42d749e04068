//! Config Validation Tests
//!
//! Exercise the two config validation layers from outside the crate:
//! unknown-key detection with suggestions, and value-range validation.

use std::io::Write;

use price_optimizer::config::validation::{
    known_config_keys, suggest_correction, validate_unknown_keys,
};
use price_optimizer::config::{ConfigError, OutputFormat, PricingConfig};
use price_optimizer::types::CatalogMode;

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_column_mapping_warns_with_suggestion() {
    let toml_str = r#"
[columns]
quantiy = "units"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert_eq!(warnings[0].field, "columns.quantiy");
    assert_eq!(warnings[0].suggestion.as_deref(), Some("columns.quantity"));
}

#[test]
fn unknown_section_warns_without_failing_load() {
    let toml_str = r#"
[optimiser]
price_change_range = 0.2
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.iter().any(|w| w.field == "optimiser"));
    assert!(warnings
        .iter()
        .any(|w| w.suggestion.as_deref() == Some("optimizer")));

    // The misspelled section is ignored, so the default range survives.
    let config = PricingConfig::from_toml_str(toml_str).unwrap();
    assert!((config.optimizer.price_change_range - 0.10).abs() < f64::EPSILON);
}

#[test]
fn valid_full_config_produces_zero_warnings() {
    let toml_str = r#"
[data]
path = "sales.csv"

[columns]
product_id = "sku"
price = "price"
quantity = "units"
category = "dept"
date = "month"
date_format = "%Y-%m-%d"
total_sales = "revenue"
freight = "shipping"
weekday = "weekday"
weekend = "weekend"

[optimizer]
price_change_range = 0.25
elasticity_key = "price"
catalog = "per_product"

[exploration]
head_rows = 10
histogram_bins = 20
histogram_width = 30

[output]
results_path = "out/prices.json"
coefficients_path = "out/coef.csv"
format = "json"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

    let config = PricingConfig::from_toml_str(toml_str).unwrap();
    assert_eq!(config.columns.quantity, "units");
    assert_eq!(config.optimizer.catalog, CatalogMode::PerProduct);
    assert_eq!(config.output.format, OutputFormat::Json);
    assert_eq!(config.exploration.histogram_bins, 20);
}

#[test]
fn every_known_leaf_key_has_a_section() {
    let known = known_config_keys();
    for key in &known {
        if let Some((section, _)) = key.split_once('.') {
            assert!(known.contains(section), "section '{section}' missing for '{key}'");
        }
    }
}

#[test]
fn unrelated_key_gets_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("zzzzzzzzzzzzzzzzzzzz", &known).is_none());
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn range_above_one_is_rejected() {
    let err = PricingConfig::from_toml_str("[optimizer]\nprice_change_range = 1.5\n").unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("price_change_range"));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn range_of_exactly_one_is_accepted() {
    let config = PricingConfig::from_toml_str("[optimizer]\nprice_change_range = 1.0\n").unwrap();
    assert!((config.optimizer.price_change_range - 1.0).abs() < f64::EPSILON);
}

#[test]
fn multiple_problems_are_all_reported() {
    let toml_str = r#"
[optimizer]
price_change_range = 0.0
elasticity_key = " "

[exploration]
histogram_bins = 0
"#;
    match PricingConfig::from_toml_str(toml_str).unwrap_err() {
        ConfigError::Validation(errors) => assert_eq!(errors.len(), 3, "{errors:?}"),
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn renamed_price_column_moves_elasticity_key() {
    let config = PricingConfig::from_toml_str("[columns]\nprice = \"list_price\"\n").unwrap();
    assert_eq!(config.elasticity_key(), "list_price");
    assert_eq!(PricingConfig::default().elasticity_key(), "unit_price");
}

#[test]
fn unknown_catalog_mode_is_a_parse_error() {
    let err = PricingConfig::from_toml_str("[optimizer]\ncatalog = \"weekly\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)));
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn load_from_file_reports_path_on_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[optimizer]\nprice_change_range = \"wide\"").unwrap();

    let err = PricingConfig::load_from_file(file.path()).unwrap_err();
    match &err {
        ConfigError::Parse(path, _) => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other}"),
    }
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn saved_config_loads_back_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pricing.toml");

    let mut config = PricingConfig::default();
    config.optimizer.price_change_range = 0.05;
    config.columns.category = "dept".to_string();
    config.save_to_file(&path).unwrap();

    let loaded = PricingConfig::load_from_file(&path).unwrap();
    assert!((loaded.optimizer.price_change_range - 0.05).abs() < f64::EPSILON);
    assert_eq!(loaded.columns.category, "dept");
    assert_eq!(loaded.output.results_path, config.output.results_path);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PricingConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}
